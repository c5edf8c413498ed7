use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stockflow_api::{create_router, AppState};
use stockflow_config::AppConfig;
use stockflow_core::models::SimParams;
use stockflow_data::YahooClient;
use stockflow_sim::{PathBuffer, ShockModel};

#[derive(Parser)]
#[command(name = "stockflow", about = "GBM stock price simulator with historical drift/volatility estimation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve,
    /// Estimate drift/volatility for a symbol from one year of history
    Stats {
        /// Ticker symbol or company name (e.g. AAPL, "apple")
        symbol: String,
    },
    /// Run a simulation offline and print the path
    Simulate {
        #[arg(long, default_value_t = 100.0)]
        initial_price: f64,
        /// Drift per step, percent
        #[arg(long, default_value_t = 0.1)]
        drift: f64,
        /// Volatility per step, percent
        #[arg(long, default_value_t = 1.0)]
        volatility: f64,
        /// Number of steps to generate
        #[arg(long, default_value_t = 100)]
        steps: usize,
        /// Keep only the most recent N points
        #[arg(long, default_value_t = 100)]
        max_points: usize,
        /// Delay between steps in milliseconds (0 = as fast as possible)
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,
        /// RNG seed for a reproducible path
        #[arg(long)]
        seed: Option<u64>,
        /// Use a standard-normal shock instead of the fair-coin shock
        #[arg(long)]
        gaussian: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_file(resolve_config_path(&cli.config))?;

    match cli.command {
        Commands::Serve => run_server(config).await?,
        Commands::Stats { symbol } => cmd_stats(&config, &symbol).await?,
        Commands::Simulate {
            initial_price,
            drift,
            volatility,
            steps,
            max_points,
            interval_ms,
            seed,
            gaussian,
        } => {
            let params = SimParams {
                initial_price,
                drift_pct: drift,
                volatility_pct: volatility,
                max_points,
            };
            params.validate(config.simulator.max_points_cap)?;
            let model = if gaussian {
                ShockModel::Gaussian
            } else {
                ShockModel::Binary
            };
            cmd_simulate(params, model, steps, interval_ms, seed).await;
        }
    }

    Ok(())
}

/// Look for the config next to the CWD first, then beside the binary
/// (target/release/ layouts keep it two levels up).
fn resolve_config_path(path: &str) -> std::path::PathBuf {
    let direct = std::path::PathBuf::from(path);
    if direct.exists() {
        return direct;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(exe_dir) = exe.parent() {
            let candidate = exe_dir.join(path);
            if candidate.exists() {
                return candidate;
            }
            if let Some(root) = exe_dir.parent().and_then(|p| p.parent()) {
                let candidate = root.join(path);
                if candidate.exists() {
                    return candidate;
                }
            }
        }
    }
    direct
}

async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(config);
    let app = create_router(state);

    info!("API server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn cmd_stats(config: &AppConfig, symbol: &str) -> anyhow::Result<()> {
    let normalized = config.tickers.normalize_symbol(symbol);
    println!("🔍 Estimating statistics for {normalized} (1y daily history)...");

    let client = YahooClient::new(&config.upstream);
    let stats = client.estimate_statistics(&normalized).await?;

    println!();
    println!("  Drift:      {:>8.4} %/day", stats.drift);
    println!("  Volatility: {:>8.4} %/day", stats.volatility);
    match stats.price {
        Some(p) => println!("  Price:      {:>8.2}", p),
        None => println!("  Price:      (unavailable)"),
    }
    Ok(())
}

async fn cmd_simulate(
    params: SimParams,
    model: ShockModel,
    steps: usize,
    interval_ms: u64,
    seed: Option<u64>,
) {
    println!(
        "📈 Simulating {} steps (initial {:.2}, drift {}%, volatility {}%, {:?} shock)",
        steps, params.initial_price, params.drift_pct, params.volatility_pct, model
    );
    println!();
    println!("  {:<8} {:>12} {:>6}", "Step", "Price", "Move");
    println!("  {}", "-".repeat(28));
    println!("  {:<8} {:>12.4}", 0, params.initial_price);

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let mut buf = PathBuffer::new(params);
    let mut prev = buf.snapshot(false).path[0];

    for i in 1..=steps {
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
        let price = buf.advance(model, &mut rng);
        let arrow = if price >= prev { "▲" } else { "▼" };
        println!("  {:<8} {:>12.4} {:>6}", i, price, arrow);
        prev = price;
    }

    let snap = buf.snapshot(false);
    let min = snap.path.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = snap.path.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    println!();
    println!(
        "  Retained {} points — min {:.4}, max {:.4}, last {:.4}",
        snap.path.len(),
        min,
        max,
        snap.path.last().copied().unwrap_or_default()
    );
}
