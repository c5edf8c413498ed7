use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub simulator: SimulatorConfig,
    pub tickers: TickerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Market-data provider settings. The chart endpoint insists on a
/// browser-like User-Agent.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub user_agent: String,
    pub range: String,
    pub interval: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    /// Wall-clock step cadence in milliseconds.
    pub tick_ms: u64,
    /// Hard ceiling on the path buffer length.
    pub max_points_cap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerEntry {
    pub symbol: String,
    pub name: String,
}

/// Immutable ticker table: the suggestion list plus extra name→symbol
/// aliases that do not come straight from an entry's name.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerConfig {
    pub popular: Vec<TickerEntry>,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl TickerConfig {
    /// Map a company name (or alias) to its symbol; unknown input is
    /// passed through uppercased so raw symbols keep working.
    pub fn normalize_symbol(&self, input: &str) -> String {
        let upper = input.trim().to_uppercase();
        if let Some(sym) = self.aliases.get(&upper) {
            return sym.clone();
        }
        self.popular
            .iter()
            .find(|t| t.name.to_uppercase() == upper)
            .map(|t| t.symbol.clone())
            .unwrap_or(upper)
    }
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn from_default() -> Result<Self, ConfigError> {
        Self::from_file("config/default.toml")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 8080

        [upstream]
        base_url = "https://query1.finance.yahoo.com"
        user_agent = "Mozilla/5.0"
        range = "1y"
        interval = "1d"
        timeout_secs = 15

        [simulator]
        tick_ms = 2000
        max_points_cap = 1000

        [tickers]
        popular = [
            { symbol = "AAPL", name = "Apple" },
            { symbol = "GOOG", name = "Alphabet" },
        ]

        [tickers.aliases]
        GOOGLE = "GOOG"
    "#;

    #[test]
    fn parses_full_config() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upstream.range, "1y");
        assert_eq!(config.simulator.tick_ms, 2000);
        assert_eq!(config.tickers.popular.len(), 2);
    }

    #[test]
    fn normalize_maps_names_and_aliases() {
        let config: AppConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.tickers.normalize_symbol("apple"), "AAPL");
        assert_eq!(config.tickers.normalize_symbol("GOOGLE"), "GOOG");
        assert_eq!(config.tickers.normalize_symbol(" tsla "), "TSLA");
    }
}
