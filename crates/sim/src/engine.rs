//! Tick-driven simulation engine.
//!
//! A run is a single tokio task woken by `tokio::time::interval` and
//! cancelled through a `watch` channel, mirroring the usual
//! actor-with-shutdown shape. The engine owns the Idle/Running state
//! machine: `start` resets the path buffer to the initial price and
//! spawns the tick task, `stop` cancels it and keeps the path around
//! for display. The tick branch re-checks the shutdown flag before
//! stepping, so no step lands after `stop` has returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tracing::{info, trace, warn};

use stockflow_config::SimulatorConfig;
use stockflow_core::error::{FlowError, Result};
use stockflow_core::models::{SimParams, SimSnapshot};

use crate::process::{PathBuffer, ShockModel};

pub struct SimEngine {
    tick: Duration,
    max_points_cap: usize,
    model: ShockModel,
    state: Arc<Mutex<Option<PathBuffer>>>,
    running: Arc<AtomicBool>,
    shutdown_tx: Option<watch::Sender<bool>>,
}

impl SimEngine {
    pub fn new(config: &SimulatorConfig) -> Self {
        Self {
            tick: Duration::from_millis(config.tick_ms),
            max_points_cap: config.max_points_cap,
            model: ShockModel::default(),
            state: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx: None,
        }
    }

    pub fn with_shock_model(mut self, model: ShockModel) -> Self {
        self.model = model;
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Begin a run. The path is reset to `[initial_price]` regardless
    /// of any previous run. Fails if a run is already in progress or
    /// the parameters are invalid.
    pub fn start(&mut self, params: SimParams) -> Result<()> {
        if self.is_running() {
            return Err(FlowError::AlreadyRunning);
        }
        params.validate(self.max_points_cap)?;

        if let Ok(mut guard) = self.state.lock() {
            *guard = Some(PathBuffer::new(params.clone()));
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        self.shutdown_tx = Some(shutdown_tx);
        self.running.store(true, Ordering::SeqCst);

        let state = self.state.clone();
        let running = self.running.clone();
        let model = self.model;
        let tick = self.tick;

        tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut interval = tokio::time::interval(tick);
            // interval yields immediately on the first tick; consume it
            // so the first step lands one full period after start.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if *shutdown_rx.borrow() || !running.load(Ordering::SeqCst) {
                            return;
                        }
                        if let Ok(mut guard) = state.lock() {
                            if let Some(buf) = guard.as_mut() {
                                let price = buf.advance(model, &mut rng);
                                trace!(price, points = buf.len(), "tick");
                            }
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            info!("simulator: tick task stopped");
                            return;
                        }
                    }
                }
            }
        });

        info!(
            tick_ms = self.tick.as_millis() as u64,
            initial_price = params.initial_price,
            drift_pct = params.drift_pct,
            volatility_pct = params.volatility_pct,
            max_points = params.max_points,
            "simulator started"
        );
        Ok(())
    }

    /// Halt the tick task. The path is retained for display. Calling
    /// `stop` while idle is a no-op.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            self.running.store(false, Ordering::SeqCst);
            if tx.send(true).is_err() {
                warn!("simulator: tick task already gone");
            }
            info!("simulator stopped");
        }
    }

    /// Current run state for observers. Before the first run this is
    /// idle with an empty path.
    pub fn snapshot(&self) -> SimSnapshot {
        let running = self.is_running();
        self.state
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|buf| buf.snapshot(running)))
            .unwrap_or_else(|| SimSnapshot {
                running: false,
                params: SimParams::default(),
                path: Vec::new(),
                directions: Vec::new(),
            })
    }
}

impl Drop for SimEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
