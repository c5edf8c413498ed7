use std::sync::Arc;

use tokio::sync::Mutex;

use stockflow_config::AppConfig;
use stockflow_data::YahooClient;
use stockflow_sim::SimEngine;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub yahoo: Arc<YahooClient>,
    pub engine: Arc<Mutex<SimEngine>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let yahoo = Arc::new(YahooClient::new(&config.upstream));
        let engine = Arc::new(Mutex::new(SimEngine::new(&config.simulator)));
        Self {
            config,
            yahoo,
            engine,
        }
    }
}
