pub mod error;
pub mod models;
pub mod stats;

pub use error::{FlowError, Result};
pub use models::{
    Direction, EstimatedStats, PriceHistory, SimParams, SimSnapshot, PRICE_FLOOR,
};
