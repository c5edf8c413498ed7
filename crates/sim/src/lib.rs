pub mod engine;
pub mod process;

pub use engine::SimEngine;
pub use process::{step, PathBuffer, ShockModel, PRICE_FLOOR};
