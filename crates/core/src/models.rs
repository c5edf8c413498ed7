use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

// ── Market Data ──────────────────────────────────────────────

/// One year of daily adjusted closes for a single symbol, as reported
/// by the upstream provider. Nulls in the series are preserved so the
/// estimator can skip the pairs they invalidate. Not persisted;
/// recomputed per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub closes: Vec<Option<f64>>,
    /// Upstream-reported current price (`meta.regularMarketPrice`).
    pub market_price: Option<f64>,
}

/// Drift/volatility estimated from historical log-returns, plus the
/// latest known price. Drift and volatility are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedStats {
    pub drift: f64,
    pub volatility: f64,
    pub price: Option<f64>,
}

// ── Simulation ───────────────────────────────────────────────

/// Simulated prices never fall below one cent; the initial price must
/// already respect the floor.
pub const PRICE_FLOOR: f64 = 0.01;

/// Parameters for one simulation run. Mutable only while the engine
/// is idle; a new run always starts from a fresh copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    pub initial_price: f64,
    pub drift_pct: f64,
    pub volatility_pct: f64,
    pub max_points: usize,
}

impl SimParams {
    /// Reject parameters the simulator cannot run with. `cap` is the
    /// configured ceiling on the path buffer length.
    pub fn validate(&self, cap: usize) -> Result<()> {
        if !self.initial_price.is_finite() || self.initial_price < PRICE_FLOOR {
            return Err(FlowError::InvalidParams(format!(
                "initial_price must be at least {PRICE_FLOOR}"
            )));
        }
        if !self.drift_pct.is_finite() {
            return Err(FlowError::InvalidParams("drift_pct must be finite".into()));
        }
        if !self.volatility_pct.is_finite() || self.volatility_pct < 0.0 {
            return Err(FlowError::InvalidParams(
                "volatility_pct must be non-negative".into(),
            ));
        }
        if self.max_points == 0 || self.max_points > cap {
            return Err(FlowError::InvalidParams(format!(
                "max_points must be in 1..={cap}"
            )));
        }
        Ok(())
    }
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            initial_price: 100.0,
            drift_pct: 0.1,
            volatility_pct: 1.0,
            max_points: 100,
        }
    }
}

/// Direction of a point relative to its predecessor, for chart
/// coloring at the rendering boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Point-in-time view of a simulation run handed to observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub running: bool,
    pub params: SimParams,
    /// Most recent `max_points` prices in generation order.
    pub path: Vec<f64>,
    /// One entry per path element after the first.
    pub directions: Vec<Direction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        assert!(SimParams::default().validate(1000).is_ok());
    }

    #[test]
    fn initial_price_below_floor_is_rejected() {
        // A sub-cent initial price would seed the path beneath the
        // floor every later step is clamped to.
        let params = SimParams {
            initial_price: 0.005,
            ..SimParams::default()
        };
        assert!(matches!(
            params.validate(1000).unwrap_err(),
            FlowError::InvalidParams(_)
        ));

        let at_floor = SimParams {
            initial_price: PRICE_FLOOR,
            ..SimParams::default()
        };
        assert!(at_floor.validate(1000).is_ok());
    }

    #[test]
    fn non_finite_fields_are_rejected() {
        for bad in [
            SimParams {
                initial_price: f64::NAN,
                ..SimParams::default()
            },
            SimParams {
                drift_pct: f64::INFINITY,
                ..SimParams::default()
            },
            SimParams {
                volatility_pct: -1.0,
                ..SimParams::default()
            },
        ] {
            assert!(bad.validate(1000).is_err());
        }
    }

    #[test]
    fn max_points_bounds_are_enforced() {
        let zero = SimParams {
            max_points: 0,
            ..SimParams::default()
        };
        assert!(zero.validate(1000).is_err());
        let oversized = SimParams {
            max_points: 1001,
            ..SimParams::default()
        };
        assert!(oversized.validate(1000).is_err());
    }
}
