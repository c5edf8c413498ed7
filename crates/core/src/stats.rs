//! Log-return statistics behind the drift/volatility estimator.
//!
//! A pair of adjacent closes contributes `ln(curr/prev)` only when both
//! values are present and the prior close is positive; anything else is
//! skipped rather than treated as fatal. Variance is the population
//! (divide-by-n) variance of the sample.

use crate::error::{FlowError, Result};
use crate::models::{EstimatedStats, PriceHistory};

/// Continuously-compounded returns over every valid adjacent pair.
pub fn log_returns(closes: &[Option<f64>]) -> Vec<f64> {
    closes
        .windows(2)
        .filter_map(|pair| match (pair[0], pair[1]) {
            (Some(prev), Some(curr)) if prev > 0.0 => Some((curr / prev).ln()),
            _ => None,
        })
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divide by n, not n-1).
pub fn variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Estimate drift/volatility (as percentages) from a price history.
///
/// Fails with `InsufficientData` when the series yields zero usable
/// returns. The reported price is the upstream market price when it is
/// present and finite, otherwise the last element of the raw series.
pub fn estimate(history: &PriceHistory) -> Result<EstimatedStats> {
    let returns = log_returns(&history.closes);
    if returns.is_empty() {
        return Err(FlowError::InsufficientData);
    }

    let m = mean(&returns);
    let v = variance(&returns);

    let price = history
        .market_price
        .filter(|p| p.is_finite())
        .or_else(|| history.closes.last().copied().flatten());

    Ok(EstimatedStats {
        drift: m * 100.0,
        volatility: v.sqrt() * 100.0,
        price,
    })
}
