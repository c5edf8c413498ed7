//! The multiplicative price update and its bounded path buffer.
//!
//! The default shock is a fair-coin ±volatility move, matching the
//! behavior this simulator teaches with; it is deliberately not the
//! textbook GBM discretization. `ShockModel::Gaussian` provides the
//! exact-solution `exp((μ − σ²/2)Δt + σ√Δt·Z)` step (Δt = 1) for
//! anyone who wants the continuous model instead.

use rand::Rng;
use rand_distr::StandardNormal;

use stockflow_core::models::{Direction, SimParams, SimSnapshot};

pub use stockflow_core::models::PRICE_FLOOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShockModel {
    /// Fair-coin ±volatility shock on the simple return.
    #[default]
    Binary,
    /// Standard-normal shock on the log return.
    Gaussian,
}

/// One simulation step: apply drift and a random shock to the last
/// price, then clamp at the floor.
pub fn step(last: f64, params: &SimParams, model: ShockModel, rng: &mut impl Rng) -> f64 {
    let drift = params.drift_pct / 100.0;
    let vol = params.volatility_pct / 100.0;
    let next = match model {
        ShockModel::Binary => {
            let shock = if rng.gen_bool(0.5) { vol } else { -vol };
            last * (1.0 + drift + shock)
        }
        ShockModel::Gaussian => {
            let z: f64 = rng.sample(StandardNormal);
            last * ((drift - 0.5 * vol * vol) + vol * z).exp()
        }
    };
    next.max(PRICE_FLOOR)
}

/// Path of a single run, truncated from the front so it never holds
/// more than `max_points` prices.
#[derive(Debug, Clone)]
pub struct PathBuffer {
    params: SimParams,
    path: Vec<f64>,
}

impl PathBuffer {
    /// A fresh run starts with exactly the initial price.
    pub fn new(params: SimParams) -> Self {
        let path = vec![params.initial_price];
        Self { params, path }
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Generate and append the next price, dropping the oldest entries
    /// once the buffer is full. Returns the new price.
    pub fn advance(&mut self, model: ShockModel, rng: &mut impl Rng) -> f64 {
        let last = self.path.last().copied().unwrap_or(self.params.initial_price);
        let next = step(last, &self.params, model, rng);
        self.path.push(next);
        if self.path.len() > self.params.max_points {
            let excess = self.path.len() - self.params.max_points;
            self.path.drain(..excess);
        }
        next
    }

    /// Copy out the current path with per-point up/down classification
    /// (a point equal to its predecessor counts as up, matching the
    /// chart's coloring rule).
    pub fn snapshot(&self, running: bool) -> SimSnapshot {
        let directions = self
            .path
            .windows(2)
            .map(|w| if w[0] <= w[1] { Direction::Up } else { Direction::Down })
            .collect();
        SimSnapshot {
            running,
            params: self.params.clone(),
            path: self.path.clone(),
            directions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(initial: f64, drift: f64, vol: f64, max_points: usize) -> SimParams {
        SimParams {
            initial_price: initial,
            drift_pct: drift,
            volatility_pct: vol,
            max_points,
        }
    }

    #[test]
    fn binary_step_is_two_valued() {
        let p = params(100.0, 0.0, 1.0, 5);
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen_up = false;
        let mut seen_down = false;
        for _ in 0..64 {
            let next = step(100.0, &p, ShockModel::Binary, &mut rng);
            let up = (next - 101.0).abs() < 1e-9;
            let down = (next - 99.0).abs() < 1e-9;
            assert!(up || down, "unexpected step value {next}");
            seen_up |= up;
            seen_down |= down;
        }
        assert!(seen_up && seen_down);
    }

    #[test]
    fn binary_step_applies_drift() {
        let p = params(100.0, 0.5, 0.0, 5);
        let mut rng = StdRng::seed_from_u64(1);
        let next = step(100.0, &p, ShockModel::Binary, &mut rng);
        assert!((next - 100.5).abs() < 1e-9);
    }

    #[test]
    fn floor_holds_for_any_magnitude() {
        // -120% shock would go negative without the clamp.
        let p = params(1.0, 0.0, 120.0, 5);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..128 {
            assert!(step(0.02, &p, ShockModel::Binary, &mut rng) >= PRICE_FLOOR);
            assert!(step(0.02, &p, ShockModel::Gaussian, &mut rng) >= PRICE_FLOOR);
        }
    }

    #[test]
    fn gaussian_zero_vol_is_pure_drift() {
        let p = params(100.0, 1.0, 0.0, 5);
        let mut rng = StdRng::seed_from_u64(5);
        let next = step(100.0, &p, ShockModel::Gaussian, &mut rng);
        assert!((next - 100.0 * 0.01f64.exp()).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_path() {
        let p = params(100.0, 0.1, 2.0, 50);
        let mut a = PathBuffer::new(p.clone());
        let mut b = PathBuffer::new(p);
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            assert_eq!(
                a.advance(ShockModel::Binary, &mut rng_a),
                b.advance(ShockModel::Binary, &mut rng_b)
            );
        }
    }

    #[test]
    fn buffer_keeps_most_recent_points_in_order() {
        let p = params(100.0, 0.0, 1.0, 5);
        let mut buf = PathBuffer::new(p);
        let mut rng = StdRng::seed_from_u64(9);
        let mut generated = vec![100.0];
        for _ in 0..37 {
            generated.push(buf.advance(ShockModel::Binary, &mut rng));
            assert!(buf.len() <= 5);
        }
        let snap = buf.snapshot(true);
        assert_eq!(snap.path.len(), 5);
        assert_eq!(snap.path, generated[generated.len() - 5..]);
    }

    #[test]
    fn snapshot_directions_follow_consecutive_comparison() {
        let p = params(100.0, 0.0, 1.0, 10);
        let mut buf = PathBuffer::new(p);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..6 {
            buf.advance(ShockModel::Binary, &mut rng);
        }
        let snap = buf.snapshot(false);
        assert_eq!(snap.directions.len(), snap.path.len() - 1);
        for (i, dir) in snap.directions.iter().enumerate() {
            let expected = if snap.path[i] <= snap.path[i + 1] {
                Direction::Up
            } else {
                Direction::Down
            };
            assert_eq!(*dir, expected);
        }
    }
}
