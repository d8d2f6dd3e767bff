//! Monte Carlo forward-risk estimation for a portfolio snapshot.
//!
//! Each iteration walks the portfolio through `days` simulated days,
//! drawing every position's daily return from N(0, volatility/100/sqrt(252))
//! via the Box-Muller transform. Randomness comes through the
//! [`RandomSource`] trait so tests can drive the simulation with fixed
//! seeds.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::domain::error::DtiTraderError;
use crate::domain::metrics::TRADING_DAYS_PER_YEAR;

/// Uniform source over [0, 1).
pub trait RandomSource {
    fn next_uniform(&mut self) -> f64;
}

/// Std RNG behind the trait; seedable for reproducible runs.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_uniform(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

/// Standard normal draw from two independent uniforms.
pub fn box_muller(source: &mut dyn RandomSource) -> f64 {
    // ln(0) guard: the uniform is half-open at 1, so clamp away from 0.
    let u1 = source.next_uniform().max(f64::MIN_POSITIVE);
    let u2 = source.next_uniform();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// One position in the snapshot: current value (display currency) and
/// annualized volatility in percent.
#[derive(Debug, Clone, Copy)]
pub struct PositionSnapshot {
    pub value: f64,
    pub volatility: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McParams {
    pub iterations: usize,
    pub days: usize,
}

impl Default for McParams {
    fn default() -> Self {
        McParams {
            iterations: 1000,
            days: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskEstimate {
    pub initial_value: f64,
    pub expected_value: f64,
    pub var_95: f64,
    pub var_99: f64,
    /// Mean final value in the worst 5% of paths.
    pub expected_shortfall: f64,
    pub expected_max_drawdown_pct: f64,
    pub worst_case_drawdown_pct: f64,
    pub probability_of_loss: f64,
    /// Mean/sigma ratio over per-path total returns.
    pub return_ratio: f64,
}

/// Run the full estimate.
pub fn estimate_risk(
    portfolio: &[PositionSnapshot],
    params: &McParams,
    source: &mut dyn RandomSource,
) -> Result<RiskEstimate, DtiTraderError> {
    if portfolio.is_empty() {
        return Err(DtiTraderError::InvalidSeries {
            reason: "monte carlo portfolio snapshot is empty".into(),
        });
    }
    if params.iterations == 0 || params.days == 0 {
        return Err(DtiTraderError::InvalidSeries {
            reason: "monte carlo iterations and days must be positive".into(),
        });
    }
    if portfolio.iter().any(|p| p.value < 0.0 || p.volatility < 0.0) {
        return Err(DtiTraderError::InvalidSeries {
            reason: "monte carlo position values and volatilities must be non-negative".into(),
        });
    }

    let initial_value: f64 = portfolio.iter().map(|p| p.value).sum();
    if initial_value <= 0.0 {
        return Err(DtiTraderError::InvalidSeries {
            reason: "monte carlo portfolio has no value".into(),
        });
    }

    let daily_sigmas: Vec<f64> = portfolio
        .iter()
        .map(|p| p.volatility / 100.0 / TRADING_DAYS_PER_YEAR.sqrt())
        .collect();

    let mut final_values = Vec::with_capacity(params.iterations);
    let mut drawdowns = Vec::with_capacity(params.iterations);

    for _ in 0..params.iterations {
        let (final_value, max_drawdown_pct) =
            simulate_path(portfolio, &daily_sigmas, params.days, initial_value, source);
        final_values.push(final_value);
        drawdowns.push(max_drawdown_pct);
    }

    let mut sorted = final_values.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let var_95 = sorted[(n as f64 * 0.05) as usize % n];
    let var_99 = sorted[(n as f64 * 0.01) as usize % n];

    // Mean of the worst 5% of paths; at least one observation.
    let tail_len = ((n as f64 * 0.05).ceil() as usize).max(1);
    let expected_shortfall = sorted[..tail_len].iter().sum::<f64>() / tail_len as f64;

    let expected_value = final_values.iter().sum::<f64>() / n as f64;
    let losses = final_values.iter().filter(|&&v| v < initial_value).count();

    let returns: Vec<f64> = final_values
        .iter()
        .map(|v| (v - initial_value) / initial_value)
        .collect();
    let mean_return = returns.iter().sum::<f64>() / n as f64;
    let return_var =
        returns.iter().map(|r| (r - mean_return).powi(2)).sum::<f64>() / n as f64;
    let return_ratio = if return_var > 0.0 {
        mean_return / return_var.sqrt()
    } else {
        0.0
    };

    Ok(RiskEstimate {
        initial_value,
        expected_value,
        var_95,
        var_99,
        expected_shortfall,
        expected_max_drawdown_pct: drawdowns.iter().sum::<f64>() / n as f64,
        worst_case_drawdown_pct: drawdowns
            .iter()
            .cloned()
            .fold(0.0, f64::max),
        probability_of_loss: losses as f64 / n as f64,
        return_ratio,
    })
}

/// Walk one path; returns (final value, max drawdown % on a base of 1.0).
fn simulate_path(
    portfolio: &[PositionSnapshot],
    daily_sigmas: &[f64],
    days: usize,
    initial_value: f64,
    source: &mut dyn RandomSource,
) -> (f64, f64) {
    let mut values: Vec<f64> = portfolio.iter().map(|p| p.value).collect();
    let mut peak = 1.0;
    let mut max_dd = 0.0;

    for _ in 0..days {
        for (value, sigma) in values.iter_mut().zip(daily_sigmas.iter()) {
            let daily_return = box_muller(source) * sigma;
            *value *= 1.0 + daily_return;
        }

        let normalized = values.iter().sum::<f64>() / initial_value;
        if normalized > peak {
            peak = normalized;
        } else {
            let dd = (peak - normalized) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    (values.iter().sum(), max_dd)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(value: f64, volatility: f64) -> PositionSnapshot {
        PositionSnapshot { value, volatility }
    }

    #[test]
    fn box_muller_is_roughly_standard_normal() {
        let mut source = SeededRandom::new(7);
        let draws: Vec<f64> = (0..10_000).map(|_| box_muller(&mut source)).collect();

        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let var = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / draws.len() as f64;

        assert!(mean.abs() < 0.05);
        assert!((var.sqrt() - 1.0).abs() < 0.05);
    }

    #[test]
    fn zero_volatility_collapses_all_percentiles() {
        let portfolio = vec![snapshot(60_000.0, 0.0), snapshot(40_000.0, 0.0)];
        let mut source = SeededRandom::new(42);
        let estimate =
            estimate_risk(&portfolio, &McParams::default(), &mut source).unwrap();

        assert!((estimate.expected_value - 100_000.0).abs() < 1e-6);
        assert!((estimate.var_95 - 100_000.0).abs() < 1e-6);
        assert!((estimate.var_99 - 100_000.0).abs() < 1e-6);
        assert!((estimate.expected_shortfall - 100_000.0).abs() < 1e-6);
        assert!((estimate.expected_max_drawdown_pct - 0.0).abs() < f64::EPSILON);
        assert!((estimate.probability_of_loss - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn same_seed_reproduces_the_estimate() {
        let portfolio = vec![snapshot(50_000.0, 20.0), snapshot(30_000.0, 35.0)];
        let params = McParams {
            iterations: 200,
            days: 10,
        };

        let a = estimate_risk(&portfolio, &params, &mut SeededRandom::new(99)).unwrap();
        let b = estimate_risk(&portfolio, &params, &mut SeededRandom::new(99)).unwrap();

        assert!((a.expected_value - b.expected_value).abs() < f64::EPSILON);
        assert!((a.var_95 - b.var_95).abs() < f64::EPSILON);
        assert!((a.expected_max_drawdown_pct - b.expected_max_drawdown_pct).abs() < f64::EPSILON);
    }

    #[test]
    fn estimates_sit_in_statistical_tolerance_bands() {
        // One position, ~1% daily sigma. Zero-mean returns: the expected
        // value stays near the initial value, losses near a coin flip.
        let portfolio = vec![snapshot(100_000.0, 15.87)];
        let params = McParams {
            iterations: 2000,
            days: 30,
        };
        let mut source = SeededRandom::new(1234);
        let estimate = estimate_risk(&portfolio, &params, &mut source).unwrap();

        assert!((estimate.expected_value - 100_000.0).abs() < 2_000.0);
        assert!((estimate.probability_of_loss - 0.5).abs() < 0.07);
        assert!(estimate.var_95 < estimate.expected_value);
        assert!(estimate.var_99 <= estimate.var_95);
        assert!(estimate.expected_shortfall <= estimate.var_95 + 1e-9);
        assert!(estimate.expected_max_drawdown_pct > 0.0);
        assert!(estimate.worst_case_drawdown_pct >= estimate.expected_max_drawdown_pct);
    }

    #[test]
    fn higher_volatility_widens_the_loss_tail() {
        let params = McParams {
            iterations: 1000,
            days: 30,
        };
        let calm = estimate_risk(
            &[snapshot(100_000.0, 10.0)],
            &params,
            &mut SeededRandom::new(5),
        )
        .unwrap();
        let wild = estimate_risk(
            &[snapshot(100_000.0, 60.0)],
            &params,
            &mut SeededRandom::new(5),
        )
        .unwrap();

        assert!(wild.var_95 < calm.var_95);
        assert!(wild.expected_max_drawdown_pct > calm.expected_max_drawdown_pct);
    }

    #[test]
    fn empty_portfolio_is_an_error() {
        let mut source = SeededRandom::new(1);
        assert!(estimate_risk(&[], &McParams::default(), &mut source).is_err());
    }

    #[test]
    fn zero_iterations_is_an_error() {
        let mut source = SeededRandom::new(1);
        let params = McParams {
            iterations: 0,
            days: 30,
        };
        assert!(estimate_risk(&[snapshot(1000.0, 10.0)], &params, &mut source).is_err());
    }

    #[test]
    fn negative_volatility_is_an_error() {
        let mut source = SeededRandom::new(1);
        let result = estimate_risk(
            &[snapshot(1000.0, -5.0)],
            &McParams::default(),
            &mut source,
        );
        assert!(result.is_err());
    }

    /// Deterministic stub: cycles through a fixed list of uniforms.
    struct FixedSource {
        values: Vec<f64>,
        index: usize,
    }

    impl RandomSource for FixedSource {
        fn next_uniform(&mut self) -> f64 {
            let v = self.values[self.index % self.values.len()];
            self.index += 1;
            v
        }
    }

    #[test]
    fn injectable_source_gives_exact_control() {
        // u1 = e^-2, u2 = 0.5 → z = sqrt(-2 ln u1) * cos(pi) = -2.
        let mut source = FixedSource {
            values: vec![(-2.0f64).exp(), 0.5],
            index: 0,
        };
        let z = box_muller(&mut source);
        assert!((z - (-2.0)).abs() < 1e-12);
    }
}
