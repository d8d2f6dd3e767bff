//! Directional Trend Index.
//!
//! Blau-style momentum: per-bar up/down moves are triple-smoothed with
//! EMAs of periods r, s, u (three sequential passes) and combined as
//! 100 * smoothed(move) / smoothed(|move|). A zero denominator yields 0,
//! which is the flat-market reading rather than an error.

use crate::domain::error::DtiTraderError;
use crate::domain::indicator::ema;

pub fn dti(
    high: &[f64],
    low: &[f64],
    r: usize,
    s: usize,
    u: usize,
) -> Result<Vec<f64>, DtiTraderError> {
    if high.len() != low.len() {
        return Err(DtiTraderError::InvalidSeries {
            reason: format!("high/low length mismatch: {} vs {}", high.len(), low.len()),
        });
    }
    if high.is_empty() {
        return Err(DtiTraderError::InvalidSeries {
            reason: "dti input is empty".into(),
        });
    }
    for (name, period) in [("r", r), ("s", s), ("u", u)] {
        if period == 0 {
            return Err(DtiTraderError::InvalidPeriod {
                name: format!("dti.{}", name),
                period,
            });
        }
    }

    let n = high.len();
    let mut price = Vec::with_capacity(n);
    let mut abs_price = Vec::with_capacity(n);

    // Index 0 has no prior bar; both components seed to zero.
    price.push(0.0);
    abs_price.push(0.0);

    for i in 1..n {
        let hmu = (high[i] - high[i - 1]).max(0.0);
        let lmd = (low[i - 1] - low[i]).max(0.0);
        let p = hmu - lmd;
        price.push(p);
        abs_price.push(p.abs());
    }

    let smoothed = triple_ema(&price, r, s, u)?;
    let smoothed_abs = triple_ema(&abs_price, r, s, u)?;

    let out = smoothed
        .iter()
        .zip(smoothed_abs.iter())
        .map(|(&p, &a)| if a != 0.0 { 100.0 * p / a } else { 0.0 })
        .collect();

    Ok(out)
}

fn triple_ema(series: &[f64], r: usize, s: usize, u: usize) -> Result<Vec<f64>, DtiTraderError> {
    let first = ema(series, r)?;
    let second = ema(&first, s)?;
    ema(&second, u)
}
