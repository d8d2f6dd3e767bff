//! Exponential moving average.
//!
//! k = 2/(period+1); out[0] = in[0], then out[i] = in[i]*k + out[i-1]*(1-k).
//! Seeded with the first input value, so there is no warm-up region.

use crate::domain::error::DtiTraderError;

pub fn ema(series: &[f64], period: usize) -> Result<Vec<f64>, DtiTraderError> {
    if period == 0 {
        return Err(DtiTraderError::InvalidPeriod {
            name: "ema".into(),
            period,
        });
    }
    if series.is_empty() {
        return Err(DtiTraderError::InvalidSeries {
            reason: "ema input is empty".into(),
        });
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    let mut prev = series[0];
    out.push(prev);

    for &value in &series[1..] {
        prev = value * k + prev * (1.0 - k);
        out.push(prev);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ema_first_output_equals_first_input() {
        let out = ema(&[42.0, 10.0, 20.0], 5).unwrap();
        assert!((out[0] - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_matches_recurrence() {
        let out = ema(&[10.0, 20.0, 30.0], 3).unwrap();
        let k = 2.0 / 4.0;

        let e1 = 20.0 * k + 10.0 * (1.0 - k);
        let e2 = 30.0 * k + e1 * (1.0 - k);
        assert!((out[1] - e1).abs() < 1e-12);
        assert!((out[2] - e2).abs() < 1e-12);
    }

    #[test]
    fn ema_constant_series_is_identity() {
        let out = ema(&[7.5; 20], 4).unwrap();
        for v in out {
            assert!((v - 7.5).abs() < 1e-12);
        }
    }

    #[test]
    fn ema_period_1_tracks_input() {
        let input = [10.0, 20.0, 30.0];
        let out = ema(&input, 1).unwrap();
        for (o, i) in out.iter().zip(input.iter()) {
            assert!((o - i).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_empty_input_is_error() {
        assert!(ema(&[], 3).is_err());
    }

    #[test]
    fn ema_zero_period_is_error() {
        assert!(ema(&[1.0, 2.0], 0).is_err());
    }

    proptest! {
        #[test]
        fn ema_output_length_matches_input(
            values in proptest::collection::vec(-1e6f64..1e6, 1..200),
            period in 1usize..50,
        ) {
            let out = ema(&values, period).unwrap();
            prop_assert_eq!(out.len(), values.len());
            prop_assert!((out[0] - values[0]).abs() < f64::EPSILON);
        }

        #[test]
        fn ema_stays_within_input_bounds(
            values in proptest::collection::vec(-1e6f64..1e6, 1..200),
            period in 1usize..50,
        ) {
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let out = ema(&values, period).unwrap();
            for v in out {
                prop_assert!(v >= min - 1e-9 && v <= max + 1e-9);
            }
        }
    }
}
