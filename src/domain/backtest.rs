//! Per-symbol signal generation.
//!
//! Walks a symbol's full history, opening a scan-trade when the daily DTI
//! crosses above the entry threshold with the 7-day DTI confirming, and
//! closing it on take-profit, stop-loss, or the holding-day limit. Exit
//! conditions are resolved here; the portfolio simulator only applies the
//! pre-computed exit dates.

use crate::domain::error::DtiTraderError;
use crate::domain::indicator::{dti, seven_day_dti};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::{
    Signal, REASON_MAX_DAYS, REASON_STOP_LOSS, REASON_TAKE_PROFIT,
};

/// DTI smoothing periods and the entry threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct DtiParams {
    pub r: usize,
    pub s: usize,
    pub u: usize,
    pub entry_threshold: f64,
}

impl Default for DtiParams {
    fn default() -> Self {
        DtiParams {
            r: 14,
            s: 10,
            u: 5,
            entry_threshold: 0.0,
        }
    }
}

/// Exit rules applied during the scan.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRules {
    pub take_profit_pct: f64,
    pub stop_loss_pct: f64,
    pub max_holding_days: i64,
}

impl Default for TradeRules {
    fn default() -> Self {
        TradeRules {
            take_profit_pct: 8.0,
            stop_loss_pct: 5.0,
            max_holding_days: 30,
        }
    }
}

/// Backtest one symbol's history into a chronological list of signals.
///
/// At most one scan-trade is open at a time. A trade still open when the
/// history ends is returned with empty exit fields (an open opportunity).
pub fn scan_symbol(
    series: &PriceSeries,
    params: &DtiParams,
    rules: &TradeRules,
) -> Result<Vec<Signal>, DtiTraderError> {
    let daily = dti(&series.high, &series.low, params.r, params.s, params.u)?;
    let weekly = seven_day_dti(
        &series.dates,
        &series.high,
        &series.low,
        params.r,
        params.s,
        params.u,
    )?;

    let mut signals = Vec::new();
    let mut i = 1;

    while i < series.len() {
        let crossed_up =
            daily[i] > params.entry_threshold && daily[i - 1] <= params.entry_threshold;
        let weekly_confirms = weekly[i].is_some_and(|w| w > params.entry_threshold);

        if !(crossed_up && weekly_confirms) {
            i += 1;
            continue;
        }

        let entry_index = i;
        let entry_price = series.close[entry_index];
        let entry_date = series.dates[entry_index];
        let target = entry_price * (1.0 + rules.take_profit_pct / 100.0);
        let stop = entry_price * (1.0 - rules.stop_loss_pct / 100.0);

        let mut exit = None;
        for j in entry_index + 1..series.len() {
            let close = series.close[j];
            let held = (series.dates[j] - entry_date).num_days();

            let reason = if close >= target {
                Some(REASON_TAKE_PROFIT)
            } else if close <= stop {
                Some(REASON_STOP_LOSS)
            } else if held >= rules.max_holding_days {
                Some(REASON_MAX_DAYS)
            } else {
                None
            };

            if let Some(reason) = reason {
                exit = Some((j, reason));
                break;
            }
        }

        match exit {
            Some((exit_index, reason)) => {
                let exit_price = series.close[exit_index];
                let exit_date = series.dates[exit_index];
                signals.push(Signal {
                    symbol: series.symbol.clone(),
                    market: series.market.clone(),
                    entry_date,
                    entry_price,
                    exit_date: Some(exit_date),
                    exit_price: Some(exit_price),
                    pl_percent: Some((exit_price - entry_price) / entry_price * 100.0),
                    holding_days: Some((exit_date - entry_date).num_days()),
                    exit_reason: Some(reason.to_string()),
                    historical_win_rate: 0.0,
                });
                i = exit_index + 1;
            }
            None => {
                signals.push(Signal {
                    symbol: series.symbol.clone(),
                    market: series.market.clone(),
                    entry_date,
                    entry_price,
                    exit_date: None,
                    exit_price: None,
                    pl_percent: None,
                    holding_days: None,
                    exit_reason: None,
                    historical_win_rate: 0.0,
                });
                break;
            }
        }
    }

    apply_win_rates(&mut signals);
    Ok(signals)
}

/// Attach historical win rates: each completed signal is scored against all
/// *other* completed signals of the symbol; open signals against all of them.
pub fn apply_win_rates(signals: &mut [Signal]) {
    let completed: Vec<(usize, bool)> = signals
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_completed())
        .map(|(i, s)| (i, s.is_win()))
        .collect();
    let total = completed.len();
    let wins = completed.iter().filter(|(_, w)| *w).count();

    for (index, signal) in signals.iter_mut().enumerate() {
        signal.historical_win_rate = if signal.is_completed() {
            let others = total - 1;
            if others == 0 {
                0.0
            } else {
                let own_win = usize::from(completed.iter().any(|&(i, w)| i == index && w));
                (wins - own_win) as f64 / others as f64
            }
        } else if total == 0 {
            0.0
        } else {
            wins as f64 / total as f64
        };
    }
}
