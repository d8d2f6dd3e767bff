//! Conviction filter: ranks open opportunities by historical win rate.
//!
//! A symbol earns a high-conviction ranking only once its completed trade
//! history is deep enough to mean something; recency gates out stale
//! entries. When the batch carries no completed history at all the filter
//! degrades to an explicit unranked passthrough.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::domain::calendar::last_trading_days;
use crate::domain::signal::Signal;

#[derive(Debug, Clone, PartialEq)]
pub struct ConvictionParams {
    /// Completed trades a symbol needs before its win rate is trusted.
    pub min_trades: usize,
    /// Exclusive win-rate floor for high conviction.
    pub min_win_rate: f64,
    /// Recency window in trading days.
    pub recency_days: usize,
    /// Passthrough size when no history exists.
    pub max_opportunities: usize,
}

impl Default for ConvictionParams {
    fn default() -> Self {
        ConvictionParams {
            min_trades: 5,
            min_win_rate: 0.75,
            recency_days: 5,
            max_opportunities: 10,
        }
    }
}

/// Filter outcome. `Unranked` is the no-history fallback, not an error:
/// with zero completed trades in the batch, win-rate filtering is
/// impossible and recency is the only available signal.
#[derive(Debug, Clone)]
pub enum Opportunities {
    Ranked(Vec<Signal>),
    Unranked(Vec<Signal>),
}

impl Opportunities {
    pub fn as_slice(&self) -> &[Signal] {
        match self {
            Opportunities::Ranked(s) | Opportunities::Unranked(s) => s,
        }
    }

    pub fn is_ranked(&self) -> bool {
        matches!(self, Opportunities::Ranked(_))
    }
}

/// Per-symbol completed-trade history.
#[derive(Debug, Clone, Copy, Default)]
struct SymbolRecord {
    completed: usize,
    wins: usize,
}

impl SymbolRecord {
    fn win_rate(&self) -> f64 {
        if self.completed == 0 {
            0.0
        } else {
            self.wins as f64 / self.completed as f64
        }
    }
}

/// Reduce a batch of per-symbol signals to actionable opportunities.
///
/// Opportunities are open (uncompleted) signals whose entry date falls in
/// the last `recency_days` trading days of `today`. With history present,
/// only symbols with at least `min_trades` completed trades and a win rate
/// strictly above `min_win_rate` survive, sorted by win rate descending
/// (most recent entry first on ties).
pub fn filter_opportunities(
    signals: &[Signal],
    today: NaiveDate,
    params: &ConvictionParams,
) -> Opportunities {
    let mut history: HashMap<&str, SymbolRecord> = HashMap::new();
    for signal in signals.iter().filter(|s| s.is_completed()) {
        let record = history.entry(signal.symbol.as_str()).or_default();
        record.completed += 1;
        if signal.is_win() {
            record.wins += 1;
        }
    }

    let window = last_trading_days(today, params.recency_days);
    let recent: Vec<&Signal> = signals
        .iter()
        .filter(|s| !s.is_completed() && window.contains(&s.entry_date))
        .collect();

    if history.is_empty() {
        let passthrough = recent
            .into_iter()
            .take(params.max_opportunities)
            .cloned()
            .collect();
        return Opportunities::Unranked(passthrough);
    }

    let mut ranked: Vec<Signal> = recent
        .into_iter()
        .filter(|s| {
            history
                .get(s.symbol.as_str())
                .is_some_and(|r| r.completed >= params.min_trades && r.win_rate() > params.min_win_rate)
        })
        .cloned()
        .collect();

    ranked.sort_by(|a, b| {
        b.historical_win_rate
            .partial_cmp(&a.historical_win_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.entry_date.cmp(&a.entry_date))
    });

    Opportunities::Ranked(ranked)
}
