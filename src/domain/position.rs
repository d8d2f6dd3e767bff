//! Position lifecycle records: open positions, the closed-trade ledger,
//! and daily valuations.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// A currently-open allocation owned by the simulator.
///
/// `trade_size` is the market's fixed notional and is never re-sized
/// while the position lives.
#[derive(Debug, Clone, Serialize)]
pub struct Position {
    pub symbol: String,
    pub market: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub trade_size: f64,
    pub currency: String,
    pub win_rate_at_entry: f64,
}

/// A realized trade. Append-only: once in the ledger, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct ClosedTrade {
    pub symbol: String,
    pub market: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub trade_size: f64,
    pub currency: String,
    pub win_rate_at_entry: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub pl_percent: f64,
    pub exit_reason: String,
    pub holding_days: i64,
}

impl ClosedTrade {
    /// Realized profit in the position's home currency.
    pub fn realized_pl(&self) -> f64 {
        self.trade_size * self.pl_percent / 100.0
    }
}

/// One record per simulated trading day.
#[derive(Debug, Clone, Serialize)]
pub struct DailyValuation {
    pub date: NaiveDate,
    /// Open notional plus cumulative realized P/L, in the display currency.
    pub value: f64,
    pub active_position_count: usize,
    pub positions_by_market: BTreeMap<String, usize>,
}
