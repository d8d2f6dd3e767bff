//! Trade signal records produced by the per-symbol scan.

use chrono::NaiveDate;
use serde::Serialize;

pub const REASON_TAKE_PROFIT: &str = "Take Profit";
pub const REASON_STOP_LOSS: &str = "Stop Loss";
pub const REASON_MAX_DAYS: &str = "Max Days";

/// A candidate trade opportunity for one symbol.
///
/// Completed signals carry exit fields; a signal still open at the end of
/// its symbol's history has `None` for all of them. Immutable once
/// produced.
#[derive(Debug, Clone, Serialize)]
pub struct Signal {
    pub symbol: String,
    pub market: String,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
    pub pl_percent: Option<f64>,
    pub holding_days: Option<i64>,
    pub exit_reason: Option<String>,
    /// Win fraction across the symbol's *other* completed signals.
    pub historical_win_rate: f64,
}

impl Signal {
    pub fn is_completed(&self) -> bool {
        self.exit_date.is_some()
    }

    pub fn is_win(&self) -> bool {
        self.pl_percent.is_some_and(|pl| pl > 0.0)
    }
}
