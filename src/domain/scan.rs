//! Batch signal generation across a symbol catalog.
//!
//! Symbols are processed one at a time with no shared state between them;
//! a failure fetching or scanning one symbol is logged and recorded,
//! never fatal to the batch. Results are collected into a single ordered
//! structure before any simulation runs.

use tracing::{info, warn};

use crate::domain::backtest::{scan_symbol, DtiParams, TradeRules};
use crate::domain::error::DtiTraderError;
use crate::domain::signal::Signal;
use crate::ports::data_port::{CatalogEntry, DataPort};

/// A symbol excluded from the batch, with the failure that excluded it.
#[derive(Debug)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub market: String,
    pub error: DtiTraderError,
}

/// Batch output: all signals in catalog-then-entry-date order, plus the
/// symbols that had to be excluded.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub signals: Vec<Signal>,
    pub skipped: Vec<SkippedSymbol>,
}

/// Scan every catalog entry. Per-symbol signal order is chronological;
/// the overall order follows the catalog, which downstream admission
/// treats as the FIFO preference order for same-day signals.
pub fn scan_universe(
    data: &dyn DataPort,
    catalog: &[CatalogEntry],
    params: &DtiParams,
    rules: &TradeRules,
) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for entry in catalog {
        match scan_one(data, entry, params, rules) {
            Ok(mut signals) => outcome.signals.append(&mut signals),
            Err(error) => {
                warn!(symbol = %entry.symbol, market = %entry.market, %error, "excluding symbol from scan");
                outcome.skipped.push(SkippedSymbol {
                    symbol: entry.symbol.clone(),
                    market: entry.market.clone(),
                    error,
                });
            }
        }
    }

    // Same-day signals across symbols must be grouped by date for FIFO
    // admission; a stable sort keeps catalog order within a day.
    outcome.signals.sort_by_key(|s| s.entry_date);

    info!(
        signals = outcome.signals.len(),
        skipped = outcome.skipped.len(),
        "scan complete"
    );
    outcome
}

fn scan_one(
    data: &dyn DataPort,
    entry: &CatalogEntry,
    params: &DtiParams,
    rules: &TradeRules,
) -> Result<Vec<Signal>, DtiTraderError> {
    let series = data.fetch_series(&entry.symbol, &entry.market)?;
    if series.is_empty() {
        return Err(DtiTraderError::NoData {
            symbol: entry.symbol.clone(),
            market: entry.market.clone(),
        });
    }
    scan_symbol(&series, params, rules)
}
