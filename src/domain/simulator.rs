//! Day-by-day portfolio simulation.
//!
//! Walks calendar days in ascending order (weekends skipped entirely),
//! applying pre-computed signal exits, admitting same-day signals FIFO
//! under the position caps, and recording a currency-normalized valuation
//! per trading day. Single-threaded by construction: each day's admission
//! decisions depend on the running open-position counts.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::domain::calendar::is_trading_day;
use crate::domain::currency::FxTable;
use crate::domain::error::DtiTraderError;
use crate::domain::portfolio::Portfolio;
use crate::domain::position::{ClosedTrade, DailyValuation, Position};
use crate::domain::signal::Signal;

/// Per-market fixed notional and its home currency.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketAllocation {
    pub trade_size: f64,
    pub currency: String,
}

/// Simulation window, caps, market table, and FX configuration.
/// Passed explicitly into [`run`]; there is no module-level state.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub max_total_positions: usize,
    pub max_per_market: usize,
    pub markets: BTreeMap<String, MarketAllocation>,
    pub display_currency: String,
    pub fx: FxTable,
}

impl SimulatorConfig {
    /// Defaults per the standard deployment: 30 total slots, 10 per
    /// market, India/UK/US allocations, INR display.
    pub fn with_defaults(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        let mut markets = BTreeMap::new();
        markets.insert(
            "India".to_string(),
            MarketAllocation {
                trade_size: 50_000.0,
                currency: "INR".to_string(),
            },
        );
        markets.insert(
            "UK".to_string(),
            MarketAllocation {
                trade_size: 500.0,
                currency: "GBP".to_string(),
            },
        );
        markets.insert(
            "US".to_string(),
            MarketAllocation {
                trade_size: 600.0,
                currency: "USD".to_string(),
            },
        );

        SimulatorConfig {
            start_date,
            end_date,
            max_total_positions: 30,
            max_per_market: 10,
            markets,
            display_currency: "INR".to_string(),
            fx: FxTable::default_rates(),
        }
    }
}

/// Why a signal was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    PortfolioFull,
    MarketFull,
    UnknownMarket,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::PortfolioFull => "portfolio full",
            SkipReason::MarketFull => "market full",
            SkipReason::UnknownMarket => "unknown market",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedSignal {
    pub symbol: String,
    pub market: String,
    pub entry_date: NaiveDate,
    pub reason: SkipReason,
}

/// Everything a run produces: the ledger, the valuation series, positions
/// still open at the end, and the skip-log. All plain data.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub trades: Vec<ClosedTrade>,
    pub valuations: Vec<DailyValuation>,
    pub open_positions: Vec<Position>,
    pub skipped: Vec<SkippedSignal>,
}

/// Replay `signals` through the portfolio, day by day.
///
/// Signals must be supplied in the order admission should prefer them:
/// within one day they are processed FIFO and the order is a correctness
/// guarantee, not a hint.
pub fn run(config: &SimulatorConfig, signals: &[Signal]) -> Result<SimulationResult, DtiTraderError> {
    if config.start_date > config.end_date {
        return Err(DtiTraderError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "start_date".to_string(),
            reason: "start_date is after end_date".to_string(),
        });
    }
    if config.max_total_positions == 0 || config.max_per_market == 0 {
        return Err(DtiTraderError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "max_total_positions".to_string(),
            reason: "position caps must be at least 1".to_string(),
        });
    }

    // Exit lookup keyed by (symbol, entry date), built once per run.
    let exit_index: HashMap<(String, NaiveDate), &Signal> = signals
        .iter()
        .map(|s| ((s.symbol.clone(), s.entry_date), s))
        .collect();

    // Same-day batches, preserving supplied order.
    let mut by_entry_date: HashMap<NaiveDate, Vec<&Signal>> = HashMap::new();
    for signal in signals {
        by_entry_date.entry(signal.entry_date).or_default().push(signal);
    }

    let mut portfolio = Portfolio::new();
    let mut skipped = Vec::new();
    // Running realized P/L in the display currency, so valuation stays O(1)
    // in the ledger size.
    let mut realized = 0.0;

    let mut date = config.start_date;
    while date <= config.end_date {
        if !is_trading_day(date) {
            date += chrono::Duration::days(1);
            continue;
        }

        // 1. Exits: positions whose originating signal exits today.
        let mut still_open = Vec::with_capacity(portfolio.open_positions.len());
        for position in std::mem::take(&mut portfolio.open_positions) {
            let key = (position.symbol.clone(), position.entry_date);
            let exiting = exit_index
                .get(&key)
                .filter(|s| s.exit_date == Some(date))
                .and_then(|s| s.exit_price.map(|price| (*s, price)));

            match exiting {
                Some((signal, exit_price)) => {
                    let trade = close_position(position, signal, date, exit_price);
                    realized += config.fx.convert(
                        trade.realized_pl(),
                        &trade.currency,
                        &config.display_currency,
                    )?;
                    portfolio.record_trade(trade);
                }
                None => still_open.push(position),
            }
        }
        portfolio.open_positions = still_open;

        // 2. Admission: today's signals, FIFO. Counters are seeded once
        // from the open set and updated locally, so an admission earlier
        // in the batch reduces the room seen by later signals.
        if let Some(batch) = by_entry_date.get(&date) {
            let mut total = portfolio.open_count();
            let mut per_market = portfolio.market_counts();

            for signal in batch {
                let Some(allocation) = config.markets.get(&signal.market) else {
                    debug!(symbol = %signal.symbol, market = %signal.market, "skipping signal for unrecognized market");
                    skipped.push(skip(signal, SkipReason::UnknownMarket));
                    continue;
                };
                if total >= config.max_total_positions {
                    skipped.push(skip(signal, SkipReason::PortfolioFull));
                    continue;
                }
                let in_market = per_market.get(&signal.market).copied().unwrap_or(0);
                if in_market >= config.max_per_market {
                    skipped.push(skip(signal, SkipReason::MarketFull));
                    continue;
                }

                portfolio.open_position(Position {
                    symbol: signal.symbol.clone(),
                    market: signal.market.clone(),
                    entry_date: signal.entry_date,
                    entry_price: signal.entry_price,
                    trade_size: allocation.trade_size,
                    currency: allocation.currency.clone(),
                    win_rate_at_entry: signal.historical_win_rate,
                });
                total += 1;
                *per_market.entry(signal.market.clone()).or_insert(0) += 1;
            }
        }

        // 3. Valuation: open notional plus realized P/L, display currency.
        let mut value = realized;
        for position in &portfolio.open_positions {
            value += config.fx.convert(
                position.trade_size,
                &position.currency,
                &config.display_currency,
            )?;
        }
        portfolio.record_valuation(DailyValuation {
            date,
            value,
            active_position_count: portfolio.open_count(),
            positions_by_market: portfolio.market_counts(),
        });

        date += chrono::Duration::days(1);
    }

    if !skipped.is_empty() {
        warn!(count = skipped.len(), "signals excluded during simulation");
    }

    Ok(SimulationResult {
        trades: portfolio.closed_trades,
        valuations: portfolio.valuations,
        open_positions: portfolio.open_positions,
        skipped,
    })
}

fn close_position(
    position: Position,
    signal: &Signal,
    exit_date: NaiveDate,
    exit_price: f64,
) -> ClosedTrade {
    let pl_percent = signal
        .pl_percent
        .unwrap_or((exit_price - position.entry_price) / position.entry_price * 100.0);
    let holding_days = signal
        .holding_days
        .unwrap_or((exit_date - position.entry_date).num_days());
    let exit_reason = signal
        .exit_reason
        .clone()
        .unwrap_or_else(|| "Signal Exit".to_string());

    ClosedTrade {
        symbol: position.symbol,
        market: position.market,
        entry_date: position.entry_date,
        entry_price: position.entry_price,
        trade_size: position.trade_size,
        currency: position.currency,
        win_rate_at_entry: position.win_rate_at_entry,
        exit_date,
        exit_price,
        pl_percent,
        exit_reason,
        holding_days,
    }
}

fn skip(signal: &Signal, reason: SkipReason) -> SkippedSignal {
    SkippedSignal {
        symbol: signal.symbol.clone(),
        market: signal.market.clone(),
        entry_date: signal.entry_date,
        reason,
    }
}
