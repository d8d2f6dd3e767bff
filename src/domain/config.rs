//! Typed configuration loading and validation.
//!
//! Raw values come through [`ConfigPort`]; everything is validated into
//! plain domain structs before any computation starts. Malformed
//! configuration fails fast; nothing downstream runs on partial config.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::backtest::{DtiParams, TradeRules};
use crate::domain::conviction::ConvictionParams;
use crate::domain::currency::FxTable;
use crate::domain::error::DtiTraderError;
use crate::domain::simulator::{MarketAllocation, SimulatorConfig};
use crate::ports::config_port::ConfigPort;

/// Everything the signal-generation phase needs.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub data_path: PathBuf,
    pub dti: DtiParams,
    pub rules: TradeRules,
    pub conviction: ConvictionParams,
}

pub fn load_scan_config(config: &dyn ConfigPort) -> Result<ScanConfig, DtiTraderError> {
    let data_path = config
        .get_string("data", "path")
        .map(PathBuf::from)
        .ok_or_else(|| DtiTraderError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;

    Ok(ScanConfig {
        data_path,
        dti: load_dti_params(config)?,
        rules: load_trade_rules(config)?,
        conviction: load_conviction_params(config)?,
    })
}

pub fn load_dti_params(config: &dyn ConfigPort) -> Result<DtiParams, DtiTraderError> {
    let defaults = DtiParams::default();
    let r = positive_period(config, "dti", "r", defaults.r)?;
    let s = positive_period(config, "dti", "s", defaults.s)?;
    let u = positive_period(config, "dti", "u", defaults.u)?;
    let entry_threshold = config.get_double("dti", "entry_threshold", defaults.entry_threshold);

    Ok(DtiParams {
        r,
        s,
        u,
        entry_threshold,
    })
}

pub fn load_trade_rules(config: &dyn ConfigPort) -> Result<TradeRules, DtiTraderError> {
    let defaults = TradeRules::default();
    let take_profit_pct = config.get_double("trading", "take_profit_pct", defaults.take_profit_pct);
    let stop_loss_pct = config.get_double("trading", "stop_loss_pct", defaults.stop_loss_pct);
    let max_holding_days = config.get_int("trading", "max_holding_days", defaults.max_holding_days);

    if take_profit_pct <= 0.0 {
        return Err(invalid("trading", "take_profit_pct", "must be positive"));
    }
    if stop_loss_pct <= 0.0 {
        return Err(invalid("trading", "stop_loss_pct", "must be positive"));
    }
    if max_holding_days < 1 {
        return Err(invalid("trading", "max_holding_days", "must be at least 1"));
    }

    Ok(TradeRules {
        take_profit_pct,
        stop_loss_pct,
        max_holding_days,
    })
}

pub fn load_conviction_params(config: &dyn ConfigPort) -> Result<ConvictionParams, DtiTraderError> {
    let defaults = ConvictionParams::default();
    let min_trades = config.get_int("conviction", "min_trades", defaults.min_trades as i64);
    let min_win_rate_pct =
        config.get_double("conviction", "min_win_rate", defaults.min_win_rate * 100.0);
    let recency_days = config.get_int("conviction", "recency_days", defaults.recency_days as i64);
    let max_opportunities = config.get_int(
        "conviction",
        "max_opportunities",
        defaults.max_opportunities as i64,
    );

    if min_trades < 1 {
        return Err(invalid("conviction", "min_trades", "must be at least 1"));
    }
    if !(0.0..=100.0).contains(&min_win_rate_pct) {
        return Err(invalid("conviction", "min_win_rate", "must be 0..=100"));
    }
    if recency_days < 1 {
        return Err(invalid("conviction", "recency_days", "must be at least 1"));
    }
    if max_opportunities < 1 {
        return Err(invalid("conviction", "max_opportunities", "must be at least 1"));
    }

    Ok(ConvictionParams {
        min_trades: min_trades as usize,
        min_win_rate: min_win_rate_pct / 100.0,
        recency_days: recency_days as usize,
        max_opportunities: max_opportunities as usize,
    })
}

/// Load the simulator configuration. `end_date` defaults to `default_end`
/// when the config omits it; `start_date` is required.
pub fn load_simulator_config(
    config: &dyn ConfigPort,
    default_end: NaiveDate,
) -> Result<SimulatorConfig, DtiTraderError> {
    let start_date = parse_date(config, "portfolio", "start_date", None)?;
    let end_date = parse_date(config, "portfolio", "end_date", Some(default_end))?;
    if start_date > end_date {
        return Err(invalid("portfolio", "start_date", "must not be after end_date"));
    }

    let max_total_positions = config.get_int("portfolio", "max_total_positions", 30);
    let max_per_market = config.get_int("portfolio", "max_per_market", 10);
    if max_total_positions < 1 {
        return Err(invalid("portfolio", "max_total_positions", "must be at least 1"));
    }
    if max_per_market < 1 {
        return Err(invalid("portfolio", "max_per_market", "must be at least 1"));
    }

    let display_currency = config
        .get_string("portfolio", "display_currency")
        .unwrap_or_else(|| "INR".to_string());

    let markets = match config.get_string("portfolio", "markets") {
        Some(spec) => parse_markets(&spec)?,
        None => SimulatorConfig::with_defaults(start_date, end_date).markets,
    };
    if markets.is_empty() {
        return Err(invalid("portfolio", "markets", "must list at least one market"));
    }

    let fx = match config.get_string("fx", "rates") {
        Some(spec) => parse_fx(&spec)?,
        None => FxTable::default_rates(),
    };

    Ok(SimulatorConfig {
        start_date,
        end_date,
        max_total_positions: max_total_positions as usize,
        max_per_market: max_per_market as usize,
        markets,
        display_currency,
        fx,
    })
}

/// `Name:size:currency` entries, comma-separated.
/// Example: `India:50000:INR, UK:500:GBP, US:600:USD`.
fn parse_markets(spec: &str) -> Result<BTreeMap<String, MarketAllocation>, DtiTraderError> {
    let mut markets = BTreeMap::new();

    for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
        let [name, size, currency] = parts.as_slice() else {
            return Err(invalid(
                "portfolio",
                "markets",
                &format!("expected Name:size:currency, got '{}'", entry),
            ));
        };

        let trade_size: f64 = size.parse().map_err(|_| {
            invalid("portfolio", "markets", &format!("bad trade size '{}'", size))
        })?;
        if trade_size <= 0.0 {
            return Err(invalid("portfolio", "markets", "trade size must be positive"));
        }
        if name.is_empty() || currency.is_empty() {
            return Err(invalid("portfolio", "markets", "empty market or currency name"));
        }

        markets.insert(
            name.to_string(),
            MarketAllocation {
                trade_size,
                currency: currency.to_string(),
            },
        );
    }

    Ok(markets)
}

/// `FROM:TO:rate` entries, comma-separated.
/// Example: `GBP:INR:105.0, USD:INR:84.0, GBP:USD:1.25`.
fn parse_fx(spec: &str) -> Result<FxTable, DtiTraderError> {
    let mut table = FxTable::new();

    for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
        let [from, to, rate] = parts.as_slice() else {
            return Err(invalid(
                "fx",
                "rates",
                &format!("expected FROM:TO:rate, got '{}'", entry),
            ));
        };

        let rate: f64 = rate
            .parse()
            .map_err(|_| invalid("fx", "rates", &format!("bad rate in '{}'", entry)))?;
        if rate <= 0.0 {
            return Err(invalid("fx", "rates", "rates must be positive"));
        }

        table.insert(from, to, rate);
    }

    Ok(table)
}

fn parse_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: Option<NaiveDate>,
) -> Result<NaiveDate, DtiTraderError> {
    match config.get_string(section, key) {
        Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| {
            invalid(section, key, "invalid date, expected YYYY-MM-DD")
        }),
        None => default.ok_or_else(|| DtiTraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn positive_period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, DtiTraderError> {
    let value = config.get_int(section, key, default as i64);
    if value < 1 {
        return Err(invalid(section, key, "must be at least 1"));
    }
    Ok(value as usize)
}

fn invalid(section: &str, key: &str, reason: &str) -> DtiTraderError {
    DtiTraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
