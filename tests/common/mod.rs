#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, Weekday};
use std::fs;
use std::path::Path;

use dtitrader::domain::backtest::{DtiParams, TradeRules};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `n` consecutive trading days (weekends skipped) starting at `start`.
pub fn trading_dates(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(n);
    let mut current = start;
    while dates.len() < n {
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(current);
        }
        current += chrono::Duration::days(1);
    }
    dates
}

/// Write a `SYMBOL_MARKET.csv` fixture with one bar per trading day;
/// high = close + 1, low = close - 1.
pub fn write_symbol_csv(
    dir: &Path,
    symbol: &str,
    market: &str,
    start: NaiveDate,
    closes: &[f64],
) {
    let dates = trading_dates(start, closes.len());
    let mut content = String::from("date,open,high,low,close,volume\n");
    for (date, close) in dates.iter().zip(closes.iter()) {
        content.push_str(&format!(
            "{},{},{},{},{},1000\n",
            date,
            close,
            close + 1.0,
            close - 1.0,
            close
        ));
    }
    fs::write(dir.join(format!("{}_{}.csv", symbol, market)), content).unwrap();
}

/// Unit smoothing periods turn the DTI into a pure sign indicator, which
/// makes entries and exits hand-checkable.
pub fn unit_dti_params() -> DtiParams {
    DtiParams {
        r: 1,
        s: 1,
        u: 1,
        entry_threshold: 0.0,
    }
}

pub fn default_rules() -> TradeRules {
    TradeRules::default()
}

/// One falling week then a strong rising week: entry on the 8th bar at
/// 96.0, take-profit on the 12th bar at 104.0.
pub fn take_profit_closes() -> Vec<f64> {
    vec![
        100.0, 99.0, 98.0, 97.0, 96.0, 95.0, 94.0, //
        96.0, 98.0, 100.0, 102.0, 104.0, 106.0, 108.0,
    ]
}

/// Falling week, a pop above the prior week's range, then a drift that
/// never hits a stop or target: the trade stays open.
pub fn open_trade_closes() -> Vec<f64> {
    vec![
        100.0, 99.0, 98.0, 97.0, 96.0, 95.0, 94.0, //
        102.0, 101.0, 100.0, 101.0, 102.0, 101.0, 100.0,
    ]
}

/// A config file covering scan and simulation for the fixture data.
pub fn write_config_file(dir: &Path, data_path: &Path) -> std::path::PathBuf {
    let content = format!(
        "[data]\n\
         path = {}\n\n\
         [dti]\n\
         r = 1\n\
         s = 1\n\
         u = 1\n\
         entry_threshold = 0\n\n\
         [trading]\n\
         take_profit_pct = 8\n\
         stop_loss_pct = 5\n\
         max_holding_days = 30\n\n\
         [conviction]\n\
         min_trades = 5\n\
         min_win_rate = 75\n\
         recency_days = 5\n\
         max_opportunities = 10\n\n\
         [portfolio]\n\
         start_date = 2024-07-01\n\
         max_total_positions = 30\n\
         max_per_market = 10\n\
         display_currency = INR\n\
         markets = India:50000:INR, UK:500:GBP, US:600:USD\n\n\
         [fx]\n\
         rates = GBP:INR:105.0, USD:INR:84.0, GBP:USD:1.25\n",
        data_path.display()
    );
    let path = dir.join("dtitrader.ini");
    fs::write(&path, content).unwrap();
    path
}
