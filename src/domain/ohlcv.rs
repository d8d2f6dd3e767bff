//! Price series representation: parallel date/OHLCV arrays per symbol.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::error::DtiTraderError;

/// Daily OHLCV history for one symbol, stored as parallel arrays.
///
/// All arrays share identical length and index alignment; dates are
/// strictly ascending (weekends typically absent).
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub symbol: String,
    pub market: String,
    pub dates: Vec<NaiveDate>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<i64>,
    date_index: HashMap<NaiveDate, usize>,
}

impl PriceSeries {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: String,
        market: String,
        dates: Vec<NaiveDate>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        volume: Vec<i64>,
    ) -> Result<Self, DtiTraderError> {
        let n = dates.len();
        if open.len() != n || high.len() != n || low.len() != n || close.len() != n
            || volume.len() != n
        {
            return Err(DtiTraderError::InvalidSeries {
                reason: format!(
                    "misaligned arrays for {}: dates={} open={} high={} low={} close={} volume={}",
                    symbol,
                    n,
                    open.len(),
                    high.len(),
                    low.len(),
                    close.len(),
                    volume.len()
                ),
            });
        }
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(DtiTraderError::InvalidSeries {
                reason: format!("dates for {} are not strictly ascending", symbol),
            });
        }

        let date_index = dates.iter().enumerate().map(|(i, &d)| (d, i)).collect();
        Ok(Self {
            symbol,
            market,
            dates,
            open,
            high,
            low,
            close,
            volume,
            date_index,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.index_of(date).map(|i| self.close[i])
    }
}
