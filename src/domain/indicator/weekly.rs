//! 7-day period aggregation for the DTI.
//!
//! Daily bars are collapsed into fixed-size blocks of consecutive entries
//! (not calendar weeks), the DTI is computed over the block-level high/low
//! series, and each block's scalar value is mapped back onto every daily
//! index the block spans.

use chrono::NaiveDate;

use crate::domain::error::DtiTraderError;
use crate::domain::indicator::dti;

pub const BLOCK_SIZE: usize = 7;

/// One fixed-size run of daily bars.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodBlock {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_index: usize,
    pub end_index: usize,
    pub high: f64,
    pub low: f64,
}

/// Collapse daily bars into blocks of `block_size` consecutive entries.
/// The final block may be shorter.
pub fn aggregate_blocks(
    dates: &[NaiveDate],
    high: &[f64],
    low: &[f64],
    block_size: usize,
) -> Result<Vec<PeriodBlock>, DtiTraderError> {
    if dates.len() != high.len() || dates.len() != low.len() {
        return Err(DtiTraderError::InvalidSeries {
            reason: format!(
                "misaligned aggregation input: dates={} high={} low={}",
                dates.len(),
                high.len(),
                low.len()
            ),
        });
    }
    if dates.is_empty() {
        return Err(DtiTraderError::InvalidSeries {
            reason: "aggregation input is empty".into(),
        });
    }
    if block_size == 0 {
        return Err(DtiTraderError::InvalidPeriod {
            name: "block_size".into(),
            period: block_size,
        });
    }

    let mut blocks = Vec::with_capacity(dates.len().div_ceil(block_size));
    let mut start = 0;

    while start < dates.len() {
        let end = (start + block_size - 1).min(dates.len() - 1);
        let block_high = high[start..=end]
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        let block_low = low[start..=end].iter().cloned().fold(f64::INFINITY, f64::min);

        blocks.push(PeriodBlock {
            start_date: dates[start],
            end_date: dates[end],
            start_index: start,
            end_index: end,
            high: block_high,
            low: block_low,
        });
        start = end + 1;
    }

    Ok(blocks)
}

/// DTI over 7-bar blocks, back-mapped onto the daily axis.
///
/// The returned vector has one entry per daily bar; the value is constant
/// across all days covered by a block. Indices not covered by any block
/// stay `None`.
pub fn seven_day_dti(
    dates: &[NaiveDate],
    high: &[f64],
    low: &[f64],
    r: usize,
    s: usize,
    u: usize,
) -> Result<Vec<Option<f64>>, DtiTraderError> {
    let blocks = aggregate_blocks(dates, high, low, BLOCK_SIZE)?;

    let block_high: Vec<f64> = blocks.iter().map(|b| b.high).collect();
    let block_low: Vec<f64> = blocks.iter().map(|b| b.low).collect();
    let block_dti = dti(&block_high, &block_low, r, s, u)?;

    let mut daily = vec![None; dates.len()];
    for (block, &value) in blocks.iter().zip(block_dti.iter()) {
        for slot in &mut daily[block.start_index..=block.end_index] {
            *slot = Some(value);
        }
    }

    Ok(daily)
}
