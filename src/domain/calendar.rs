//! Trading-day calendar helpers. Weekends are the only non-trading days;
//! exchange holidays are not modelled.

use chrono::{Datelike, NaiveDate, Weekday};

/// Calendar days scanned at most while collecting recent trading days.
pub const LOOKBACK_SCAN_CAP: usize = 10;

pub fn is_trading_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The last `n` trading days ending at `today` (inclusive), newest first.
///
/// Walks backward one calendar day at a time, skipping Saturdays and
/// Sundays, and gives up after [`LOOKBACK_SCAN_CAP`] calendar days even if
/// fewer than `n` trading days were found.
pub fn last_trading_days(today: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(n);
    let mut date = today;
    let mut scanned = 0;

    while days.len() < n && scanned < LOOKBACK_SCAN_CAP {
        if is_trading_day(date) {
            days.push(date);
        }
        date -= chrono::Duration::days(1);
        scanned += 1;
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekdays_are_trading_days() {
        // 2024-07-01 is a Monday.
        assert!(is_trading_day(date(2024, 7, 1)));
        assert!(is_trading_day(date(2024, 7, 5)));
        assert!(!is_trading_day(date(2024, 7, 6)));
        assert!(!is_trading_day(date(2024, 7, 7)));
    }

    #[test]
    fn lookback_from_friday_stays_in_week() {
        // 2024-07-05 is a Friday; five trading days back is Mon-Fri.
        let days = last_trading_days(date(2024, 7, 5), 5);
        assert_eq!(
            days,
            vec![
                date(2024, 7, 5),
                date(2024, 7, 4),
                date(2024, 7, 3),
                date(2024, 7, 2),
                date(2024, 7, 1),
            ]
        );
    }

    #[test]
    fn lookback_from_monday_skips_weekend() {
        // 2024-07-08 is a Monday; the previous trading day is Friday the 5th.
        let days = last_trading_days(date(2024, 7, 8), 3);
        assert_eq!(
            days,
            vec![date(2024, 7, 8), date(2024, 7, 5), date(2024, 7, 4)]
        );
    }

    #[test]
    fn lookback_from_weekend_starts_at_friday() {
        // 2024-07-07 is a Sunday.
        let days = last_trading_days(date(2024, 7, 7), 2);
        assert_eq!(days, vec![date(2024, 7, 5), date(2024, 7, 4)]);
    }

    #[test]
    fn lookback_never_scans_past_cap() {
        // Even asking for far more days than the cap allows terminates.
        let days = last_trading_days(date(2024, 7, 5), 50);
        assert!(days.len() <= LOOKBACK_SCAN_CAP);
        // 10 calendar days back from a Friday contain 8 trading days.
        assert_eq!(days.len(), 8);
    }
}
