//! Portfolio state: open positions in admission order, the append-only
//! trade ledger, and the daily valuation series.

use std::collections::BTreeMap;

use super::position::{ClosedTrade, DailyValuation, Position};

#[derive(Debug, Clone, Default)]
pub struct Portfolio {
    /// Open positions in admission order.
    pub open_positions: Vec<Position>,
    pub closed_trades: Vec<ClosedTrade>,
    pub valuations: Vec<DailyValuation>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_position(&mut self, position: Position) {
        self.open_positions.push(position);
    }

    pub fn open_count(&self) -> usize {
        self.open_positions.len()
    }

    pub fn open_in_market(&self, market: &str) -> usize {
        self.open_positions
            .iter()
            .filter(|p| p.market == market)
            .count()
    }

    pub fn market_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for position in &self.open_positions {
            *counts.entry(position.market.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn record_trade(&mut self, trade: ClosedTrade) {
        self.closed_trades.push(trade);
    }

    pub fn record_valuation(&mut self, valuation: DailyValuation) {
        self.valuations.push(valuation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_position(symbol: &str, market: &str) -> Position {
        Position {
            symbol: symbol.into(),
            market: market.into(),
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            entry_price: 100.0,
            trade_size: 50_000.0,
            currency: "INR".into(),
            win_rate_at_entry: 0.8,
        }
    }

    #[test]
    fn new_portfolio_is_empty() {
        let portfolio = Portfolio::new();
        assert_eq!(portfolio.open_count(), 0);
        assert!(portfolio.closed_trades.is_empty());
        assert!(portfolio.valuations.is_empty());
    }

    #[test]
    fn open_positions_keep_admission_order() {
        let mut portfolio = Portfolio::new();
        portfolio.open_position(sample_position("A", "India"));
        portfolio.open_position(sample_position("B", "UK"));
        portfolio.open_position(sample_position("C", "India"));

        let symbols: Vec<&str> = portfolio
            .open_positions
            .iter()
            .map(|p| p.symbol.as_str())
            .collect();
        assert_eq!(symbols, vec!["A", "B", "C"]);
    }

    #[test]
    fn market_counts_group_open_positions() {
        let mut portfolio = Portfolio::new();
        portfolio.open_position(sample_position("A", "India"));
        portfolio.open_position(sample_position("B", "UK"));
        portfolio.open_position(sample_position("C", "India"));

        assert_eq!(portfolio.open_in_market("India"), 2);
        assert_eq!(portfolio.open_in_market("UK"), 1);
        assert_eq!(portfolio.open_in_market("US"), 0);

        let counts = portfolio.market_counts();
        assert_eq!(counts.get("India"), Some(&2));
        assert_eq!(counts.get("UK"), Some(&1));
    }
}
