//! Fixed-rate currency conversion.
//!
//! Rates are static configuration; there are no live FX lookups. An
//! unlisted pair is a hard error rather than a silent passthrough, so a
//! mis-configured table surfaces immediately instead of skewing
//! valuations.

use std::collections::HashMap;

use crate::domain::error::DtiTraderError;

#[derive(Debug, Clone, Default)]
pub struct FxTable {
    rates: HashMap<(String, String), f64>,
}

impl FxTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// INR/GBP/USD cross rates used when no table is configured.
    pub fn default_rates() -> Self {
        let mut table = Self::new();
        table.insert("GBP", "INR", 105.0);
        table.insert("USD", "INR", 84.0);
        table.insert("GBP", "USD", 1.25);
        table
    }

    /// Register a rate and its reciprocal.
    pub fn insert(&mut self, from: &str, to: &str, rate: f64) {
        self.rates.insert((from.to_string(), to.to_string()), rate);
        self.rates
            .insert((to.to_string(), from.to_string()), 1.0 / rate);
    }

    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, DtiTraderError> {
        if from == to {
            return Ok(amount);
        }
        match self.rates.get(&(from.to_string(), to.to_string())) {
            Some(rate) => Ok(amount * rate),
            None => Err(DtiTraderError::UnknownCurrencyPair {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}
