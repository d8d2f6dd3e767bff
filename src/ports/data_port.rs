//! Price data port trait.

use crate::domain::error::DtiTraderError;
use crate::domain::ohlcv::PriceSeries;

/// One tradable symbol and the market it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub symbol: String,
    pub market: String,
}

/// Port for fetching per-symbol OHLCV history and the symbol catalog.
pub trait DataPort {
    fn fetch_series(&self, symbol: &str, market: &str) -> Result<PriceSeries, DtiTraderError>;

    /// All known symbols grouped by market, in a stable order.
    fn catalog(&self) -> Result<Vec<CatalogEntry>, DtiTraderError>;

    fn list_symbols(&self, market: &str) -> Result<Vec<String>, DtiTraderError>;
}
