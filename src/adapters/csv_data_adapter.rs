//! CSV file data adapter.
//!
//! One `SYMBOL_MARKET.csv` file per symbol with
//! `date,open,high,low,close,volume` rows. The directory listing doubles
//! as the symbol catalog.

use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::domain::error::DtiTraderError;
use crate::domain::ohlcv::PriceSeries;
use crate::ports::data_port::{CatalogEntry, DataPort};

pub struct CsvDataAdapter {
    base_path: PathBuf,
}

impl CsvDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, market: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, market))
    }

    fn data_error(symbol: &str, reason: String) -> DtiTraderError {
        DtiTraderError::Data {
            symbol: symbol.to_string(),
            reason,
        }
    }
}

impl DataPort for CsvDataAdapter {
    fn fetch_series(&self, symbol: &str, market: &str) -> Result<PriceSeries, DtiTraderError> {
        let path = self.csv_path(symbol, market);
        let content = fs::read_to_string(&path).map_err(|e| {
            Self::data_error(symbol, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut rows: Vec<(NaiveDate, f64, f64, f64, f64, i64)> = Vec::new();

        for result in rdr.records() {
            let record =
                result.map_err(|e| Self::data_error(symbol, format!("CSV parse error: {}", e)))?;

            let field = |i: usize, name: &str| -> Result<&str, DtiTraderError> {
                record
                    .get(i)
                    .ok_or_else(|| Self::data_error(symbol, format!("missing {} column", name)))
            };

            let date = NaiveDate::parse_from_str(field(0, "date")?, "%Y-%m-%d")
                .map_err(|e| Self::data_error(symbol, format!("invalid date: {}", e)))?;
            let open: f64 = field(1, "open")?
                .parse()
                .map_err(|e| Self::data_error(symbol, format!("invalid open: {}", e)))?;
            let high: f64 = field(2, "high")?
                .parse()
                .map_err(|e| Self::data_error(symbol, format!("invalid high: {}", e)))?;
            let low: f64 = field(3, "low")?
                .parse()
                .map_err(|e| Self::data_error(symbol, format!("invalid low: {}", e)))?;
            let close: f64 = field(4, "close")?
                .parse()
                .map_err(|e| Self::data_error(symbol, format!("invalid close: {}", e)))?;
            let volume: i64 = field(5, "volume")?
                .parse()
                .map_err(|e| Self::data_error(symbol, format!("invalid volume: {}", e)))?;

            rows.push((date, open, high, low, close, volume));
        }

        rows.sort_by_key(|r| r.0);

        let mut dates = Vec::with_capacity(rows.len());
        let mut open = Vec::with_capacity(rows.len());
        let mut high = Vec::with_capacity(rows.len());
        let mut low = Vec::with_capacity(rows.len());
        let mut close = Vec::with_capacity(rows.len());
        let mut volume = Vec::with_capacity(rows.len());
        for (d, o, h, l, c, v) in rows {
            dates.push(d);
            open.push(o);
            high.push(h);
            low.push(l);
            close.push(c);
            volume.push(v);
        }

        PriceSeries::new(
            symbol.to_string(),
            market.to_string(),
            dates,
            open,
            high,
            low,
            close,
            volume,
        )
    }

    fn catalog(&self) -> Result<Vec<CatalogEntry>, DtiTraderError> {
        let entries = fs::read_dir(&self.base_path)?;
        let mut catalog = Vec::new();

        for entry in entries {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            let Some(stem) = name.strip_suffix(".csv") else {
                continue;
            };
            // SYMBOL_MARKET; symbols may themselves contain underscores.
            let Some((symbol, market)) = stem.rsplit_once('_') else {
                continue;
            };
            if symbol.is_empty() || market.is_empty() {
                continue;
            }
            catalog.push(CatalogEntry {
                symbol: symbol.to_string(),
                market: market.to_string(),
            });
        }

        catalog.sort_by(|a, b| (&a.market, &a.symbol).cmp(&(&b.market, &b.symbol)));
        Ok(catalog)
    }

    fn list_symbols(&self, market: &str) -> Result<Vec<String>, DtiTraderError> {
        let catalog = self.catalog()?;
        Ok(catalog
            .into_iter()
            .filter(|e| e.market == market)
            .map(|e| e.symbol)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n";

        fs::write(path.join("TCS_India.csv"), csv_content).unwrap();
        fs::write(
            path.join("VOD_UK.csv"),
            "date,open,high,low,close,volume\n2024-01-15,70.0,71.0,69.0,70.5,90000\n",
        )
        .unwrap();
        fs::write(path.join("notes.txt"), "not a csv").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_series_sorts_rows_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let series = adapter.fetch_series("TCS", "India").unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(
            series.dates[0],
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!((series.open[0] - 100.0).abs() < f64::EPSILON);
        assert!((series.high[2] - 120.0).abs() < f64::EPSILON);
        assert!((series.low[0] - 90.0).abs() < f64::EPSILON);
        assert!((series.close[1] - 110.0).abs() < f64::EPSILON);
        assert_eq!(series.volume[1], 60000);
        assert_eq!(series.market, "India");
    }

    #[test]
    fn fetch_series_missing_file_is_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);
        assert!(adapter.fetch_series("XYZ", "India").is_err());
    }

    #[test]
    fn fetch_series_bad_row_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BAD_UK.csv"),
            "date,open,high,low,close,volume\n2024-01-15,abc,1,1,1,1\n",
        )
        .unwrap();
        let adapter = CsvDataAdapter::new(dir.path().to_path_buf());
        assert!(adapter.fetch_series("BAD", "UK").is_err());
    }

    #[test]
    fn catalog_lists_market_symbol_pairs() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let catalog = adapter.catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].symbol, "TCS");
        assert_eq!(catalog[0].market, "India");
        assert_eq!(catalog[1].symbol, "VOD");
        assert_eq!(catalog[1].market, "UK");
    }

    #[test]
    fn list_symbols_filters_by_market() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        assert_eq!(adapter.list_symbols("India").unwrap(), vec!["TCS"]);
        assert_eq!(adapter.list_symbols("UK").unwrap(), vec!["VOD"]);
        assert!(adapter.list_symbols("US").unwrap().is_empty());
    }
}
