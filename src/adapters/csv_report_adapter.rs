//! CSV/JSON report adapter.
//!
//! Writes the closed-trade ledger and valuation series as CSV and the
//! performance summary (plus skip-log) as JSON into an output directory.

use std::fs;
use std::path::Path;

use crate::domain::error::DtiTraderError;
use crate::ports::report_port::{ReportPort, SimulationReport};

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    fn write_trades(
        &self,
        report: &SimulationReport<'_>,
        dir: &Path,
    ) -> Result<(), DtiTraderError> {
        let mut writer = csv::Writer::from_path(dir.join("trades.csv"))
            .map_err(|e| Self::report_error("trades.csv", e))?;

        writer
            .write_record([
                "symbol",
                "market",
                "entry_date",
                "entry_price",
                "trade_size",
                "currency",
                "exit_date",
                "exit_price",
                "pl_percent",
                "exit_reason",
                "holding_days",
            ])
            .map_err(|e| Self::report_error("trades.csv", e))?;

        for trade in report.trades {
            writer
                .write_record([
                    trade.symbol.clone(),
                    trade.market.clone(),
                    trade.entry_date.to_string(),
                    trade.entry_price.to_string(),
                    trade.trade_size.to_string(),
                    trade.currency.clone(),
                    trade.exit_date.to_string(),
                    trade.exit_price.to_string(),
                    format!("{:.4}", trade.pl_percent),
                    trade.exit_reason.clone(),
                    trade.holding_days.to_string(),
                ])
                .map_err(|e| Self::report_error("trades.csv", e))?;
        }

        writer.flush()?;
        Ok(())
    }

    fn write_valuations(
        &self,
        report: &SimulationReport<'_>,
        dir: &Path,
    ) -> Result<(), DtiTraderError> {
        let mut writer = csv::Writer::from_path(dir.join("valuations.csv"))
            .map_err(|e| Self::report_error("valuations.csv", e))?;

        writer
            .write_record(["date", "value", "active_positions"])
            .map_err(|e| Self::report_error("valuations.csv", e))?;

        for valuation in report.valuations {
            writer
                .write_record([
                    valuation.date.to_string(),
                    format!("{:.2}", valuation.value),
                    valuation.active_position_count.to_string(),
                ])
                .map_err(|e| Self::report_error("valuations.csv", e))?;
        }

        writer.flush()?;
        Ok(())
    }

    fn write_summary(
        &self,
        report: &SimulationReport<'_>,
        dir: &Path,
    ) -> Result<(), DtiTraderError> {
        let body = serde_json::json!({
            "summary": report.summary,
            "skipped_signals": report.skipped,
        });
        let text = serde_json::to_string_pretty(&body)
            .map_err(|e| Self::report_error("summary.json", e))?;
        fs::write(dir.join("summary.json"), text)?;
        Ok(())
    }

    fn report_error(file: &str, err: impl std::fmt::Display) -> DtiTraderError {
        DtiTraderError::Report {
            reason: format!("{}: {}", file, err),
        }
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &SimulationReport<'_>, output_dir: &Path) -> Result<(), DtiTraderError> {
        fs::create_dir_all(output_dir)?;
        self.write_trades(report, output_dir)?;
        self.write_valuations(report, output_dir)?;
        self.write_summary(report, output_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::PerformanceSummary;
    use crate::domain::position::{ClosedTrade, DailyValuation};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample_trade() -> ClosedTrade {
        ClosedTrade {
            symbol: "TCS".into(),
            market: "India".into(),
            entry_date: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
            entry_price: 100.0,
            trade_size: 50_000.0,
            currency: "INR".into(),
            win_rate_at_entry: 0.8,
            exit_date: NaiveDate::from_ymd_opt(2024, 7, 9).unwrap(),
            exit_price: 108.0,
            pl_percent: 8.0,
            exit_reason: "Take Profit".into(),
            holding_days: 7,
        }
    }

    fn sample_valuation() -> DailyValuation {
        DailyValuation {
            date: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
            value: 50_000.0,
            active_position_count: 1,
            positions_by_market: BTreeMap::from([("India".to_string(), 1)]),
        }
    }

    #[test]
    fn writes_all_three_artifacts() {
        let dir = TempDir::new().unwrap();
        let trades = vec![sample_trade()];
        let valuations = vec![sample_valuation()];
        let summary = PerformanceSummary::compute(&valuations, &trades);

        let report = SimulationReport {
            trades: &trades,
            valuations: &valuations,
            summary: &summary,
            skipped: &[],
        };

        CsvReportAdapter::new().write(&report, dir.path()).unwrap();

        let trades_csv = fs::read_to_string(dir.path().join("trades.csv")).unwrap();
        assert!(trades_csv.contains("TCS"));
        assert!(trades_csv.contains("Take Profit"));

        let valuations_csv = fs::read_to_string(dir.path().join("valuations.csv")).unwrap();
        assert!(valuations_csv.contains("2024-07-02"));
        assert!(valuations_csv.contains("50000.00"));

        let summary_json = fs::read_to_string(dir.path().join("summary.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&summary_json).unwrap();
        assert_eq!(parsed["summary"]["trade_count"], 1);
    }

    #[test]
    fn creates_missing_output_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("reports/run1");
        let summary = PerformanceSummary::compute(&[], &[]);

        let report = SimulationReport {
            trades: &[],
            valuations: &[],
            summary: &summary,
            skipped: &[],
        };

        CsvReportAdapter::new().write(&report, &nested).unwrap();
        assert!(nested.join("summary.json").exists());
    }
}
