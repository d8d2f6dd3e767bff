//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_data_adapter::CsvDataAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config::{load_scan_config, load_simulator_config, ScanConfig};
use crate::domain::conviction::{filter_opportunities, Opportunities};
use crate::domain::error::DtiTraderError;
use crate::domain::metrics::PerformanceSummary;
use crate::domain::montecarlo::{estimate_risk, McParams, PositionSnapshot, SeededRandom};
use crate::domain::scan::{scan_universe, ScanOutcome};
use crate::domain::signal::Signal;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{ReportPort, SimulationReport};

#[derive(Parser, Debug)]
#[command(name = "dtitrader", about = "DTI momentum scanner and portfolio simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan the symbol catalog and print current opportunities
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Reference date for the recency window (default: today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Run the full backtest/portfolio simulation
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory for trades.csv, valuations.csv and summary.json
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Simulation end date (default: today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Monte Carlo risk estimate from a portfolio snapshot CSV
    Risk {
        /// CSV with value,volatility rows
        #[arg(short, long)]
        positions: PathBuf,
        #[arg(long, default_value_t = 1000)]
        iterations: usize,
        #[arg(long, default_value_t = 30)]
        days: usize,
        /// Fixed RNG seed for reproducible estimates
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List available symbols for a market
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        market: String,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Scan { config, today } => cmd_scan(&config, today),
        Command::Simulate {
            config,
            output,
            today,
        } => cmd_simulate(&config, output.as_deref(), today),
        Command::Risk {
            positions,
            iterations,
            days,
            seed,
        } => cmd_risk(&positions, iterations, days, seed),
        Command::ListSymbols { config, market } => cmd_list_symbols(&config, &market),
        Command::Validate { config } => cmd_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(&err)
        }
    }
}

fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| chrono::Local::now().date_naive())
}

fn run_scan(scan: &ScanConfig) -> Result<ScanOutcome, DtiTraderError> {
    let data = CsvDataAdapter::new(scan.data_path.clone());
    let catalog = data.catalog()?;
    Ok(scan_universe(&data, &catalog, &scan.dti, &scan.rules))
}

fn cmd_scan(config_path: &Path, today: Option<NaiveDate>) -> Result<(), DtiTraderError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let scan = load_scan_config(&config)?;
    let today = today_or(today);

    let outcome = run_scan(&scan)?;
    let opportunities = filter_opportunities(&outcome.signals, today, &scan.conviction);

    match &opportunities {
        Opportunities::Ranked(list) => {
            println!("{} high-conviction opportunities (as of {}):", list.len(), today);
            print_opportunities(list);
        }
        Opportunities::Unranked(list) => {
            println!(
                "no completed trade history; {} raw opportunities (as of {}):",
                list.len(),
                today
            );
            print_opportunities(list);
        }
    }

    if !outcome.skipped.is_empty() {
        println!("\nexcluded symbols:");
        for skip in &outcome.skipped {
            println!("  {} ({}): {}", skip.symbol, skip.market, skip.error);
        }
    }

    Ok(())
}

fn print_opportunities(signals: &[Signal]) {
    for signal in signals {
        println!(
            "  {:<12} {:<6} entry {} @ {:.2}  win rate {:.0}%",
            signal.symbol,
            signal.market,
            signal.entry_date,
            signal.entry_price,
            signal.historical_win_rate * 100.0
        );
    }
}

fn cmd_simulate(
    config_path: &Path,
    output: Option<&Path>,
    today: Option<NaiveDate>,
) -> Result<(), DtiTraderError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let scan = load_scan_config(&config)?;
    let today = today_or(today);
    let simulator_config = load_simulator_config(&config, today)?;

    let outcome = run_scan(&scan)?;
    let result = crate::domain::simulator::run(&simulator_config, &outcome.signals)?;
    let summary = PerformanceSummary::compute(&result.valuations, &result.trades);

    print_summary(&summary, &simulator_config.display_currency, &result);

    if let Some(dir) = output {
        let report = SimulationReport {
            trades: &result.trades,
            valuations: &result.valuations,
            summary: &summary,
            skipped: &result.skipped,
        };
        CsvReportAdapter::new().write(&report, dir)?;
        println!("\nreports written to {}", dir.display());
    }

    Ok(())
}

fn print_summary(
    summary: &PerformanceSummary,
    display_currency: &str,
    result: &crate::domain::simulator::SimulationResult,
) {
    println!("simulated {} trading days, {} closed trades, {} still open",
        result.valuations.len(),
        result.trades.len(),
        result.open_positions.len(),
    );
    if let Some(last) = result.valuations.last() {
        println!("final value: {:.2} {}", last.value, display_currency);
    }

    println!("\nperformance:");
    println!("  total return:     {:>8.2}%", summary.total_return_pct);
    println!("  annualized:       {:>8.2}%", summary.annualized_return_pct);
    println!("  volatility:       {:>8.2}%", summary.volatility_pct);
    println!("  sharpe:           {:>8.2}", summary.sharpe_ratio);
    println!("  sortino:          {:>8.2}", summary.sortino_ratio);
    println!("  calmar:           {:>8.2}", summary.calmar_ratio);
    println!("  max drawdown:     {:>8.2}%", summary.max_drawdown_pct);

    println!("\ntrades:");
    println!("  count:            {:>8}", summary.trade_count);
    println!("  win rate:         {:>8.1}%", summary.win_rate * 100.0);
    println!("  avg win:          {:>8.2}%", summary.avg_win_pct);
    println!("  avg loss:         {:>8.2}%", summary.avg_loss_pct);
    println!("  profit factor:    {:>8.2}", summary.profit_factor);
    println!("  expectancy:       {:>8.2}%", summary.expectancy_pct);

    if !summary.market_breakdown.is_empty() {
        println!("\nby market:");
        for (market, stats) in &summary.market_breakdown {
            println!(
                "  {:<8} {:>3} trades  win rate {:>5.1}%  avg P/L {:>6.2}%",
                market,
                stats.trades,
                stats.win_rate * 100.0,
                stats.avg_pl_percent
            );
        }
    }

    let reasons = &summary.exit_reasons;
    println!(
        "\nexits: {} take-profit, {} stop-loss, {} max-days, {} other",
        reasons.take_profit, reasons.stop_loss, reasons.max_days, reasons.other
    );

    if !result.skipped.is_empty() {
        println!("\n{} signals skipped by admission control", result.skipped.len());
    }
}

fn cmd_risk(
    positions_path: &Path,
    iterations: usize,
    days: usize,
    seed: Option<u64>,
) -> Result<(), DtiTraderError> {
    let portfolio = read_positions(positions_path)?;
    let params = McParams { iterations, days };
    let mut source = match seed {
        Some(seed) => SeededRandom::new(seed),
        None => SeededRandom::from_entropy(),
    };

    let estimate = estimate_risk(&portfolio, &params, &mut source)?;

    println!(
        "{}-day outlook over {} iterations ({} positions):",
        days,
        iterations,
        portfolio.len()
    );
    println!("  initial value:       {:>12.2}", estimate.initial_value);
    println!("  expected value:      {:>12.2}", estimate.expected_value);
    println!("  VaR 95:              {:>12.2}", estimate.var_95);
    println!("  VaR 99:              {:>12.2}", estimate.var_99);
    println!("  expected shortfall:  {:>12.2}", estimate.expected_shortfall);
    println!("  expected max DD:     {:>11.2}%", estimate.expected_max_drawdown_pct);
    println!("  worst-case DD:       {:>11.2}%", estimate.worst_case_drawdown_pct);
    println!("  P(loss):             {:>11.1}%", estimate.probability_of_loss * 100.0);
    println!("  return ratio:        {:>12.3}", estimate.return_ratio);

    Ok(())
}

/// Read `value,volatility` snapshot rows (header required).
fn read_positions(path: &Path) -> Result<Vec<PositionSnapshot>, DtiTraderError> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| DtiTraderError::Data {
        symbol: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut positions = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| DtiTraderError::Data {
            symbol: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let parse = |i: usize, name: &str| -> Result<f64, DtiTraderError> {
            record
                .get(i)
                .ok_or_else(|| DtiTraderError::Data {
                    symbol: path.display().to_string(),
                    reason: format!("missing {} column", name),
                })?
                .trim()
                .parse()
                .map_err(|_| DtiTraderError::Data {
                    symbol: path.display().to_string(),
                    reason: format!("invalid {} value", name),
                })
        };

        positions.push(PositionSnapshot {
            value: parse(0, "value")?,
            volatility: parse(1, "volatility")?,
        });
    }

    Ok(positions)
}

fn cmd_list_symbols(config_path: &Path, market: &str) -> Result<(), DtiTraderError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let scan = load_scan_config(&config)?;
    let data = CsvDataAdapter::new(scan.data_path);

    for symbol in data.list_symbols(market)? {
        println!("{}", symbol);
    }
    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<(), DtiTraderError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    load_scan_config(&config)?;
    let today = chrono::Local::now().date_naive();
    load_simulator_config(&config, today)?;
    println!("{} is valid", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn read_positions_parses_snapshot_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "value,volatility").unwrap();
        writeln!(file, "50000,20.5").unwrap();
        writeln!(file, "30000, 35").unwrap();

        let positions = read_positions(file.path()).unwrap();
        assert_eq!(positions.len(), 2);
        assert!((positions[0].value - 50_000.0).abs() < f64::EPSILON);
        assert!((positions[1].volatility - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn read_positions_rejects_bad_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "value,volatility").unwrap();
        writeln!(file, "fifty,20").unwrap();

        assert!(read_positions(file.path()).is_err());
    }

    #[test]
    fn today_or_prefers_explicit_date() {
        let explicit = NaiveDate::from_ymd_opt(2024, 7, 5).unwrap();
        assert_eq!(today_or(Some(explicit)), explicit);
    }

    #[test]
    fn cli_parses_simulate_command() {
        let cli = Cli::parse_from([
            "dtitrader",
            "simulate",
            "--config",
            "dtitrader.ini",
            "--output",
            "out",
            "--today",
            "2024-07-05",
        ]);
        match cli.command {
            Command::Simulate { config, output, today } => {
                assert_eq!(config, PathBuf::from("dtitrader.ini"));
                assert_eq!(output, Some(PathBuf::from("out")));
                assert_eq!(today, NaiveDate::from_ymd_opt(2024, 7, 5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn cli_risk_defaults() {
        let cli = Cli::parse_from(["dtitrader", "risk", "--positions", "snapshot.csv"]);
        match cli.command {
            Command::Risk {
                iterations, days, seed, ..
            } => {
                assert_eq!(iterations, 1000);
                assert_eq!(days, 30);
                assert_eq!(seed, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
