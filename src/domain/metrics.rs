//! Performance and risk statistics over a simulation's valuation series
//! and closed-trade ledger. All read-only reductions.

use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

use super::position::{ClosedTrade, DailyValuation};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const RISK_FREE_RATE: f64 = 0.02;

/// Finite stand-in for "no downside observed" ratios (Sortino with no
/// negative returns, Calmar with zero drawdown, profit factor with zero
/// gross loss).
pub const RATIO_SENTINEL: f64 = 9999.0;

#[derive(Debug, Clone, Serialize)]
pub struct MarketStats {
    pub trades: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub avg_pl_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExitReasonStats {
    pub take_profit: usize,
    pub stop_loss: usize,
    pub max_days: usize,
    pub other: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    pub return_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub volatility_pct: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub max_drawdown_pct: f64,
    pub trade_count: usize,
    pub win_rate: f64,
    pub avg_win_pct: f64,
    pub avg_loss_pct: f64,
    pub profit_factor: f64,
    pub expectancy_pct: f64,
    pub monthly_returns: Vec<MonthlyReturn>,
    pub market_breakdown: BTreeMap<String, MarketStats>,
    pub exit_reasons: ExitReasonStats,
}

impl PerformanceSummary {
    pub fn compute(valuations: &[DailyValuation], trades: &[ClosedTrade]) -> Self {
        let returns = daily_returns(valuations);
        let total_return_pct = total_return(valuations);
        let annualized_return_pct = annualized_return(total_return_pct, valuations.len());
        let max_drawdown_pct = max_drawdown(valuations);
        let (sharpe_ratio, sortino_ratio) = risk_adjusted(&returns);
        let volatility_pct = std_dev(&returns) * TRADING_DAYS_PER_YEAR.sqrt() * 100.0;

        let calmar_ratio = if max_drawdown_pct == 0.0 {
            RATIO_SENTINEL
        } else {
            annualized_return_pct / max_drawdown_pct
        };

        let trade_stats = TradeStats::collect(trades);

        PerformanceSummary {
            total_return_pct,
            annualized_return_pct,
            volatility_pct,
            sharpe_ratio,
            sortino_ratio,
            calmar_ratio,
            max_drawdown_pct,
            trade_count: trades.len(),
            win_rate: trade_stats.win_rate,
            avg_win_pct: trade_stats.avg_win,
            avg_loss_pct: trade_stats.avg_loss,
            profit_factor: trade_stats.profit_factor,
            expectancy_pct: trade_stats.expectancy,
            monthly_returns: monthly_returns(valuations),
            market_breakdown: market_breakdown(trades),
            exit_reasons: exit_reason_breakdown(trades),
        }
    }
}

pub fn daily_returns(valuations: &[DailyValuation]) -> Vec<f64> {
    valuations
        .windows(2)
        .map(|w| {
            if w[0].value > 0.0 {
                (w[1].value - w[0].value) / w[0].value
            } else {
                0.0
            }
        })
        .collect()
}

pub fn total_return(valuations: &[DailyValuation]) -> f64 {
    match (valuations.first(), valuations.last()) {
        (Some(first), Some(last)) if first.value > 0.0 => {
            (last.value - first.value) / first.value * 100.0
        }
        _ => 0.0,
    }
}

fn annualized_return(total_return_pct: f64, trading_days: usize) -> f64 {
    if trading_days == 0 {
        return 0.0;
    }
    let years = trading_days as f64 / TRADING_DAYS_PER_YEAR;
    let base = 1.0 + total_return_pct / 100.0;
    if years > 0.0 && base > 0.0 {
        (base.powf(1.0 / years) - 1.0) * 100.0
    } else {
        0.0
    }
}

/// Largest peak-to-trough decline as a percentage of the running peak.
pub fn max_drawdown(valuations: &[DailyValuation]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0;

    for valuation in valuations {
        if valuation.value > peak {
            peak = valuation.value;
        } else if peak > 0.0 {
            let dd = (peak - valuation.value) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

fn risk_adjusted(returns: &[f64]) -> (f64, f64) {
    if returns.is_empty() {
        return (0.0, 0.0);
    }

    let daily_rf = RISK_FREE_RATE / TRADING_DAYS_PER_YEAR;
    let mean = mean(returns);
    let stddev = std_dev(returns);
    let excess = mean - daily_rf;

    let sharpe = if stddev > 0.0 {
        excess / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    // Downside deviation: RMS over the negative returns only.
    let negatives: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let sortino = if negatives.is_empty() {
        RATIO_SENTINEL
    } else {
        let rms =
            (negatives.iter().map(|r| r * r).sum::<f64>() / negatives.len() as f64).sqrt();
        if rms > 0.0 {
            excess / rms * TRADING_DAYS_PER_YEAR.sqrt()
        } else {
            0.0
        }
    };

    (sharpe, sortino)
}

struct TradeStats {
    win_rate: f64,
    avg_win: f64,
    avg_loss: f64,
    profit_factor: f64,
    expectancy: f64,
}

impl TradeStats {
    fn collect(trades: &[ClosedTrade]) -> Self {
        if trades.is_empty() {
            return TradeStats {
                win_rate: 0.0,
                avg_win: 0.0,
                avg_loss: 0.0,
                profit_factor: 0.0,
                expectancy: 0.0,
            };
        }

        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut gross_profit = 0.0;
        let mut gross_loss = 0.0;

        for trade in trades {
            if trade.pl_percent > 0.0 {
                wins += 1;
                gross_profit += trade.pl_percent;
            } else if trade.pl_percent < 0.0 {
                losses += 1;
                gross_loss += trade.pl_percent.abs();
            }
        }

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            RATIO_SENTINEL
        } else {
            0.0
        };

        TradeStats {
            win_rate: wins as f64 / trades.len() as f64,
            avg_win: if wins > 0 { gross_profit / wins as f64 } else { 0.0 },
            avg_loss: if losses > 0 { gross_loss / losses as f64 } else { 0.0 },
            profit_factor,
            expectancy: trades.iter().map(|t| t.pl_percent).sum::<f64>() / trades.len() as f64,
        }
    }
}

/// Return compounded within each calendar month, first to last valuation
/// of that month.
pub fn monthly_returns(valuations: &[DailyValuation]) -> Vec<MonthlyReturn> {
    let mut months: Vec<MonthlyReturn> = Vec::new();
    let mut current: Option<(i32, u32, f64, f64)> = None; // (year, month, first, last)

    for valuation in valuations {
        let key = (valuation.date.year(), valuation.date.month());
        match &mut current {
            Some((year, month, _, last)) if (*year, *month) == key => {
                *last = valuation.value;
            }
            _ => {
                if let Some((year, month, first, last)) = current.take() {
                    months.push(month_return(year, month, first, last));
                }
                current = Some((key.0, key.1, valuation.value, valuation.value));
            }
        }
    }
    if let Some((year, month, first, last)) = current {
        months.push(month_return(year, month, first, last));
    }

    months
}

fn month_return(year: i32, month: u32, first: f64, last: f64) -> MonthlyReturn {
    let return_pct = if first > 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    };
    MonthlyReturn {
        year,
        month,
        return_pct,
    }
}

pub fn market_breakdown(trades: &[ClosedTrade]) -> BTreeMap<String, MarketStats> {
    let mut grouped: BTreeMap<String, Vec<&ClosedTrade>> = BTreeMap::new();
    for trade in trades {
        grouped.entry(trade.market.clone()).or_default().push(trade);
    }

    grouped
        .into_iter()
        .map(|(market, trades)| {
            let wins = trades.iter().filter(|t| t.pl_percent > 0.0).count();
            let avg = trades.iter().map(|t| t.pl_percent).sum::<f64>() / trades.len() as f64;
            let stats = MarketStats {
                trades: trades.len(),
                wins,
                win_rate: wins as f64 / trades.len() as f64,
                avg_pl_percent: avg,
            };
            (market, stats)
        })
        .collect()
}

/// Classify by substring on the stored reason text, so enriched reasons
/// like "Take Profit (8.2%)" still land in the right bucket.
pub fn exit_reason_breakdown(trades: &[ClosedTrade]) -> ExitReasonStats {
    let mut stats = ExitReasonStats::default();
    for trade in trades {
        if trade.exit_reason.contains("Take Profit") {
            stats.take_profit += 1;
        } else if trade.exit_reason.contains("Stop Loss") {
            stats.stop_loss += 1;
        } else if trade.exit_reason.contains("Max Days") {
            stats.max_days += 1;
        } else {
            stats.other += 1;
        }
    }
    stats
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
