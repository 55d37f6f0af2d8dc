//! Backtest performance metrics and statistics.
//!
//! Every function here has a defined fallback for empty or degenerate input
//! (usually 0) and never panics. Percent-valued outputs are scaled by 100.

use chrono::NaiveDate;

use super::stats;
use super::trade::{equity_values, EquityCurvePoint, Trade};

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;
const DAYS_PER_YEAR: f64 = 365.0;

/// Largest peak-to-trough decline, in percent of the peak. Empty input → 0.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &value in &equity_curve[1..] {
        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            let dd = (peak - value) / peak;
            max_dd = max_dd.max(dd);
        }
    }

    max_dd * 100.0
}

/// Running drawdown percentage at every point of the curve.
pub fn drawdown_series(equity_curve: &[f64]) -> Vec<f64> {
    let Some(&first) = equity_curve.first() else {
        return Vec::new();
    };

    let mut peak = first;
    equity_curve
        .iter()
        .map(|&value| {
            if value > peak {
                peak = value;
            }
            if peak > 0.0 {
                (peak - value) / peak * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

/// (mean - risk_free_rate) / population std dev. Zero variance or no data → 0.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let Some(&first) = returns.first() else {
        return 0.0;
    };
    // a flat series can still leave rounding residue in the std dev
    if returns.iter().all(|&r| r == first) {
        return 0.0;
    }

    let avg = stats::mean(returns);
    let std_dev = stats::population_std_dev(returns, avg);

    if std_dev == 0.0 {
        return 0.0;
    }

    (avg - risk_free_rate) / std_dev
}

/// Share of trades with a strictly positive profit, in percent.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let wins = trades.iter().filter(|t| t.is_win()).count();
    wins as f64 / trades.len() as f64 * 100.0
}

/// Gross profit over gross loss.
///
/// Without losses the factor is `+∞` when there is any profit and 0 otherwise.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    let (total_profit, total_loss) = gross_profit_and_loss(trades);

    if total_loss == 0.0 {
        return if total_profit > 0.0 { f64::INFINITY } else { 0.0 };
    }

    total_profit / total_loss
}

/// Compound annual growth rate (as a fraction) for a total return given in
/// percent over `start..end`. Same-day or inverted ranges → 0.
pub fn annual_return(total_return_pct: f64, start: NaiveDate, end: NaiveDate) -> f64 {
    let years = (end - start).num_days() as f64 / DAYS_PER_YEAR;

    if years <= 0.0 {
        return 0.0;
    }

    (1.0 + total_return_pct / 100.0).powf(1.0 / years) - 1.0
}

fn gross_profit_and_loss(trades: &[Trade]) -> (f64, f64) {
    let profit: f64 = trades
        .iter()
        .filter(|t| t.is_win())
        .map(Trade::profit_or_zero)
        .sum();
    let loss: f64 = trades
        .iter()
        .filter(|t| t.is_loss())
        .map(Trade::profit_or_zero)
        .sum();
    (profit, loss.abs())
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerformanceSummary {
    /// Percent, first to last equity point.
    pub total_return: f64,
    /// Fraction, see [`annual_return`].
    pub annualized_return: f64,
    /// Population std dev of per-period equity returns (fraction).
    pub volatility: f64,
    pub sharpe_ratio: f64,
    /// Percent.
    pub max_drawdown: f64,
    /// Percent.
    pub win_rate: f64,
    pub profit_factor: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Mean of the positive profits; 0 without winners.
    pub avg_profit_per_trade: f64,
    /// Mean of the negative profits (a negative number); 0 without losers.
    pub avg_loss_per_trade: f64,
}

impl PerformanceSummary {
    pub fn compute(
        trades: &[Trade],
        equity_curve: &[EquityCurvePoint],
        risk_free_rate: f64,
    ) -> Self {
        let values = equity_values(equity_curve);

        let total_return = match (equity_curve.first(), equity_curve.last()) {
            (Some(first), Some(last)) if first.value > 0.0 => {
                (last.value - first.value) / first.value * 100.0
            }
            _ => 0.0,
        };

        let annualized_return = match (equity_curve.first(), equity_curve.last()) {
            (Some(first), Some(last)) => annual_return(total_return, first.date, last.date),
            _ => 0.0,
        };

        let returns = stats::period_returns(&values);
        let volatility = stats::population_std_dev(&returns, stats::mean(&returns));

        let winners: Vec<f64> = trades
            .iter()
            .filter(|t| t.is_win())
            .map(Trade::profit_or_zero)
            .collect();
        let losers: Vec<f64> = trades
            .iter()
            .filter(|t| t.is_loss())
            .map(Trade::profit_or_zero)
            .collect();

        PerformanceSummary {
            total_return,
            annualized_return,
            volatility,
            sharpe_ratio: sharpe_ratio(&returns, risk_free_rate),
            max_drawdown: max_drawdown(&values),
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            total_trades: trades.len(),
            winning_trades: winners.len(),
            losing_trades: losers.len(),
            avg_profit_per_trade: stats::mean(&winners),
            avg_loss_per_trade: stats::mean(&losers),
        }
    }
}

/// Orchestrate every metric into one summary.
pub fn summarize(
    trades: &[Trade],
    equity_curve: &[EquityCurvePoint],
    risk_free_rate: f64,
) -> PerformanceSummary {
    PerformanceSummary::compute(trades, equity_curve, risk_free_rate)
}

/// Aggregate view over several backtest runs.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktestOverview {
    pub total_backtests: usize,
    pub avg_return: f64,
    pub best_return: f64,
    pub worst_return: f64,
    pub avg_sharpe: f64,
    /// Percent of runs with a positive total return.
    pub success_rate: f64,
}

impl BacktestOverview {
    pub fn compute(summaries: &[PerformanceSummary]) -> Self {
        if summaries.is_empty() {
            return Self::default();
        }

        let returns: Vec<f64> = summaries.iter().map(|s| s.total_return).collect();
        let sharpes: Vec<f64> = summaries.iter().map(|s| s.sharpe_ratio).collect();
        let positive = returns.iter().filter(|&&r| r > 0.0).count();

        BacktestOverview {
            total_backtests: summaries.len(),
            avg_return: stats::mean(&returns),
            best_return: returns.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            worst_return: returns.iter().copied().fold(f64::INFINITY, f64::min),
            avg_sharpe: stats::mean(&sharpes),
            success_rate: positive as f64 / summaries.len() as f64 * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::TradeType;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_trade(profit: Option<f64>) -> Trade {
        Trade {
            trade_type: TradeType::Sell,
            date: date(2024, 1, 10),
            price: 100.0,
            shares: 10.0,
            value: 1000.0,
            profit,
            reason: None,
            symbol: Some("AAPL".into()),
        }
    }

    fn make_curve(values: &[f64]) -> Vec<EquityCurvePoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| EquityCurvePoint {
                date: date(2024, 1, 1) + chrono::Duration::days(i as i64),
                value,
            })
            .collect()
    }

    #[test]
    fn max_drawdown_peak_to_trough() {
        assert_relative_eq!(max_drawdown(&[100.0, 120.0, 90.0, 110.0]), 25.0);
    }

    #[test]
    fn max_drawdown_empty_and_rising() {
        assert_eq!(max_drawdown(&[]), 0.0);
        assert_eq!(max_drawdown(&[100.0, 110.0, 120.0]), 0.0);
    }

    #[test]
    fn max_drawdown_multiple_troughs() {
        let dd = max_drawdown(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]);
        assert_relative_eq!(dd, (110.0 - 80.0) / 110.0 * 100.0);
    }

    #[test]
    fn drawdown_series_tracks_peak() {
        let series = drawdown_series(&[100.0, 120.0, 90.0, 110.0]);
        assert_eq!(series.len(), 4);
        assert_eq!(series[0], 0.0);
        assert_eq!(series[1], 0.0);
        assert_relative_eq!(series[2], 25.0);
        assert_relative_eq!(series[3], 10.0 / 120.0 * 100.0);
    }

    #[test]
    fn drawdown_series_empty() {
        assert!(drawdown_series(&[]).is_empty());
    }

    #[test]
    fn max_drawdown_equals_series_max() {
        let curve = [100.0, 97.0, 130.0, 101.0, 99.5, 140.0, 70.0];
        let series_max = drawdown_series(&curve)
            .into_iter()
            .fold(0.0_f64, f64::max);
        assert_eq!(max_drawdown(&curve), series_max);
    }

    #[test]
    fn sharpe_zero_variance_is_zero() {
        assert_eq!(sharpe_ratio(&[5.0, 5.0, 5.0, 5.0], DEFAULT_RISK_FREE_RATE), 0.0);
    }

    #[test]
    fn sharpe_flat_inexact_values_is_zero() {
        assert_eq!(sharpe_ratio(&[0.1, 0.1, 0.1], DEFAULT_RISK_FREE_RATE), 0.0);
        assert_eq!(sharpe_ratio(&[0.1; 7], DEFAULT_RISK_FREE_RATE), 0.0);
        assert_eq!(sharpe_ratio(&[-4.096900267850772; 6], DEFAULT_RISK_FREE_RATE), 0.0);
    }

    #[test]
    fn sharpe_empty_is_zero() {
        assert_eq!(sharpe_ratio(&[], DEFAULT_RISK_FREE_RATE), 0.0);
    }

    #[test]
    fn sharpe_known_value() {
        // mean 0.05, population std 0.05
        let sharpe = sharpe_ratio(&[0.0, 0.1], 0.02);
        assert_relative_eq!(sharpe, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn win_rate_counts_positive_profits() {
        let trades = vec![
            make_trade(Some(10.0)),
            make_trade(Some(-5.0)),
            make_trade(Some(3.0)),
        ];
        assert_relative_eq!(win_rate(&trades), 200.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn win_rate_missing_profit_is_not_a_win() {
        let trades = vec![make_trade(None), make_trade(Some(0.0)), make_trade(Some(1.0))];
        assert_relative_eq!(win_rate(&trades), 100.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn win_rate_empty() {
        assert_eq!(win_rate(&[]), 0.0);
    }

    #[test]
    fn profit_factor_ratio() {
        let trades = vec![
            make_trade(Some(100.0)),
            make_trade(Some(-50.0)),
            make_trade(Some(200.0)),
        ];
        assert_relative_eq!(profit_factor(&trades), 6.0);
    }

    #[test]
    fn profit_factor_edge_cases() {
        assert_eq!(profit_factor(&[]), 0.0);
        assert_eq!(profit_factor(&[make_trade(Some(10.0))]), f64::INFINITY);
        assert_eq!(profit_factor(&[make_trade(None), make_trade(Some(0.0))]), 0.0);
    }

    #[test]
    fn profit_factor_only_losses() {
        assert_eq!(profit_factor(&[make_trade(Some(-10.0))]), 0.0);
    }

    #[test]
    fn annual_return_one_year() {
        let r = annual_return(10.0, date(2023, 1, 1), date(2024, 1, 1));
        assert_relative_eq!(r, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn annual_return_two_years_compounds() {
        let r = annual_return(21.0, date(2022, 1, 1), date(2023, 12, 31));
        // 729 days is just under two 365-day years
        let years = 729.0 / 365.0;
        assert_relative_eq!(r, 1.21_f64.powf(1.0 / years) - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn annual_return_degenerate_ranges() {
        assert_eq!(annual_return(10.0, date(2024, 1, 1), date(2024, 1, 1)), 0.0);
        assert_eq!(annual_return(10.0, date(2024, 1, 2), date(2024, 1, 1)), 0.0);
    }

    #[test]
    fn summary_counts_and_averages() {
        let trades = vec![
            make_trade(Some(100.0)),
            make_trade(Some(-60.0)),
            make_trade(Some(200.0)),
            make_trade(Some(-40.0)),
            make_trade(None),
        ];
        let curve = make_curve(&[1000.0, 1100.0, 1050.0, 1200.0]);
        let s = summarize(&trades, &curve, DEFAULT_RISK_FREE_RATE);

        assert_eq!(s.total_trades, 5);
        assert_eq!(s.winning_trades, 2);
        assert_eq!(s.losing_trades, 2);
        assert_relative_eq!(s.avg_profit_per_trade, 150.0);
        assert_relative_eq!(s.avg_loss_per_trade, -50.0);
        assert_relative_eq!(s.win_rate, 40.0);
        assert_relative_eq!(s.profit_factor, 3.0);
        assert_relative_eq!(s.total_return, 20.0, epsilon = 1e-12);
        assert_relative_eq!(s.max_drawdown, 50.0 / 1100.0 * 100.0);
    }

    #[test]
    fn summary_volatility_and_sharpe_use_period_returns() {
        let curve = make_curve(&[100.0, 110.0, 99.0]);
        let s = summarize(&[], &curve, 0.0);

        // returns are +10% and -10% around a zero mean
        assert_relative_eq!(s.volatility, 0.1, epsilon = 1e-12);
        assert_relative_eq!(s.sharpe_ratio, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn summary_annualized_uses_curve_dates() {
        let curve = vec![
            EquityCurvePoint {
                date: date(2023, 1, 1),
                value: 100.0,
            },
            EquityCurvePoint {
                date: date(2024, 1, 1),
                value: 110.0,
            },
        ];
        let s = summarize(&[], &curve, DEFAULT_RISK_FREE_RATE);
        assert_relative_eq!(s.annualized_return, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn summary_empty_inputs() {
        let s = summarize(&[], &[], DEFAULT_RISK_FREE_RATE);
        assert_eq!(s.total_return, 0.0);
        assert_eq!(s.annualized_return, 0.0);
        assert_eq!(s.volatility, 0.0);
        assert_eq!(s.sharpe_ratio, 0.0);
        assert_eq!(s.max_drawdown, 0.0);
        assert_eq!(s.win_rate, 0.0);
        assert_eq!(s.profit_factor, 0.0);
        assert_eq!(s.total_trades, 0);
        assert_eq!(s.avg_profit_per_trade, 0.0);
        assert_eq!(s.avg_loss_per_trade, 0.0);
    }

    #[test]
    fn overview_empty() {
        assert_eq!(BacktestOverview::compute(&[]), BacktestOverview::default());
    }

    #[test]
    fn overview_aggregates_runs() {
        let base = summarize(&[], &[], DEFAULT_RISK_FREE_RATE);
        let runs = vec![
            PerformanceSummary {
                total_return: 10.0,
                sharpe_ratio: 1.0,
                ..base.clone()
            },
            PerformanceSummary {
                total_return: -5.0,
                sharpe_ratio: -0.5,
                ..base.clone()
            },
            PerformanceSummary {
                total_return: 25.0,
                sharpe_ratio: 2.0,
                ..base
            },
        ];

        let o = BacktestOverview::compute(&runs);
        assert_eq!(o.total_backtests, 3);
        assert_relative_eq!(o.avg_return, 10.0);
        assert_eq!(o.best_return, 25.0);
        assert_eq!(o.worst_return, -5.0);
        assert_relative_eq!(o.avg_sharpe, 2.5 / 3.0);
        assert_relative_eq!(o.success_rate, 200.0 / 3.0, epsilon = 1e-9);
    }
}
