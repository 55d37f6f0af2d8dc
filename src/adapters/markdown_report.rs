//! Markdown report adapter implementing ReportPort.
//!
//! Sections, in order: basic information, performance metrics, trade
//! statistics, risk analysis, trade log.

use std::fs;
use std::path::Path;

use crate::domain::error::StokError;
use crate::domain::metrics::PerformanceSummary;
use crate::domain::trade::Trade;
use crate::ports::report_port::{ReportPort, RunReport};

pub struct MarkdownReportAdapter;

impl MarkdownReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, report: &RunReport<'_>) -> String {
        let mut output = String::new();
        output.push_str(&format!("# Backtest Analysis: {}\n\n", report.run_id));
        output.push_str(&render_basic_info(report));
        output.push_str(&render_metrics(report.summary));
        output.push_str(&render_trade_stats(report.summary));
        output.push_str(&render_risk(report));
        output.push_str(&render_trade_log(report.trades));
        output
    }
}

impl Default for MarkdownReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for MarkdownReportAdapter {
    fn write(&self, report: &RunReport<'_>, output_path: &str) -> Result<(), StokError> {
        let content = self.render(report);

        if let Some(parent) = Path::new(output_path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StokError::Report {
                    reason: format!("failed to create {}: {}", parent.display(), e),
                })?;
            }
        }

        fs::write(output_path, content).map_err(|e| StokError::Report {
            reason: format!("failed to write {}: {}", output_path, e),
        })?;
        log::info!("wrote report to {}", output_path);
        Ok(())
    }
}

fn render_basic_info(report: &RunReport<'_>) -> String {
    let chart = report.chart;
    let mut out = String::from("## Basic Information\n\n");
    out.push_str("| Item | Value |\n|---|---|\n");

    match (chart.dates.first(), chart.dates.last()) {
        (Some(start), Some(end)) => {
            out.push_str(&format!("| Period | {} to {} |\n", start, end));
        }
        _ => out.push_str("| Period | n/a |\n"),
    }
    if let (Some(first), Some(last)) = (chart.equity.first(), chart.equity.last()) {
        out.push_str(&format!("| Starting equity | {:.2} |\n", first));
        out.push_str(&format!("| Final equity | {:.2} |\n", last));
    }
    out.push_str(&format!("| Data points | {} |\n\n", chart.equity.len()));
    out
}

fn render_metrics(summary: &PerformanceSummary) -> String {
    let mut out = String::from("## Performance Metrics\n\n");
    out.push_str("| Metric | Value |\n|---|---|\n");
    out.push_str(&format!("| Total return | {:.2}% |\n", summary.total_return));
    out.push_str(&format!(
        "| Annualized return | {:.2}% |\n",
        summary.annualized_return * 100.0
    ));
    out.push_str(&format!("| Sharpe ratio | {:.2} |\n", summary.sharpe_ratio));
    out.push_str(&format!("| Win rate | {:.2}% |\n", summary.win_rate));
    out.push_str(&format!(
        "| Profit factor | {} |\n\n",
        format_ratio(summary.profit_factor)
    ));
    out
}

fn render_trade_stats(summary: &PerformanceSummary) -> String {
    let mut out = String::from("## Trade Statistics\n\n");
    out.push_str("| Statistic | Value |\n|---|---|\n");
    out.push_str(&format!("| Total trades | {} |\n", summary.total_trades));
    out.push_str(&format!("| Winning trades | {} |\n", summary.winning_trades));
    out.push_str(&format!("| Losing trades | {} |\n", summary.losing_trades));
    out.push_str(&format!(
        "| Average profit | {:.2} |\n",
        summary.avg_profit_per_trade
    ));
    out.push_str(&format!(
        "| Average loss | {:.2} |\n\n",
        summary.avg_loss_per_trade
    ));
    out
}

fn render_risk(report: &RunReport<'_>) -> String {
    let summary = report.summary;
    let mut out = String::from("## Risk Analysis\n\n");
    out.push_str("| Measure | Value |\n|---|---|\n");
    out.push_str(&format!("| Max drawdown | {:.2}% |\n", summary.max_drawdown));
    out.push_str(&format!(
        "| Volatility (per period) | {:.4} |\n",
        summary.volatility
    ));
    if let Some(benchmark) = &report.chart.benchmark {
        if let (Some(first), Some(last)) = (benchmark.first(), benchmark.last()) {
            if *first > 0.0 {
                out.push_str(&format!(
                    "| Benchmark return | {:.2}% |\n",
                    (last - first) / first * 100.0
                ));
            }
        }
    }
    out.push('\n');
    out
}

fn render_trade_log(trades: &[Trade]) -> String {
    let mut out = String::from("## Trade Log\n\n");
    if trades.is_empty() {
        out.push_str("_No trades._\n");
        return out;
    }

    out.push_str("| Date | Type | Symbol | Price | Shares | Value | Profit | Reason |\n");
    out.push_str("|---|---|---|---:|---:|---:|---:|---|\n");
    for t in trades {
        out.push_str(&format!(
            "| {} | {} | {} | {:.2} | {} | {:.2} | {} | {} |\n",
            t.date,
            t.trade_type,
            t.symbol.as_deref().unwrap_or("-"),
            t.price,
            t.shares,
            t.value,
            t.profit.map(|p| format!("{:.2}", p)).unwrap_or_else(|| "-".into()),
            t.reason.as_deref().map(escape_cell).unwrap_or_else(|| "-".into()),
        ));
    }
    out
}

fn format_ratio(value: f64) -> String {
    if value.is_infinite() {
        "∞".to_string()
    } else {
        format!("{:.2}", value)
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
