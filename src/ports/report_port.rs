//! Report generation port trait.

use crate::domain::chart::EquityChart;
use crate::domain::error::StokError;
use crate::domain::metrics::PerformanceSummary;
use crate::domain::trade::Trade;

/// What a report renders for one backtest run.
pub struct RunReport<'a> {
    pub run_id: &'a str,
    pub summary: &'a PerformanceSummary,
    pub trades: &'a [Trade],
    pub chart: &'a EquityChart,
}

/// Port for writing performance reports.
pub trait ReportPort {
    fn write(&self, report: &RunReport<'_>, output_path: &str) -> Result<(), StokError>;
}
