//! Data access port trait.

use crate::domain::error::StokError;
use crate::domain::ohlcv::DailyBar;
use crate::domain::trade::{EquityCurvePoint, Trade};
use chrono::NaiveDate;

pub trait DataPort {
    /// Bars for `symbol` within `[start_date, end_date]`, sorted by date.
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyBar>, StokError>;

    fn list_symbols(&self) -> Result<Vec<String>, StokError>;

    fn fetch_trades(&self, run_id: &str) -> Result<Vec<Trade>, StokError>;

    fn fetch_equity_curve(&self, run_id: &str) -> Result<Vec<EquityCurvePoint>, StokError>;
}
