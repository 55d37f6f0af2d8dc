//! Daily OHLCV bar representation and bar-level utilities.

use chrono::NaiveDate;

use super::stats;

/// One trading day for one instrument.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DailyBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl DailyBar {
    /// All prices and the volume are strictly positive.
    pub fn is_valid(&self) -> bool {
        self.open > 0.0 && self.high > 0.0 && self.low > 0.0 && self.close > 0.0 && self.volume > 0.0
    }
}

/// Keep only bars that pass [`DailyBar::is_valid`], preserving order.
pub fn filter_valid(bars: &[DailyBar]) -> Vec<DailyBar> {
    bars.iter().filter(|b| b.is_valid()).cloned().collect()
}

/// Bars whose date falls in `start..=end`.
pub fn filter_by_date_range(bars: &[DailyBar], start: NaiveDate, end: NaiveDate) -> Vec<DailyBar> {
    bars.iter()
        .filter(|b| b.date >= start && b.date <= end)
        .cloned()
        .collect()
}

/// The bar with the latest date. On equal dates the earlier bar wins.
pub fn latest_bar(bars: &[DailyBar]) -> Option<&DailyBar> {
    bars.iter()
        .fold(None, |latest: Option<&DailyBar>, bar| match latest {
            Some(l) if bar.date <= l.date => Some(l),
            _ => Some(bar),
        })
}

/// Percentage change from `previous` to `current`; 0 when `previous` is 0.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// Summary statistics over closing prices.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Population standard deviation of closes.
    pub volatility: f64,
}

impl PriceStats {
    pub fn compute(bars: &[DailyBar]) -> Self {
        if bars.is_empty() {
            return Self::default();
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let min = closes.iter().copied().fold(f64::INFINITY, f64::min);
        let max = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = stats::mean(&closes);
        let volatility = stats::population_std_dev(&closes, avg);

        PriceStats {
            min,
            max,
            avg,
            volatility,
        }
    }
}
