//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) bars are undefined. n == 0 or n > len leaves every bar undefined.

use crate::domain::indicator::{series_from, trailing_close_mean, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::DailyBar;

pub fn moving_average(bars: &[DailyBar], period: usize) -> IndicatorSeries {
    let values = (0..bars.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                None
            } else {
                Some(trailing_close_mean(bars, i, period))
            }
        })
        .collect();

    series_from(bars, IndicatorType::Sma(period), values)
}
