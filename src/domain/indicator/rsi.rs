//! RSI (Relative Strength Index) indicator.
//!
//! Simple rolling RSI: at every bar i >= n the average gain and average loss
//! are plain means of the n price changes ending at bar i, recomputed from
//! scratch. No Wilder smoothing.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are undefined.

use crate::domain::indicator::{series_from, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::DailyBar;

pub const DEFAULT_RSI_PERIOD: usize = 14;

pub fn rsi(bars: &[DailyBar], period: usize) -> IndicatorSeries {
    let mut values = vec![None; bars.len()];

    if period == 0 || bars.len() < 2 {
        return series_from(bars, IndicatorType::Rsi(period), values);
    }

    let mut gains: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(bars.len() - 1);

    for w in bars.windows(2) {
        let change = w[1].close - w[0].close;
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    // gains[j] is the change into bar j+1, so the window for bar i is
    // gains[i-period..i].
    for (i, slot) in values.iter_mut().enumerate().skip(period) {
        let avg_gain = gains[i - period..i].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[i - period..i].iter().sum::<f64>() / period as f64;

        *slot = Some(if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        });
    }

    series_from(bars, IndicatorType::Rsi(period), values)
}
