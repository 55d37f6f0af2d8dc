//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the population standard deviation (divides by N) of the window's
//! closes measured against Middle[i].
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined in all three bands.

use crate::domain::indicator::{
    moving_average, series_from, BollingerBand, IndicatorSeries, IndicatorType,
};
use crate::domain::ohlcv::DailyBar;

pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_BOLLINGER_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub middle: IndicatorSeries,
    pub upper: IndicatorSeries,
    pub lower: IndicatorSeries,
}

pub fn bollinger_bands(bars: &[DailyBar], period: usize, multiplier: f64) -> BollingerBands {
    let middle = moving_average(bars, period);
    let stddev_mult_x100 = (multiplier * 100.0).round() as i32;
    let band_type = |band| IndicatorType::Bollinger {
        period,
        stddev_mult_x100,
        band,
    };

    let mut upper = Vec::with_capacity(bars.len());
    let mut lower = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        match middle.value(i) {
            Some(mid) => {
                let sum_sq: f64 = bars[i + 1 - period..=i]
                    .iter()
                    .rev()
                    .map(|b| (b.close - mid).powi(2))
                    .sum();
                let std = (sum_sq / period as f64).sqrt();
                upper.push(Some(mid + multiplier * std));
                lower.push(Some(mid - multiplier * std));
            }
            None => {
                upper.push(None);
                lower.push(None);
            }
        }
    }

    BollingerBands {
        middle: IndicatorSeries {
            indicator_type: band_type(BollingerBand::Middle),
            values: middle.values,
        },
        upper: series_from(bars, band_type(BollingerBand::Upper), upper),
        lower: series_from(bars, band_type(BollingerBand::Lower), lower),
    }
}
