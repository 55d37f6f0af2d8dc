//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n values, then
//! EMA[i] = (X[i] - EMA[i-1]) * k + EMA[i-1].
//! Warmup: first (n-1) values are undefined.

use crate::domain::indicator::{series_from, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::DailyBar;

pub fn exponential_moving_average(bars: &[DailyBar], period: usize) -> IndicatorSeries {
    let closes: Vec<Option<f64>> = bars.iter().map(|b| Some(b.close)).collect();
    let values = ema_of_values(&closes, period);
    series_from(bars, IndicatorType::Ema(period), values)
}

/// EMA over an arbitrary aligned series.
///
/// Leading undefined values are skipped and the seed window starts at the
/// first defined value. A gap after that point ends the series: the rest of
/// the output stays undefined.
pub fn ema_of_values(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let Some(start) = values.iter().position(Option::is_some) else {
        return out;
    };

    let k = 2.0 / (period as f64 + 1.0);
    let mut sum = 0.0;
    let mut ema = 0.0;

    for (offset, value) in values[start..].iter().enumerate() {
        let Some(x) = *value else {
            break;
        };
        let i = start + offset;
        let filled = offset + 1;

        if filled < period {
            sum += x;
        } else if filled == period {
            sum += x;
            ema = sum / period as f64;
            out[i] = Some(ema);
        } else {
            ema = (x - ema) * k + ema;
            out[i] = Some(ema);
        }
    }

    out
}
