//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! DIF = EMA(12) - EMA(26)
//! DEA = EMA(9) of DIF
//! MACD = (DIF - DEA) * 2
//!
//! Periods are fixed at 12/26/9. Any line is undefined wherever one of its
//! operands is undefined, so DIF starts at bar 25 and DEA/MACD at bar 33.
//!
//! The DEA EMA skips DIF's leading undefined values and seeds from the first
//! 9 defined ones. Seeding from the undefined warm-up would leave DEA and MACD
//! undefined at every bar.

use crate::domain::indicator::{
    ema_of_values, exponential_moving_average, series_from, IndicatorSeries, IndicatorType,
    MacdLine,
};
use crate::domain::ohlcv::DailyBar;

pub const FAST_PERIOD: usize = 12;
pub const SLOW_PERIOD: usize = 26;
pub const SIGNAL_PERIOD: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub dif: IndicatorSeries,
    pub dea: IndicatorSeries,
    pub macd: IndicatorSeries,
}

pub fn macd(bars: &[DailyBar]) -> MacdSeries {
    let ema_fast = exponential_moving_average(bars, FAST_PERIOD);
    let ema_slow = exponential_moving_average(bars, SLOW_PERIOD);

    let dif: Vec<Option<f64>> = ema_fast
        .values
        .iter()
        .zip(&ema_slow.values)
        .map(|(fast, slow)| match (fast.value, slow.value) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let dea = ema_of_values(&dif, SIGNAL_PERIOD);

    let histogram: Vec<Option<f64>> = dif
        .iter()
        .zip(&dea)
        .map(|(d, e)| match (d, e) {
            (Some(d), Some(e)) => Some((d - e) * 2.0),
            _ => None,
        })
        .collect();

    let line_type = |line| IndicatorType::Macd {
        fast: FAST_PERIOD,
        slow: SLOW_PERIOD,
        signal: SIGNAL_PERIOD,
        line,
    };

    MacdSeries {
        dif: series_from(bars, line_type(MacdLine::Dif), dif),
        dea: series_from(bars, line_type(MacdLine::Dea), dea),
        macd: series_from(bars, line_type(MacdLine::Histogram), histogram),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;

    fn trending_bars(count: usize) -> Vec<DailyBar> {
        let prices: Vec<f64> = (0..count)
            .map(|i| 100.0 + i as f64 + (i as f64 * 0.7).sin() * 3.0)
            .collect();
        make_bars(&prices)
    }

    #[test]
    fn macd_warmup_default() {
        let bars = trending_bars(50);
        let series = macd(&bars);

        let dif_start = SLOW_PERIOD - 1;
        let dea_start = SLOW_PERIOD - 1 + SIGNAL_PERIOD - 1;

        for i in 0..dif_start {
            assert_eq!(series.dif.value(i), None, "DIF {} should be undefined", i);
        }
        assert!(series.dif.value(dif_start).is_some());

        for i in 0..dea_start {
            assert_eq!(series.dea.value(i), None, "DEA {} should be undefined", i);
            assert_eq!(series.macd.value(i), None, "MACD {} should be undefined", i);
        }
        assert!(series.dea.value(dea_start).is_some());
        assert!(series.macd.value(dea_start).is_some());
    }

    #[test]
    fn macd_alignment() {
        let bars = trending_bars(40);
        let series = macd(&bars);
        assert_eq!(series.dif.len(), 40);
        assert_eq!(series.dea.len(), 40);
        assert_eq!(series.macd.len(), 40);
    }

    #[test]
    fn macd_histogram_is_twice_dif_minus_dea() {
        let bars = trending_bars(60);
        let series = macd(&bars);

        for i in 0..bars.len() {
            if let (Some(d), Some(e), Some(h)) =
                (series.dif.value(i), series.dea.value(i), series.macd.value(i))
            {
                assert!((h - (d - e) * 2.0).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn macd_dif_is_ema_fast_minus_ema_slow() {
        let bars = trending_bars(40);
        let series = macd(&bars);
        let fast = exponential_moving_average(&bars, FAST_PERIOD);
        let slow = exponential_moving_average(&bars, SLOW_PERIOD);

        for i in 0..bars.len() {
            let expected = match (fast.value(i), slow.value(i)) {
                (Some(f), Some(s)) => Some(f - s),
                _ => None,
            };
            assert_eq!(series.dif.value(i), expected, "DIF mismatch at {}", i);
        }
    }

    #[test]
    fn macd_dea_seed_is_mean_of_first_nine_dif() {
        let bars = trending_bars(40);
        let series = macd(&bars);

        let start = SLOW_PERIOD - 1;
        let seed: f64 = (start..start + SIGNAL_PERIOD)
            .map(|i| series.dif.value(i).unwrap())
            .sum::<f64>()
            / SIGNAL_PERIOD as f64;

        let dea = series.dea.value(start + SIGNAL_PERIOD - 1).unwrap();
        assert!((dea - seed).abs() < 1e-12);
    }

    #[test]
    fn macd_short_series_all_undefined() {
        let bars = trending_bars(20);
        let series = macd(&bars);
        assert_eq!(series.dif.defined_count(), 0);
        assert_eq!(series.dea.defined_count(), 0);
        assert_eq!(series.macd.defined_count(), 0);
    }

    #[test]
    fn macd_flat_prices_are_zero() {
        let bars = make_bars(&[50.0; 40]);
        let series = macd(&bars);
        for v in series.macd.to_options().into_iter().flatten() {
            assert!(v.abs() < 1e-12);
        }
    }

    #[test]
    fn macd_empty_bars() {
        let series = macd(&[]);
        assert!(series.dif.is_empty());
        assert!(series.dea.is_empty());
        assert!(series.macd.is_empty());
    }

    #[test]
    fn macd_indicator_types() {
        let bars = make_bars(&[100.0]);
        let series = macd(&bars);
        assert_eq!(series.dea.indicator_type.to_string(), "MACD_DEA(12,26,9)");
        assert_eq!(series.macd.indicator_type.to_string(), "MACD_HIST(12,26,9)");
    }
}
