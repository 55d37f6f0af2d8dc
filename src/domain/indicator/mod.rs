//! Technical indicator implementations.
//!
//! Every indicator returns series aligned 1:1 with the input bars:
//! - `IndicatorPoint`: one date plus an optional value (`None` while the
//!   look-back window is still filling)
//! - `IndicatorType`: indicator identity + parameters, also used as a column label
//! - `IndicatorSeries`: the aligned sequence of points
//!
//! All functions are pure. Windowed statistics are recomputed at every index
//! so results match the reference summation order exactly.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::{bollinger_bands, BollingerBands, DEFAULT_BOLLINGER_MULTIPLIER, DEFAULT_BOLLINGER_PERIOD};
pub use ema::{ema_of_values, exponential_moving_average};
pub use macd::{macd, MacdSeries};
pub use rsi::{rsi, DEFAULT_RSI_PERIOD};
pub use sma::moving_average;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::ohlcv::DailyBar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacdLine {
    Dif,
    Dea,
    Histogram,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Bollinger {
        period: usize,
        stddev_mult_x100: i32,
        band: BollingerBand,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
        line: MacdLine,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`; `None` when undefined or out of range.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(|p| p.value)
    }

    /// The bare values, dropping dates.
    pub fn to_options(&self) -> Vec<Option<f64>> {
        self.values.iter().map(|p| p.value).collect()
    }

    /// Number of defined points.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|p| p.value.is_some()).count()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
                band,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                let name = match band {
                    BollingerBand::Upper => "BOLL_UPPER",
                    BollingerBand::Middle => "BOLL_MIDDLE",
                    BollingerBand::Lower => "BOLL_LOWER",
                };
                write!(f, "{}({},{})", name, period, mult)
            }
            IndicatorType::Macd {
                fast,
                slow,
                signal,
                line,
            } => {
                let name = match line {
                    MacdLine::Dif => "MACD_DIF",
                    MacdLine::Dea => "MACD_DEA",
                    MacdLine::Histogram => "MACD_HIST",
                };
                write!(f, "{}({},{},{})", name, fast, slow, signal)
            }
        }
    }
}

/// Attach bar dates to computed values. `values` must be aligned with `bars`.
pub(crate) fn series_from(
    bars: &[DailyBar],
    indicator_type: IndicatorType,
    values: Vec<Option<f64>>,
) -> IndicatorSeries {
    debug_assert_eq!(bars.len(), values.len());
    IndicatorSeries {
        indicator_type,
        values: bars
            .iter()
            .zip(values)
            .map(|(bar, value)| IndicatorPoint {
                date: bar.date,
                value,
            })
            .collect(),
    }
}

/// Mean of the trailing `period` closes ending at `end` inclusive, summed
/// newest first. Caller guarantees `end + 1 >= period` and `period > 0`.
pub(crate) fn trailing_close_mean(bars: &[DailyBar], end: usize, period: usize) -> f64 {
    let sum: f64 = bars[end + 1 - period..=end]
        .iter()
        .rev()
        .map(|b| b.close)
        .sum();
    sum / period as f64
}
