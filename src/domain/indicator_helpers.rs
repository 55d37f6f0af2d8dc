//! Batch computation of every supported indicator for one bar series.

use crate::domain::indicator::{
    bollinger_bands, exponential_moving_average, macd, moving_average, rsi, BollingerBands,
    IndicatorSeries, MacdSeries, DEFAULT_BOLLINGER_MULTIPLIER, DEFAULT_BOLLINGER_PERIOD,
    DEFAULT_RSI_PERIOD,
};
use crate::domain::ohlcv::DailyBar;

pub const DEFAULT_MA_PERIOD: usize = 20;
pub const DEFAULT_EMA_PERIOD: usize = 12;

/// Indicator parameters, read from the `[indicators]` config section.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub ma_period: usize,
    pub ema_period: usize,
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            ma_period: DEFAULT_MA_PERIOD,
            ema_period: DEFAULT_EMA_PERIOD,
            rsi_period: DEFAULT_RSI_PERIOD,
            bollinger_period: DEFAULT_BOLLINGER_PERIOD,
            bollinger_multiplier: DEFAULT_BOLLINGER_MULTIPLIER,
        }
    }
}

impl IndicatorConfig {
    /// Bars needed before every configured indicator has a defined value.
    /// MACD needs 26 + 9 - 1 bars.
    pub fn longest_warmup(&self) -> usize {
        let macd_bars = 26 + 9 - 1;
        [
            self.ma_period,
            self.ema_period,
            self.rsi_period + 1,
            self.bollinger_period,
            macd_bars,
        ]
        .into_iter()
        .max()
        .unwrap_or(macd_bars)
    }
}

/// Every indicator for one series, each aligned with the input bars.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub ma: IndicatorSeries,
    pub ema: IndicatorSeries,
    pub rsi: IndicatorSeries,
    pub bollinger: BollingerBands,
    pub macd: MacdSeries,
}

impl IndicatorSet {
    /// Series in output column order.
    pub fn columns(&self) -> [&IndicatorSeries; 9] {
        [
            &self.ma,
            &self.ema,
            &self.rsi,
            &self.bollinger.upper,
            &self.bollinger.middle,
            &self.bollinger.lower,
            &self.macd.dif,
            &self.macd.dea,
            &self.macd.macd,
        ]
    }
}

pub fn compute_indicators(bars: &[DailyBar], config: &IndicatorConfig) -> IndicatorSet {
    log::debug!(
        "computing indicators over {} bars (ma={}, ema={}, rsi={}, boll={}x{})",
        bars.len(),
        config.ma_period,
        config.ema_period,
        config.rsi_period,
        config.bollinger_period,
        config.bollinger_multiplier,
    );

    IndicatorSet {
        ma: moving_average(bars, config.ma_period),
        ema: exponential_moving_average(bars, config.ema_period),
        rsi: rsi(bars, config.rsi_period),
        bollinger: bollinger_bands(bars, config.bollinger_period, config.bollinger_multiplier),
        macd: macd(bars),
    }
}
