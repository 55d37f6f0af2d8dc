#![allow(dead_code)]

use chrono::NaiveDate;
pub use stok::domain::ohlcv::DailyBar;
use stok::domain::ohlcv::filter_by_date_range;
use stok::domain::error::StokError;
use stok::domain::trade::{EquityCurvePoint, Trade, TradeType};
use stok::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub bars: HashMap<String, Vec<DailyBar>>,
    pub trades: HashMap<String, Vec<Trade>>,
    pub curves: HashMap<String, Vec<EquityCurvePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            trades: HashMap::new(),
            curves: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<DailyBar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_run(
        mut self,
        run_id: &str,
        trades: Vec<Trade>,
        curve: Vec<EquityCurvePoint>,
    ) -> Self {
        self.trades.insert(run_id.to_string(), trades);
        self.curves.insert(run_id.to_string(), curve);
        self
    }

    pub fn with_error(mut self, key: &str, reason: &str) -> Self {
        self.errors.insert(key.to_string(), reason.to_string());
        self
    }

    fn check_error(&self, key: &str) -> Result<(), StokError> {
        match self.errors.get(key) {
            Some(reason) => Err(StokError::Data {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyBar>, StokError> {
        self.check_error(symbol)?;
        let bars = self.bars.get(symbol).ok_or_else(|| StokError::NoData {
            symbol: symbol.to_string(),
        })?;
        Ok(filter_by_date_range(bars, start_date, end_date))
    }

    fn list_symbols(&self) -> Result<Vec<String>, StokError> {
        let mut symbols: Vec<String> = self.bars.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn fetch_trades(&self, run_id: &str) -> Result<Vec<Trade>, StokError> {
        self.check_error(run_id)?;
        Ok(self.trades.get(run_id).cloned().unwrap_or_default())
    }

    fn fetch_equity_curve(&self, run_id: &str) -> Result<Vec<EquityCurvePoint>, StokError> {
        self.check_error(run_id)?;
        self.curves.get(run_id).cloned().ok_or_else(|| StokError::NoData {
            symbol: format!("run {}", run_id),
        })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Day `offset` counted from 2024-01-01.
pub fn day(offset: usize) -> NaiveDate {
    date(2024, 1, 1) + chrono::Duration::days(offset as i64)
}

pub fn make_bar(symbol: &str, offset: usize, close: f64) -> DailyBar {
    DailyBar {
        symbol: symbol.to_string(),
        date: day(offset),
        open: close,
        high: close + 1.0,
        low: (close - 1.0).max(0.01),
        close,
        volume: 1000.0,
    }
}

pub fn make_bars(symbol: &str, closes: &[f64]) -> Vec<DailyBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(symbol, i, c))
        .collect()
}

/// A closing trade with the given profit on day `offset`.
pub fn make_trade(offset: usize, profit: Option<f64>) -> Trade {
    Trade {
        trade_type: if profit.is_some() {
            TradeType::Sell
        } else {
            TradeType::Buy
        },
        date: day(offset),
        price: 100.0,
        shares: 10.0,
        value: 1000.0,
        profit,
        reason: None,
        symbol: Some("TEST".to_string()),
    }
}

pub fn make_curve(values: &[f64]) -> Vec<EquityCurvePoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| EquityCurvePoint {
            date: day(i),
            value,
        })
        .collect()
}
