//! CSV file data adapter and CSV exports.
//!
//! Layout under the configured data directory:
//! - `bars/<SYMBOL>.csv`: `date,open,high,low,close,volume`
//! - `results/<RUN>_trades.csv`: `date,type,symbol,price,shares,value,profit,reason`
//! - `results/<RUN>_equity.csv`: `date,value`

use crate::domain::error::StokError;
use crate::domain::indicator_helpers::IndicatorSet;
use crate::domain::ohlcv::{filter_by_date_range, DailyBar};
use crate::domain::trade::{EquityCurvePoint, Trade, TradeType};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn bars_dir(&self) -> PathBuf {
        self.base_path.join("bars")
    }

    fn bars_path(&self, symbol: &str) -> PathBuf {
        self.bars_dir().join(format!("{}.csv", symbol))
    }

    fn trades_path(&self, run_id: &str) -> PathBuf {
        self.base_path
            .join("results")
            .join(format!("{}_trades.csv", run_id))
    }

    fn equity_path(&self, run_id: &str) -> PathBuf {
        self.base_path
            .join("results")
            .join(format!("{}_equity.csv", run_id))
    }

    /// All bars in the symbol's file, sorted by date. `None` when there is no file.
    fn read_bars(&self, symbol: &str) -> Result<Option<Vec<DailyBar>>, StokError> {
        let path = self.bars_path(symbol);
        let Some(content) = read_optional(&path)? else {
            return Ok(None);
        };

        let file = path.display().to_string();
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| csv_error(&file, e))?;
            bars.push(DailyBar {
                symbol: symbol.to_string(),
                date: parse_date(&file, &record, 0, "date")?,
                open: parse_number(&file, &record, 1, "open")?,
                high: parse_number(&file, &record, 2, "high")?,
                low: parse_number(&file, &record, 3, "low")?,
                close: parse_number(&file, &record, 4, "close")?,
                volume: parse_number(&file, &record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.date);
        log::debug!("read {} bars from {}", bars.len(), file);
        Ok(Some(bars))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyBar>, StokError> {
        let bars = self
            .read_bars(symbol)?
            .ok_or_else(|| StokError::NoData {
                symbol: symbol.to_string(),
            })?;

        Ok(filter_by_date_range(&bars, start_date, end_date))
    }

    fn list_symbols(&self) -> Result<Vec<String>, StokError> {
        let dir = self.bars_dir();
        let entries = fs::read_dir(&dir).map_err(|e| StokError::Data {
            reason: format!("failed to read directory {}: {}", dir.display(), e),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StokError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                if !symbol.is_empty() {
                    symbols.push(symbol.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn fetch_trades(&self, run_id: &str) -> Result<Vec<Trade>, StokError> {
        let path = self.trades_path(run_id);
        let Some(content) = read_optional(&path)? else {
            log::warn!("no trades file for run {} at {}", run_id, path.display());
            return Ok(Vec::new());
        };

        let file = path.display().to_string();
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut trades = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| csv_error(&file, e))?;
            let trade_type: TradeType = required(&file, &record, 1, "type")?
                .parse()
                .map_err(|reason| StokError::CsvParse {
                    file: file.clone(),
                    reason,
                })?;

            trades.push(Trade {
                trade_type,
                date: parse_date(&file, &record, 0, "date")?,
                symbol: optional_text(&record, 2),
                price: parse_number(&file, &record, 3, "price")?,
                shares: parse_number(&file, &record, 4, "shares")?,
                value: parse_number(&file, &record, 5, "value")?,
                profit: parse_optional_number(&file, &record, 6, "profit")?,
                reason: optional_text(&record, 7),
            });
        }

        Ok(trades)
    }

    fn fetch_equity_curve(&self, run_id: &str) -> Result<Vec<EquityCurvePoint>, StokError> {
        let path = self.equity_path(run_id);
        let content = read_optional(&path)?.ok_or_else(|| StokError::NoData {
            symbol: format!("run {}", run_id),
        })?;

        let file = path.display().to_string();
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut curve = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| csv_error(&file, e))?;
            curve.push(EquityCurvePoint {
                date: parse_date(&file, &record, 0, "date")?,
                value: parse_number(&file, &record, 1, "value")?,
            });
        }

        Ok(curve)
    }
}

/// Write the aligned indicator table: `date,close` followed by one column per
/// indicator series. Undefined values are written as empty cells.
pub fn write_indicator_csv<W: Write>(
    writer: W,
    bars: &[DailyBar],
    indicators: &IndicatorSet,
) -> Result<(), StokError> {
    let columns = indicators.columns();
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["date".to_string(), "close".to_string()];
    header.extend(columns.iter().map(|s| s.indicator_type.to_string()));
    wtr.write_record(&header).map_err(write_error)?;

    for (i, bar) in bars.iter().enumerate() {
        let mut row = vec![bar.date.format(DATE_FORMAT).to_string(), bar.close.to_string()];
        row.extend(
            columns
                .iter()
                .map(|s| s.value(i).map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&row).map_err(write_error)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write trades in the same column layout [`CsvAdapter`] reads.
pub fn write_trades_csv<W: Write>(writer: W, trades: &[Trade]) -> Result<(), StokError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "date", "type", "symbol", "price", "shares", "value", "profit", "reason",
    ])
    .map_err(write_error)?;

    for trade in trades {
        wtr.write_record([
            trade.date.format(DATE_FORMAT).to_string(),
            trade.trade_type.to_string(),
            trade.symbol.clone().unwrap_or_default(),
            trade.price.to_string(),
            trade.shares.to_string(),
            trade.value.to_string(),
            trade.profit.map(|p| p.to_string()).unwrap_or_default(),
            trade.reason.clone().unwrap_or_default(),
        ])
        .map_err(write_error)?;
    }

    wtr.flush()?;
    Ok(())
}

fn read_optional(path: &Path) -> Result<Option<String>, StokError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StokError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        }),
    }
}

fn csv_error(file: &str, err: csv::Error) -> StokError {
    StokError::CsvParse {
        file: file.to_string(),
        reason: err.to_string(),
    }
}

fn write_error(err: csv::Error) -> StokError {
    StokError::Data {
        reason: format!("CSV write error: {}", err),
    }
}

fn required<'r>(
    file: &str,
    record: &'r csv::StringRecord,
    index: usize,
    column: &str,
) -> Result<&'r str, StokError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| StokError::CsvParse {
            file: file.to_string(),
            reason: format!("missing {} column", column),
        })
}

fn parse_date(
    file: &str,
    record: &csv::StringRecord,
    index: usize,
    column: &str,
) -> Result<NaiveDate, StokError> {
    let raw = required(file, record, index, column)?;
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| StokError::CsvParse {
        file: file.to_string(),
        reason: format!("invalid {} '{}': {}", column, raw, e),
    })
}

fn parse_number(
    file: &str,
    record: &csv::StringRecord,
    index: usize,
    column: &str,
) -> Result<f64, StokError> {
    let raw = required(file, record, index, column)?;
    raw.parse().map_err(|e| StokError::CsvParse {
        file: file.to_string(),
        reason: format!("invalid {} value '{}': {}", column, raw, e),
    })
}

fn parse_optional_number(
    file: &str,
    record: &csv::StringRecord,
    index: usize,
    column: &str,
) -> Result<Option<f64>, StokError> {
    match record.get(index).map(str::trim) {
        None | Some("") => Ok(None),
        Some(_) => parse_number(file, record, index, column).map(Some),
    }
}

fn optional_text(record: &csv::StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
