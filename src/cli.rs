//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{write_indicator_csv, write_trades_csv, CsvAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::markdown_report::MarkdownReportAdapter;
use crate::domain::chart::EquityChart;
use crate::domain::config_validation::validate_analysis_config;
use crate::domain::error::StokError;
use crate::domain::indicator_helpers::{compute_indicators, IndicatorConfig};
use crate::domain::metrics::{BacktestOverview, PerformanceSummary, DEFAULT_RISK_FREE_RATE};
use crate::domain::ohlcv::{filter_valid, latest_bar, percent_change, DailyBar, PriceStats};
use crate::domain::trade::Trade;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{ReportPort, RunReport};

#[derive(Parser, Debug)]
#[command(name = "stok", about = "Technical indicators and backtest performance analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute every indicator for a symbol and write them as CSV
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarize the performance of one backtest run
    Performance {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        run: String,
        /// Run whose equity curve is shown as a benchmark
        #[arg(long)]
        benchmark: Option<String>,
        /// Markdown report path; falls back to [report] output
        #[arg(long)]
        report: Option<PathBuf>,
        /// Export the run's trades as CSV
        #[arg(long)]
        trades_out: Option<PathBuf>,
    },
    /// Price statistics for one or all symbols
    Stats {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Compare several backtest runs
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long = "run", required = true, num_args = 1..)]
        runs: Vec<String>,
    },
}

/// Typed view of a validated config file.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub data_dir: PathBuf,
    pub drop_invalid: bool,
    pub indicators: IndicatorConfig,
    pub risk_free_rate: f64,
    pub report_output: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Indicators {
            config,
            symbol,
            start,
            end,
            output,
        } => run_indicators(&config, &symbol, start, end, output.as_deref()),
        Command::Performance {
            config,
            run,
            benchmark,
            report,
            trades_out,
        } => run_performance(
            &config,
            &run,
            benchmark.as_deref(),
            report.as_deref(),
            trades_out.as_deref(),
        ),
        Command::Stats {
            config,
            symbol,
            start,
            end,
        } => run_stats(&config, symbol.as_deref(), start, end),
        Command::Validate { config } => run_validate(&config),
        Command::Compare { config, runs } => run_compare(&config, &runs),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load, validate and convert a config file.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, StokError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_analysis_config(&adapter)?;
    build_analysis_config(&adapter)
}

pub fn build_indicator_config(adapter: &dyn ConfigPort) -> IndicatorConfig {
    let defaults = IndicatorConfig::default();
    let period = |key: &str, default: usize| {
        let value = adapter.get_int("indicators", key, default as i64);
        usize::try_from(value).unwrap_or(default)
    };

    IndicatorConfig {
        ma_period: period("ma_period", defaults.ma_period),
        ema_period: period("ema_period", defaults.ema_period),
        rsi_period: period("rsi_period", defaults.rsi_period),
        bollinger_period: period("bollinger_period", defaults.bollinger_period),
        bollinger_multiplier: adapter.get_double(
            "indicators",
            "bollinger_multiplier",
            defaults.bollinger_multiplier,
        ),
    }
}

pub fn build_analysis_config(adapter: &dyn ConfigPort) -> Result<AnalysisConfig, StokError> {
    let data_dir = adapter
        .get_string("data", "dir")
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| StokError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        })?;

    Ok(AnalysisConfig {
        data_dir: PathBuf::from(data_dir),
        drop_invalid: adapter.get_bool("data", "drop_invalid", true),
        indicators: build_indicator_config(adapter),
        risk_free_rate: adapter.get_double("performance", "risk_free_rate", DEFAULT_RISK_FREE_RATE),
        report_output: adapter.get_string("report", "output").map(PathBuf::from),
    })
}

fn date_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> (NaiveDate, NaiveDate) {
    (start.unwrap_or(NaiveDate::MIN), end.unwrap_or(NaiveDate::MAX))
}

/// Fetch bars and apply the configured validity filter.
fn load_bars(
    data_port: &dyn DataPort,
    symbol: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    drop_invalid: bool,
) -> Result<Vec<DailyBar>, StokError> {
    let (start, end) = date_bounds(start, end);
    let bars = data_port.fetch_bars(symbol, start, end)?;
    if !drop_invalid {
        return Ok(bars);
    }

    let valid = filter_valid(&bars);
    if valid.len() < bars.len() {
        log::warn!(
            "{}: dropped {} invalid bars",
            symbol,
            bars.len() - valid.len()
        );
    }
    Ok(valid)
}

/// Compute the indicator table for `symbol` and write it to `out`.
/// Returns the number of data rows written.
pub fn indicator_table<W: Write>(
    data_port: &dyn DataPort,
    config: &AnalysisConfig,
    symbol: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    out: W,
) -> Result<usize, StokError> {
    let bars = load_bars(data_port, symbol, start, end, config.drop_invalid)?;
    if bars.is_empty() {
        return Err(StokError::NoData {
            symbol: symbol.to_string(),
        });
    }

    let warmup = config.indicators.longest_warmup();
    if bars.len() < warmup {
        eprintln!(
            "warning: {} has {} bars, some indicators need {} and stay undefined",
            symbol,
            bars.len(),
            warmup
        );
    }

    let indicators = compute_indicators(&bars, &config.indicators);
    write_indicator_csv(out, &bars, &indicators)?;
    Ok(bars.len())
}

fn run_indicators(
    config_path: &Path,
    symbol: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    output: Option<&Path>,
) -> Result<(), StokError> {
    let config = load_config(config_path)?;
    let data_port = CsvAdapter::new(config.data_dir.clone());

    let rows = match output {
        Some(path) => {
            let file = File::create(path)?;
            let rows = indicator_table(&data_port, &config, symbol, start, end, file)?;
            eprintln!("Indicators written to: {}", path.display());
            rows
        }
        None => indicator_table(&data_port, &config, symbol, start, end, io::stdout().lock())?,
    };
    log::info!("{}: {} rows of indicators", symbol, rows);
    Ok(())
}

/// Everything computed for one backtest run.
#[derive(Debug, Clone)]
pub struct RunAnalysis {
    pub run_id: String,
    pub trades: Vec<Trade>,
    pub summary: PerformanceSummary,
    pub chart: EquityChart,
}

impl RunAnalysis {
    pub fn as_report(&self) -> RunReport<'_> {
        RunReport {
            run_id: &self.run_id,
            summary: &self.summary,
            trades: &self.trades,
            chart: &self.chart,
        }
    }
}

pub fn analyze_run(
    data_port: &dyn DataPort,
    run_id: &str,
    benchmark_run: Option<&str>,
    risk_free_rate: f64,
) -> Result<RunAnalysis, StokError> {
    let trades = data_port.fetch_trades(run_id)?;
    let curve = data_port.fetch_equity_curve(run_id)?;
    if curve.is_empty() {
        return Err(StokError::NoData {
            symbol: format!("run {}", run_id),
        });
    }

    let benchmark = match benchmark_run {
        Some(id) => Some(data_port.fetch_equity_curve(id)?),
        None => None,
    };

    let summary = PerformanceSummary::compute(&trades, &curve, risk_free_rate);
    let chart = EquityChart::build(&curve, benchmark.as_deref());
    log::debug!(
        "run {}: {} trades, {} equity points",
        run_id,
        trades.len(),
        curve.len()
    );

    Ok(RunAnalysis {
        run_id: run_id.to_string(),
        trades,
        summary,
        chart,
    })
}

pub fn print_summary(run_id: &str, summary: &PerformanceSummary) {
    eprintln!("\n=== Performance: {} ===", run_id);
    eprintln!("Total Return:     {:.2}%", summary.total_return);
    eprintln!(
        "Annualized:       {:.2}%",
        summary.annualized_return * 100.0
    );
    eprintln!("Volatility:       {:.4}", summary.volatility);
    eprintln!("Sharpe Ratio:     {:.2}", summary.sharpe_ratio);
    eprintln!("Max Drawdown:     -{:.2}%", summary.max_drawdown);
    eprintln!("Total Trades:     {}", summary.total_trades);
    eprintln!(
        "Wins / Losses:    {} / {}",
        summary.winning_trades, summary.losing_trades
    );
    eprintln!("Win Rate:         {:.1}%", summary.win_rate);
    eprintln!("Profit Factor:    {:.2}", summary.profit_factor);
    eprintln!("Avg Profit:       {:.2}", summary.avg_profit_per_trade);
    eprintln!("Avg Loss:         {:.2}", summary.avg_loss_per_trade);
}

fn run_performance(
    config_path: &Path,
    run_id: &str,
    benchmark: Option<&str>,
    report: Option<&Path>,
    trades_out: Option<&Path>,
) -> Result<(), StokError> {
    let config = load_config(config_path)?;
    let data_port = CsvAdapter::new(config.data_dir.clone());

    let analysis = analyze_run(&data_port, run_id, benchmark, config.risk_free_rate)?;
    print_summary(run_id, &analysis.summary);

    if let Some(path) = trades_out {
        let file = File::create(path)?;
        write_trades_csv(file, &analysis.trades)?;
        eprintln!("\nTrades written to: {}", path.display());
    }

    let report_path = report.map(Path::to_path_buf).or(config.report_output);
    if let Some(path) = report_path {
        let path_str = path.to_string_lossy();
        MarkdownReportAdapter::new().write(&analysis.as_report(), &path_str)?;
        eprintln!("\nReport written to: {}", path.display());
    }
    Ok(())
}

/// Price summary for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolStats {
    pub symbol: String,
    pub bars: usize,
    pub stats: PriceStats,
    pub latest: Option<DailyBar>,
    /// Latest close against the one before it, in percent.
    pub last_change_pct: Option<f64>,
}

pub fn symbol_stats(
    data_port: &dyn DataPort,
    symbol: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    drop_invalid: bool,
) -> Result<SymbolStats, StokError> {
    let bars = load_bars(data_port, symbol, start, end, drop_invalid)?;
    if bars.is_empty() {
        return Err(StokError::NoData {
            symbol: symbol.to_string(),
        });
    }

    let last_change_pct = match bars.as_slice() {
        [.., prev, last] => Some(percent_change(last.close, prev.close)),
        _ => None,
    };

    Ok(SymbolStats {
        symbol: symbol.to_string(),
        bars: bars.len(),
        stats: PriceStats::compute(&bars),
        latest: latest_bar(&bars).cloned(),
        last_change_pct,
    })
}

fn run_stats(
    config_path: &Path,
    symbol: Option<&str>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), StokError> {
    let config = load_config(config_path)?;
    let data_port = CsvAdapter::new(config.data_dir.clone());

    let symbols = match symbol {
        Some(s) => vec![s.to_string()],
        None => data_port.list_symbols()?,
    };
    if symbols.is_empty() {
        return Err(StokError::Data {
            reason: format!("no symbols under {}", config.data_dir.display()),
        });
    }

    println!("symbol,bars,min,max,avg,volatility,latest_date,latest_close,change_pct");
    for sym in &symbols {
        let stats = match symbol_stats(&data_port, sym, start, end, config.drop_invalid) {
            Ok(s) => s,
            Err(e) if symbol.is_none() => {
                eprintln!("warning: skipping {} ({})", sym, e);
                continue;
            }
            Err(e) => return Err(e),
        };

        let (latest_date, latest_close) = stats
            .latest
            .as_ref()
            .map(|b| (b.date.to_string(), format!("{:.2}", b.close)))
            .unwrap_or_default();
        println!(
            "{},{},{:.2},{:.2},{:.2},{:.4},{},{},{}",
            stats.symbol,
            stats.bars,
            stats.stats.min,
            stats.stats.max,
            stats.stats.avg,
            stats.stats.volatility,
            latest_date,
            latest_close,
            stats
                .last_change_pct
                .map(|c| format!("{:.2}", c))
                .unwrap_or_default(),
        );
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), StokError> {
    let config = load_config(config_path)?;
    let ind = &config.indicators;
    eprintln!("Config validated successfully");
    eprintln!("  data dir:        {}", config.data_dir.display());
    eprintln!("  drop invalid:    {}", config.drop_invalid);
    eprintln!(
        "  indicators:      MA({}) EMA({}) RSI({}) BOLL({}, {})",
        ind.ma_period, ind.ema_period, ind.rsi_period, ind.bollinger_period, ind.bollinger_multiplier
    );
    eprintln!("  risk-free rate:  {}", config.risk_free_rate);
    Ok(())
}

pub fn compare_runs(
    data_port: &dyn DataPort,
    run_ids: &[String],
    risk_free_rate: f64,
) -> Result<(Vec<(String, PerformanceSummary)>, BacktestOverview), StokError> {
    let summaries = run_ids
        .iter()
        .map(|id| {
            analyze_run(data_port, id, None, risk_free_rate).map(|a| (a.run_id, a.summary))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let all: Vec<PerformanceSummary> = summaries.iter().map(|(_, s)| s.clone()).collect();
    let overview = BacktestOverview::compute(&all);
    Ok((summaries, overview))
}

fn run_compare(config_path: &Path, run_ids: &[String]) -> Result<(), StokError> {
    let config = load_config(config_path)?;
    let data_port = CsvAdapter::new(config.data_dir.clone());

    let (summaries, overview) = compare_runs(&data_port, run_ids, config.risk_free_rate)?;

    eprintln!("\n=== Per-Run Summary ===");
    for (id, s) in &summaries {
        eprintln!(
            "  {}:  {:+.2}% return, sharpe {:.2}, max dd {:.2}%, {} trades",
            id, s.total_return, s.sharpe_ratio, s.max_drawdown, s.total_trades
        );
    }

    eprintln!("\n=== Overview ===");
    eprintln!("Backtests:        {}", overview.total_backtests);
    eprintln!("Average Return:   {:.2}%", overview.avg_return);
    eprintln!("Best Return:      {:.2}%", overview.best_return);
    eprintln!("Worst Return:     {:.2}%", overview.worst_return);
    eprintln!("Average Sharpe:   {:.2}", overview.avg_sharpe);
    eprintln!("Success Rate:     {:.1}%", overview.success_rate);
    Ok(())
}
