//! stok: technical indicators over daily price bars and performance
//! metrics for backtest results.
//!
//! Hexagonal architecture: pure computation in [`domain`], port traits in
//! [`ports`], CSV/INI/Markdown implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
