//! Core domain types and logic.

pub mod ohlcv;
pub mod stats;
pub mod indicator;
pub mod indicator_helpers;
pub mod trade;
pub mod metrics;
pub mod chart;
pub mod config_validation;
pub mod error;
