//! Configuration validation.
//!
//! Checks the `[indicators]` and `[performance]` sections before any data is
//! loaded. Missing keys fall back to defaults; only present, bad values fail.

use crate::domain::error::StokError;
use crate::domain::indicator_helpers::IndicatorConfig;
use crate::domain::metrics::DEFAULT_RISK_FREE_RATE;
use crate::ports::config_port::ConfigPort;

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), StokError> {
    validate_periods(config)?;
    validate_bollinger_multiplier(config)?;
    validate_risk_free_rate(config)?;
    validate_data_dir(config)?;
    Ok(())
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), StokError> {
    let defaults = IndicatorConfig::default();
    let periods = [
        ("ma_period", defaults.ma_period),
        ("ema_period", defaults.ema_period),
        ("rsi_period", defaults.rsi_period),
        ("bollinger_period", defaults.bollinger_period),
    ];
    for (key, default) in periods {
        let value = config.get_int("indicators", key, default as i64);
        if value <= 0 {
            return Err(StokError::ConfigInvalid {
                section: "indicators".to_string(),
                key: key.to_string(),
                reason: format!("{} must be a positive integer", key),
            });
        }
    }
    Ok(())
}

fn validate_bollinger_multiplier(config: &dyn ConfigPort) -> Result<(), StokError> {
    let defaults = IndicatorConfig::default();
    let value = config.get_double(
        "indicators",
        "bollinger_multiplier",
        defaults.bollinger_multiplier,
    );
    if !value.is_finite() || value <= 0.0 {
        return Err(StokError::ConfigInvalid {
            section: "indicators".to_string(),
            key: "bollinger_multiplier".to_string(),
            reason: "bollinger_multiplier must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), StokError> {
    let value = config.get_double("performance", "risk_free_rate", DEFAULT_RISK_FREE_RATE);
    if !(0.0..1.0).contains(&value) {
        return Err(StokError::ConfigInvalid {
            section: "performance".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), StokError> {
    match config.get_string("data", "dir") {
        Some(dir) if !dir.trim().is_empty() => Ok(()),
        _ => Err(StokError::ConfigMissing {
            section: "data".to_string(),
            key: "dir".to_string(),
        }),
    }
}
