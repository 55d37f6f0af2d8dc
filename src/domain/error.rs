//! Domain error types.
//!
//! The numeric core never returns errors; these cover the adapters and the
//! CLI that feed it.

/// Top-level error type for stok.
#[derive(Debug, thiserror::Error)]
pub enum StokError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("CSV parse error in {file}: {reason}")]
    CsvParse { file: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StokError> for std::process::ExitCode {
    fn from(err: &StokError) -> Self {
        let code: u8 = match err {
            StokError::Io(_) => 1,
            StokError::ConfigParse { .. }
            | StokError::ConfigMissing { .. }
            | StokError::ConfigInvalid { .. } => 2,
            StokError::Data { .. } | StokError::CsvParse { .. } => 3,
            StokError::NoData { .. } => 5,
            StokError::Report { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
