//! Domain error types.

/// Top-level error type for dtitrader.
#[derive(Debug, thiserror::Error)]
pub enum DtiTraderError {
    #[error("invalid series input: {reason}")]
    InvalidSeries { reason: String },

    #[error("invalid indicator period {period} for {name}")]
    InvalidPeriod { name: String, period: usize },

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

    #[error("no data for {symbol} on {market}")]
    NoData { symbol: String, market: String },

    #[error("data error for {symbol}: {reason}")]
    Data { symbol: String, reason: String },

    #[error("no conversion rate from {from} to {to}")]
    UnknownCurrencyPair { from: String, to: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&DtiTraderError> for std::process::ExitCode {
    fn from(err: &DtiTraderError) -> Self {
        let code: u8 = match err {
            DtiTraderError::Io(_) => 1,
            DtiTraderError::ConfigParse { .. }
            | DtiTraderError::ConfigMissing { .. }
            | DtiTraderError::ConfigInvalid { .. } => 2,
            DtiTraderError::InvalidSeries { .. } | DtiTraderError::InvalidPeriod { .. } => 3,
            DtiTraderError::NoData { .. } | DtiTraderError::Data { .. } => 4,
            DtiTraderError::UnknownCurrencyPair { .. } => 5,
            DtiTraderError::Report { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
