use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Series for '{0}' has no bars")]
    EmptySeries(String),

    #[error("Insufficient data: {what} requires at least {required}, got {actual}")]
    InsufficientData {
        what: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("Insufficient recent data: latest bar of '{0}' has incomplete indicators")]
    InsufficientRecentData(String),

    #[error("Predictor has not been trained")]
    NotTrained,

    #[error("Invalid feature '{name}' at position {index}: {value}")]
    InvalidFeature {
        index: usize,
        name: &'static str,
        value: f64,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("Market data error: {0}")]
    MarketDataError(String),

    #[error("Internal processing error: {0}")]
    ProcessingError(String),

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl EngineError {
    /// True for conditions the caller can fix by supplying more history or retrying later.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::EmptySeries(_)
                | EngineError::InsufficientData { .. }
                | EngineError::InsufficientRecentData(_)
                | EngineError::NotTrained
                | EngineError::InvalidFeature { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_kinds() {
        assert!(EngineError::NotTrained.is_recoverable());
        let short = EngineError::InsufficientData {
            what: "training pairs",
            required: 30,
            actual: 5,
        };
        assert!(short.is_recoverable());
        assert!(!EngineError::ConfigError("bad".to_string()).is_recoverable());
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = EngineError::InsufficientData {
            what: "raw bars",
            required: 100,
            actual: 40,
        };
        assert_eq!(err.to_string(), "Insufficient data: raw bars requires at least 100, got 40");
    }
}
