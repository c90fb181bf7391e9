//! Error types for the demand_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A parameter value is outside its declared domain.
    ///
    /// The message is complete and is reported to callers verbatim.
    #[error("{0}")]
    ValidationError(String),

    /// Error raised while fitting or predicting
    #[error("Computation error: {0}")]
    ComputationError(String),

    /// Error related to frame construction or window sizes
    #[error("Data error: {0}")]
    DataError(String),

    /// Error decoding a delimited value string
    #[error("Encoding error: {0}")]
    EncodingError(String),

    /// Error from numeric helpers
    #[error("Math error: {0}")]
    MathError(#[from] forecast_math::MathError),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error in configuration or algorithm selection
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
