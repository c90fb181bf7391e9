//! # Forecast Math
//!
//! Numeric building blocks shared by the forecasting algorithms.
//! This crate provides summary statistics over plain slices, a least squares
//! solver and the Fourier seasonality features used by the reference engine.

use thiserror::Error;

pub mod regression;
pub mod seasonality;
pub mod statistics;

pub use regression::{fit_linear_trend, solve_least_squares, LinearTrend};
pub use seasonality::{fourier_series, FourierTerm};
pub use statistics::{mean, mean_interval_width, quantile, sample_std_dev};

/// Errors that can occur in forecasting calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecasting math operations
pub type Result<T> = std::result::Result<T, MathError>;
