//! Summary statistics over plain value slices
//!
//! Thin wrappers around `statrs` that turn its NaN conventions into
//! explicit errors where a missing value would be a bug.

use crate::{MathError, Result};
use statrs::statistics::{Data, OrderStatistics, Statistics};

/// Arithmetic mean of `values`
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot calculate the mean of an empty series".to_string(),
        ));
    }

    Ok(values.iter().mean())
}

/// Sample (n - 1) standard deviation of `values`.
///
/// A single observation has no spread to estimate and yields `NaN`,
/// an empty slice is an error.
pub fn sample_std_dev(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot calculate the standard deviation of an empty series".to_string(),
        ));
    }

    Ok(values.iter().std_dev())
}

/// Quantile `tau` (in `[0, 1]`) of `values`
pub fn quantile(values: &[f64], tau: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot calculate a quantile of an empty series".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&tau) {
        return Err(MathError::InvalidInput(format!(
            "Quantile must be between 0 and 1, got {}",
            tau
        )));
    }

    let mut data = Data::new(values.to_vec());
    Ok(data.quantile(tau))
}

/// Mean width of an interval band, `upper[i] - lower[i]` averaged.
///
/// An empty band has no width and yields `NaN`.
pub fn mean_interval_width(lower: &[f64], upper: &[f64]) -> Result<f64> {
    if lower.len() != upper.len() {
        return Err(MathError::InvalidInput(format!(
            "Lower bound length ({}) doesn't match upper bound length ({})",
            lower.len(),
            upper.len()
        )));
    }
    if lower.is_empty() {
        return Ok(f64::NAN);
    }

    let widths: Vec<f64> = lower.iter().zip(upper).map(|(l, u)| u - l).collect();
    mean(&widths)
}
