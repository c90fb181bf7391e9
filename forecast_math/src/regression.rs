//! Ordinary least squares.
//!
//! Design matrices here are tall and narrow (one row per observation, a
//! handful of trend and Fourier columns), so the system is solved through an
//! SVD rather than a square QR solve.

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};

/// Solve `min ||X b - y||^2` for `b`.
///
/// `rows` holds one design row per observation; every row must have the same
/// width. Progressively looser singular value tolerances are tried before
/// giving up on an ill-conditioned system.
pub fn solve_least_squares(rows: &[Vec<f64>], y: &[f64]) -> Result<Vec<f64>> {
    if rows.is_empty() {
        return Err(MathError::InsufficientData(
            "Least squares needs at least one observation".to_string(),
        ));
    }
    if rows.len() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "Design matrix has {} rows but target has {} values",
            rows.len(),
            y.len()
        )));
    }

    let width = rows[0].len();
    if width == 0 || rows.iter().any(|r| r.len() != width) {
        return Err(MathError::InvalidInput(
            "Design matrix rows must share a non-zero width".to_string(),
        ));
    }

    let x = DMatrix::from_fn(rows.len(), width, |i, j| rows[i][j]);
    let target = DVector::from_column_slice(y);
    let svd = x.svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(&target, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Ok(beta.iter().copied().collect());
            }
        }
    }

    Err(MathError::CalculationError(
        "Least squares system is too ill-conditioned to solve".to_string(),
    ))
}

/// Straight line `intercept + slope * t`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearTrend {
    /// Evaluate the trend at `t`
    pub fn at(&self, t: f64) -> f64 {
        self.intercept + self.slope * t
    }
}

/// Fit a linear trend of `y` against `t`
pub fn fit_linear_trend(t: &[f64], y: &[f64]) -> Result<LinearTrend> {
    if t.len() < 2 {
        return Err(MathError::InsufficientData(
            "A linear trend needs at least two observations".to_string(),
        ));
    }

    let rows: Vec<Vec<f64>> = t.iter().map(|&ti| vec![1.0, ti]).collect();
    let beta = solve_least_squares(&rows, y)?;

    Ok(LinearTrend {
        intercept: beta[0],
        slope: beta[1],
    })
}
