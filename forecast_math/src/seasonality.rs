//! Fourier seasonality features

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A periodic component described by its period (in days) and Fourier order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourierTerm {
    pub period: f64,
    pub order: usize,
}

impl FourierTerm {
    /// Weekly seasonality, order 3
    pub const WEEKLY: FourierTerm = FourierTerm {
        period: 7.0,
        order: 3,
    };

    /// Yearly seasonality, order 10
    pub const YEARLY: FourierTerm = FourierTerm {
        period: 365.25,
        order: 10,
    };

    /// Number of design columns this term contributes
    pub fn width(&self) -> usize {
        2 * self.order
    }
}

/// Fourier features for each time point.
///
/// `t_days` is measured in days from any fixed origin. Each returned row holds
/// `sin(2πkt/P), cos(2πkt/P)` for `k = 1..=order`.
pub fn fourier_series(t_days: &[f64], term: FourierTerm) -> Vec<Vec<f64>> {
    t_days
        .iter()
        .map(|&t| {
            (1..=term.order)
                .flat_map(|k| {
                    let angle = 2.0 * PI * k as f64 * t / term.period;
                    [angle.sin(), angle.cos()]
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn fourier_rows_have_expected_width() {
        let rows = fourier_series(&[0.0, 1.0, 2.0], FourierTerm::WEEKLY);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.len() == FourierTerm::WEEKLY.width()));
    }

    #[test]
    fn fourier_series_repeats_after_one_period() {
        let term = FourierTerm {
            period: 7.0,
            order: 2,
        };
        let rows = fourier_series(&[1.5, 8.5], term);
        for (a, b) in rows[0].iter().zip(&rows[1]) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }
}
