//! Forecasting engine capability.
//!
//! The seasonal algorithm delegates fitting and prediction to an engine
//! behind [`ForecastEngine`]. Any engine honouring the `ds`/`y` column
//! contract can stand in for the bundled [`SeasonalTrendModel`].

use crate::error::{ForecastError, Result};
use chrono::NaiveDateTime;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod seasonal_trend;

pub use seasonal_trend::{SeasonalTrendBuilder, SeasonalTrendModel};

/// Time column expected by engines
pub const ENGINE_TIME_COLUMN: &str = "ds";
/// Value column expected by engines
pub const ENGINE_VALUE_COLUMN: &str = "y";

/// How seasonal effects combine with the trend level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    /// Seasonal effects add to the trend
    #[default]
    Additive,
    /// Seasonal effects scale with the trend
    Multiplicative,
}

impl SeasonalityMode {
    /// Literal values accepted for a seasonality mode
    pub const CHOICES: &'static [&'static str] = &["additive", "multiplicative"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonalityMode::Additive => "additive",
            SeasonalityMode::Multiplicative => "multiplicative",
        }
    }
}

impl fmt::Display for SeasonalityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeasonalityMode {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "additive" => Ok(SeasonalityMode::Additive),
            "multiplicative" => Ok(SeasonalityMode::Multiplicative),
            _ => Err(ForecastError::ValidationError(format!(
                "Invalid seasonality mode: {}. Must be 'additive' or 'multiplicative'.",
                s
            ))),
        }
    }
}

/// Settings an engine is built with for one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineSettings {
    pub seasonality_mode: SeasonalityMode,
    /// Number of simulated paths for interval estimation, 0 disables intervals
    pub uncertainty_samples: u32,
}

/// Point estimates with optional uncertainty bounds, one row per timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnginePrediction {
    pub yhat: Vec<f64>,
    pub yhat_lower: Option<Vec<f64>>,
    pub yhat_upper: Option<Vec<f64>>,
}

impl EnginePrediction {
    /// Number of predicted rows
    pub fn len(&self) -> usize {
        self.yhat.len()
    }

    /// Check if the prediction is empty
    pub fn is_empty(&self) -> bool {
        self.yhat.is_empty()
    }

    /// Lower and upper bounds, when both were produced
    pub fn bounds(&self) -> Option<(&[f64], &[f64])> {
        match (&self.yhat_lower, &self.yhat_upper) {
            (Some(lower), Some(upper)) => Some((lower, upper)),
            _ => None,
        }
    }
}

/// A statistical forecasting engine treated as a black box
pub trait ForecastEngine {
    /// Name used in diagnostic messages
    fn name(&self) -> &str;

    /// Seasonality mode the engine actually uses
    fn seasonality_mode(&self) -> SeasonalityMode;

    /// Fit on a frame with [`ENGINE_TIME_COLUMN`] (epoch milliseconds) and
    /// [`ENGINE_VALUE_COLUMN`]
    fn fit(&mut self, history: &DataFrame) -> Result<()>;

    /// Predict at `timestamps`
    fn predict(&self, timestamps: &[NaiveDateTime]) -> Result<EnginePrediction>;
}

/// Builds a fresh engine for every invocation
pub trait EngineBuilder: Send + Sync {
    type Engine: ForecastEngine;

    fn build(&self, settings: EngineSettings) -> Result<Self::Engine>;
}
