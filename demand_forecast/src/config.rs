//! Configuration for the forecasting engine and diagnostic messages

use crate::error::{ForecastError, Result};
use chrono::format::{Item, StrftimeItems};
use forecast_math::FourierTerm;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Whether a seasonal component is included in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityToggle {
    /// Decided from the span and spacing of the history
    #[default]
    Auto,
    On,
    Off,
}

/// Settings of the bundled seasonal trend engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weekly_seasonality: SeasonalityToggle,
    pub yearly_seasonality: SeasonalityToggle,
    pub weekly_order: usize,
    pub yearly_order: usize,
    /// Coverage of the uncertainty interval, strictly between 0 and 1
    pub interval_width: f64,
    /// Seed for the uncertainty simulation
    pub seed: u64,
    /// Largest number of simulated paths a single prediction may request
    pub max_uncertainty_samples: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weekly_seasonality: SeasonalityToggle::Auto,
            yearly_seasonality: SeasonalityToggle::Auto,
            weekly_order: FourierTerm::WEEKLY.order,
            yearly_order: FourierTerm::YEARLY.order,
            interval_width: 0.8,
            seed: 0,
            max_uncertainty_samples: 100_000,
        }
    }
}

impl EngineConfig {
    pub fn weekly_term(&self) -> FourierTerm {
        FourierTerm {
            period: FourierTerm::WEEKLY.period,
            order: self.weekly_order,
        }
    }

    pub fn yearly_term(&self) -> FourierTerm {
        FourierTerm {
            period: FourierTerm::YEARLY.period,
            order: self.yearly_order,
        }
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<()> {
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::ConfigError(format!(
                "interval_width must be between 0 and 1, got {}",
                self.interval_width
            )));
        }
        if self.weekly_seasonality == SeasonalityToggle::On && self.weekly_order == 0 {
            return Err(ForecastError::ConfigError(
                "weekly_order must be positive when weekly seasonality is on".to_string(),
            ));
        }
        if self.yearly_seasonality == SeasonalityToggle::On && self.yearly_order == 0 {
            return Err(ForecastError::ConfigError(
                "yearly_order must be positive when yearly seasonality is on".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub engine: EngineConfig,
    /// strftime pattern for dates quoted in diagnostic messages
    pub date_format: String,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

impl ForecastConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ForecastConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.date_format.is_empty()
            || StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error))
        {
            return Err(ForecastError::ConfigError(format!(
                "Invalid date format '{}'",
                self.date_format
            )));
        }
        self.engine.validate()
    }
}
