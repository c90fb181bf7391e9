//! Forecast delegated to a trend and seasonality engine

use crate::algorithms::{Forecast, ForecastAlgorithm, ForecastRequest};
use crate::config::ForecastConfig;
use crate::error::{ForecastError, Result};
use crate::models::{EngineBuilder, ForecastEngine, SeasonalTrendBuilder};
use crate::params::SeasonalParams;
use chrono::NaiveDateTime;
use forecast_math::mean_interval_width;
use std::time::Instant;
use tracing::debug;

/// Fits an engine on the training window and predicts over the training and
/// prediction timestamps together, so expost is the in-sample fit and
/// forecast is out of sample.
///
/// Recognised parameters are `seasonality_mode` (`additive` or
/// `multiplicative`, default `additive`) and `uncertainty_samples` (a
/// non-negative integer, default 0 which skips interval estimation).
#[derive(Debug, Clone)]
pub struct SeasonalForecast<B: EngineBuilder = SeasonalTrendBuilder> {
    builder: B,
    date_format: String,
}

impl SeasonalForecast<SeasonalTrendBuilder> {
    /// Use the bundled engine configured from `config`
    pub fn with_config(config: &ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            builder: SeasonalTrendBuilder::new(config.engine.clone())?,
            date_format: config.date_format.clone(),
        })
    }
}

impl<B: EngineBuilder> SeasonalForecast<B> {
    /// Use a custom engine builder, quoting dates as `date_format`
    pub fn new(builder: B, date_format: impl Into<String>) -> Self {
        Self {
            builder,
            date_format: date_format.into(),
        }
    }

    fn date_range(&self, timestamps: &[NaiveDateTime]) -> String {
        match (timestamps.first(), timestamps.last()) {
            (Some(first), Some(last)) => format!(
                "{}, ..., {}",
                first.format(&self.date_format),
                last.format(&self.date_format)
            ),
            _ => "none".to_string(),
        }
    }
}

impl<B: EngineBuilder> ForecastAlgorithm for SeasonalForecast<B> {
    fn run(&self, request: &ForecastRequest<'_>) -> Result<Forecast> {
        let params = SeasonalParams::from_raw(request.parameters)?;
        debug!(
            group_id = request.group_id,
            mode = %params.seasonality_mode,
            uncertainty_samples = params.uncertainty_samples,
            "PARAMETERS_VALIDATED"
        );

        request.check_windows()?;
        let history = request.training.to_engine_frame()?;
        let mut timestamps = request.training.timestamps()?;
        timestamps.extend_from_slice(request.prediction.timestamps());

        let start = Instant::now();
        let mut engine = self.builder.build(params.engine_settings())?;
        engine.fit(&history)?;
        let fit_seconds = start.elapsed().as_secs_f64();
        debug!(group_id = request.group_id, fit_seconds, "MODEL_FIT");

        let prediction = engine.predict(&timestamps)?;
        let total_seconds = start.elapsed().as_secs_f64();
        debug!(group_id = request.group_id, total_seconds, "PREDICTED");

        if prediction.len() != timestamps.len() {
            return Err(ForecastError::ComputationError(format!(
                "{} returned {} predictions for {} timestamps",
                engine.name(),
                prediction.len(),
                timestamps.len()
            )));
        }

        let split = request.historical_periods;
        let mut messages = Vec::new();

        if params.uncertainty_samples > 0 {
            let (lower, upper) = prediction.bounds().ok_or_else(|| {
                ForecastError::ComputationError(format!(
                    "{} returned no uncertainty bounds",
                    engine.name()
                ))
            })?;
            if lower.len() != timestamps.len() || upper.len() != timestamps.len() {
                return Err(ForecastError::ComputationError(format!(
                    "{} returned uncertainty bounds of the wrong length",
                    engine.name()
                )));
            }
            let expost_range = mean_interval_width(&lower[..split], &upper[..split])?;
            let forecast_range = mean_interval_width(&lower[split..], &upper[split..])?;
            messages.push(format!("Average uncertainty range of Expost: {}.", expost_range));
            messages.push(format!("Average uncertainty range of Forecast: {}.", forecast_range));
        }

        let (expost_dates, forecast_dates) = timestamps.split_at(split);
        messages.push(format!("Dates of expost: {}.", self.date_range(expost_dates)));
        messages.push(format!("Dates of forecast: {}.", self.date_range(forecast_dates)));
        messages.push(format!(
            "{} used seasonality mode '{}'.",
            engine.name(),
            engine.seasonality_mode()
        ));
        messages.push(format!(
            "Runtime for {}: {:.4} seconds (Training: {:.4}, Prediction: {:.4}).",
            engine.name(),
            total_seconds,
            fit_seconds,
            total_seconds - fit_seconds
        ));

        let (expost, forecast) = prediction.yhat.split_at(split);
        Ok(Forecast {
            expost: expost.to_vec(),
            forecast: forecast.to_vec(),
            messages,
        })
    }
}
