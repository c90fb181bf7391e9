//! Linear trend plus Fourier seasonality engine

use crate::config::{EngineConfig, SeasonalityToggle};
use crate::error::{ForecastError, Result};
use crate::models::{
    EngineBuilder, EnginePrediction, EngineSettings, ForecastEngine, SeasonalityMode,
    ENGINE_TIME_COLUMN, ENGINE_VALUE_COLUMN,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use forecast_math::{fit_linear_trend, fourier_series, quantile, solve_least_squares};
use forecast_math::{FourierTerm, LinearTrend};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Trend-and-seasonality forecasting engine.
///
/// The trend is a straight line in time scaled to `[0, 1]` over the history.
/// Weekly and yearly Fourier terms model seasonality, either added to the
/// trend or scaling it. Uncertainty intervals are simulated from the
/// residual spread with observation noise and trend slope drift past the end
/// of the history.
#[derive(Debug, Clone)]
pub struct SeasonalTrendModel {
    config: EngineConfig,
    settings: EngineSettings,
    fitted: Option<FittedState>,
}

#[derive(Debug, Clone)]
struct FittedState {
    origin: NaiveDateTime,
    span_seconds: f64,
    terms: Vec<FourierTerm>,
    trend: LinearTrend,
    seasonal_beta: Vec<f64>,
    sigma: f64,
}

impl SeasonalTrendModel {
    /// Create an unfitted engine
    pub fn new(config: EngineConfig, settings: EngineSettings) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            settings,
            fitted: None,
        })
    }

    fn select_terms(&self, timestamps: &[NaiveDateTime], span_days: f64) -> Vec<FourierTerm> {
        let min_spacing_days = timestamps
            .windows(2)
            .map(|w| (w[1] - w[0]).num_seconds() as f64 / SECONDS_PER_DAY)
            .fold(f64::INFINITY, f64::min);

        let weekly = match self.config.weekly_seasonality {
            SeasonalityToggle::Auto => span_days >= 14.0 && min_spacing_days < 7.0,
            SeasonalityToggle::On => true,
            SeasonalityToggle::Off => false,
        };
        let yearly = match self.config.yearly_seasonality {
            SeasonalityToggle::Auto => span_days >= 730.0,
            SeasonalityToggle::On => true,
            SeasonalityToggle::Off => false,
        };

        // Terms are dropped once the design would have as many columns as rows
        let mut terms = Vec::new();
        let mut columns = 2;
        for (enabled, term) in [
            (yearly, self.config.yearly_term()),
            (weekly, self.config.weekly_term()),
        ] {
            if enabled && term.order > 0 && columns + term.width() < timestamps.len() {
                columns += term.width();
                terms.push(term);
            }
        }
        terms
    }
}

impl FittedState {
    fn scaled_time(&self, ts: &NaiveDateTime) -> f64 {
        (*ts - self.origin).num_milliseconds() as f64 / 1000.0 / self.span_seconds
    }

    fn days(&self, ts: &NaiveDateTime) -> f64 {
        (*ts - self.origin).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
    }

    fn seasonal_rows(&self, timestamps: &[NaiveDateTime]) -> Vec<Vec<f64>> {
        let t_days: Vec<f64> = timestamps.iter().map(|ts| self.days(ts)).collect();
        let mut rows = vec![Vec::new(); timestamps.len()];
        for term in &self.terms {
            for (row, features) in rows.iter_mut().zip(fourier_series(&t_days, *term)) {
                row.extend(features);
            }
        }
        rows
    }

    fn point_estimates(&self, timestamps: &[NaiveDateTime], mode: SeasonalityMode) -> Vec<f64> {
        self.seasonal_rows(timestamps)
            .iter()
            .zip(timestamps)
            .map(|(row, ts)| {
                let trend = self.trend.at(self.scaled_time(ts));
                let seasonal: f64 = row.iter().zip(&self.seasonal_beta).map(|(x, b)| x * b).sum();
                match mode {
                    SeasonalityMode::Additive => trend + seasonal,
                    SeasonalityMode::Multiplicative => trend * (1.0 + seasonal),
                }
            })
            .collect()
    }
}

impl ForecastEngine for SeasonalTrendModel {
    fn name(&self) -> &str {
        "SeasonalTrend"
    }

    fn seasonality_mode(&self) -> SeasonalityMode {
        self.settings.seasonality_mode
    }

    fn fit(&mut self, history: &DataFrame) -> Result<()> {
        let timestamps: Vec<NaiveDateTime> = history
            .column(ENGINE_TIME_COLUMN)?
            .i64()?
            .into_iter()
            .map(|ms| {
                ms.and_then(DateTime::<Utc>::from_timestamp_millis)
                    .map(|dt| dt.naive_utc())
                    .ok_or_else(|| ForecastError::DataError("Invalid timestamp in history".to_string()))
            })
            .collect::<Result<_>>()?;
        let y: Vec<f64> = history
            .column(ENGINE_VALUE_COLUMN)?
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.ok_or_else(|| ForecastError::DataError("Missing value in history".to_string())))
            .collect::<Result<_>>()?;

        if y.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ComputationError(
                "History contains non-finite values".to_string(),
            ));
        }
        if y.len() < 2 {
            return Err(ForecastError::ComputationError(format!(
                "SeasonalTrend needs at least two observations, got {}",
                y.len()
            )));
        }

        let origin = timestamps[0];
        let span_seconds = (timestamps[timestamps.len() - 1] - origin).num_milliseconds() as f64 / 1000.0;
        if span_seconds <= 0.0 {
            return Err(ForecastError::ComputationError(
                "History must span a positive amount of time".to_string(),
            ));
        }

        let terms = self.select_terms(&timestamps, span_seconds / SECONDS_PER_DAY);
        let mut state = FittedState {
            origin,
            span_seconds,
            terms,
            trend: LinearTrend {
                intercept: 0.0,
                slope: 0.0,
            },
            seasonal_beta: Vec::new(),
            sigma: 0.0,
        };

        let t: Vec<f64> = timestamps.iter().map(|ts| state.scaled_time(ts)).collect();
        let seasonal_rows = state.seasonal_rows(&timestamps);

        match self.settings.seasonality_mode {
            SeasonalityMode::Additive => {
                let rows: Vec<Vec<f64>> = t
                    .iter()
                    .zip(&seasonal_rows)
                    .map(|(ti, s)| {
                        let mut row = vec![1.0, *ti];
                        row.extend_from_slice(s);
                        row
                    })
                    .collect();
                let beta = solve_least_squares(&rows, &y)?;
                state.trend = LinearTrend {
                    intercept: beta[0],
                    slope: beta[1],
                };
                state.seasonal_beta = beta[2..].to_vec();
            }
            SeasonalityMode::Multiplicative => {
                state.trend = fit_linear_trend(&t, &y)?;
                let trend: Vec<f64> = t.iter().map(|ti| state.trend.at(*ti)).collect();
                if trend.iter().any(|v| v.abs() < 1e-9) {
                    return Err(ForecastError::ComputationError(
                        "Multiplicative seasonality needs a trend that stays away from zero"
                            .to_string(),
                    ));
                }
                if !state.terms.is_empty() {
                    let ratio: Vec<f64> = y.iter().zip(&trend).map(|(v, tr)| v / tr - 1.0).collect();
                    state.seasonal_beta = solve_least_squares(&seasonal_rows, &ratio)?;
                }
            }
        }

        let fitted = state.point_estimates(&timestamps, self.settings.seasonality_mode);
        let sse: f64 = y.iter().zip(&fitted).map(|(a, f)| (a - f).powi(2)).sum();
        state.sigma = (sse / y.len() as f64).sqrt();

        debug!(
            observations = y.len(),
            seasonal_terms = state.terms.len(),
            sigma = state.sigma,
            "SeasonalTrend fitted"
        );

        self.fitted = Some(state);
        Ok(())
    }

    fn predict(&self, timestamps: &[NaiveDateTime]) -> Result<EnginePrediction> {
        let state = self.fitted.as_ref().ok_or_else(|| {
            ForecastError::ComputationError("Model must be fitted before prediction".to_string())
        })?;

        let yhat = state.point_estimates(timestamps, self.settings.seasonality_mode);
        if self.settings.uncertainty_samples == 0 {
            return Ok(EnginePrediction {
                yhat,
                yhat_lower: None,
                yhat_upper: None,
            });
        }

        let requested = self.settings.uncertainty_samples;
        if requested > self.config.max_uncertainty_samples {
            return Err(ForecastError::ComputationError(format!(
                "{} uncertainty samples requested but at most {} are allowed",
                requested, self.config.max_uncertainty_samples
            )));
        }
        let samples = requested as usize;

        let noise = Normal::new(0.0, state.sigma)
            .map_err(|e| ForecastError::ComputationError(format!("Invalid noise scale: {}", e)))?;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        // One slope drift per simulated path, shared by every timestamp
        let mut drifts = sample_buffer(samples)?;
        drifts.extend((0..samples).map(|_| noise.sample(&mut rng)));

        let lower_tau = (1.0 - self.config.interval_width) / 2.0;
        let upper_tau = (1.0 + self.config.interval_width) / 2.0;
        let mut draws = sample_buffer(samples)?;
        let mut yhat_lower = Vec::with_capacity(timestamps.len());
        let mut yhat_upper = Vec::with_capacity(timestamps.len());
        for (point, ts) in yhat.iter().zip(timestamps) {
            let horizon = (state.scaled_time(ts) - 1.0).max(0.0);
            draws.clear();
            draws.extend(
                drifts
                    .iter()
                    .map(|drift| point + drift * horizon + noise.sample(&mut rng)),
            );
            yhat_lower.push(quantile(&draws, lower_tau)?);
            yhat_upper.push(quantile(&draws, upper_tau)?);
        }

        Ok(EnginePrediction {
            yhat,
            yhat_lower: Some(yhat_lower),
            yhat_upper: Some(yhat_upper),
        })
    }
}

fn sample_buffer(samples: usize) -> Result<Vec<f64>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(samples).map_err(|e| {
        ForecastError::ComputationError(format!(
            "Cannot allocate {} uncertainty samples: {}",
            samples, e
        ))
    })?;
    Ok(buffer)
}

/// Builds [`SeasonalTrendModel`]s sharing one configuration
#[derive(Debug, Clone, Default)]
pub struct SeasonalTrendBuilder {
    config: EngineConfig,
}

impl SeasonalTrendBuilder {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl EngineBuilder for SeasonalTrendBuilder {
    type Engine = SeasonalTrendModel;

    fn build(&self, settings: EngineSettings) -> Result<Self::Engine> {
        SeasonalTrendModel::new(self.config.clone(), settings)
    }
}
