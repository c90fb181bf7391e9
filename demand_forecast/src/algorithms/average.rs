//! Constant forecast at the mean of the training window

use crate::algorithms::{Forecast, ForecastAlgorithm, ForecastRequest};
use crate::error::Result;
use forecast_math::{mean, sample_std_dev};
use std::time::Instant;
use tracing::debug;

/// Baseline algorithm: expost and forecast are both the training mean
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageForecast;

impl ForecastAlgorithm for AverageForecast {
    fn run(&self, request: &ForecastRequest<'_>) -> Result<Forecast> {
        request.check_windows()?;
        let start = Instant::now();

        let values = request.training.values()?;
        let mean_value = mean(&values)?;
        let std_dev = sample_std_dev(&values)?;

        let expost = vec![mean_value; request.historical_periods];
        let forecast = vec![mean_value; request.forecast_periods];
        let elapsed = start.elapsed().as_secs_f64();

        debug!(
            group_id = request.group_id,
            mean = mean_value,
            std_dev,
            "average forecast computed"
        );

        Ok(Forecast {
            expost,
            forecast,
            messages: vec![
                format!(
                    "Forecast and Expost were set to the average of the timeseries after {} seconds.",
                    elapsed
                ),
                format!(
                    "Timeseries showed a mean of {} and standard deviation of {}.",
                    mean_value, std_dev
                ),
            ],
        })
    }
}
