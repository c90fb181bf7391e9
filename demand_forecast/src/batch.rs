//! Sequential driver running one algorithm over many groups

use crate::algorithms::{describe_failure, AlgorithmRegistry, ForecastRequest, ForecastResult};
use crate::data::{deserialize_timestamps, split_history, Observation};
use crate::error::{ForecastError, Result};
use crate::params::RawParameters;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Series of one group as supplied by the data loader
#[derive(Debug, Clone, Deserialize)]
pub struct GroupInput {
    pub group_id: i64,
    /// Observed points, oldest first
    pub history: Vec<Observation>,
    /// Timestamps to forecast
    #[serde(deserialize_with = "deserialize_timestamps")]
    pub future: Vec<NaiveDateTime>,
}

/// A forecast run over many groups with one algorithm
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub request_id: i64,
    pub algorithm: String,
    #[serde(default)]
    pub parameters: RawParameters,
    pub historical_periods: usize,
    pub forecast_periods: usize,
    pub groups: Vec<GroupInput>,
}

/// One result per input group, in input order
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub request_id: i64,
    pub algorithm: String,
    pub results: Vec<ForecastResult>,
}

impl BatchResponse {
    /// Number of groups that failed
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }
}

/// Run the requested algorithm for every group.
///
/// An unknown algorithm aborts the whole batch. Anything that goes wrong
/// with a single group, including splitting its series, only fails that
/// group's result, with the same message format as
/// [`ForecastAlgorithm::execute`](crate::ForecastAlgorithm::execute).
pub fn run_batch(registry: &AlgorithmRegistry, request: &BatchRequest) -> Result<BatchResponse> {
    let algorithm = registry.get(&request.algorithm).ok_or_else(|| {
        ForecastError::ConfigError(format!(
            "Unknown algorithm '{}', expected one of: {}",
            request.algorithm,
            registry.names().join(", ")
        ))
    })?;

    let results: Vec<ForecastResult> = request
        .groups
        .iter()
        .map(|group| {
            match split_history(
                &group.history,
                &group.future,
                request.historical_periods,
                request.forecast_periods,
            ) {
                Ok((training, prediction)) => algorithm.execute(&ForecastRequest {
                    training: &training,
                    prediction: &prediction,
                    parameters: &request.parameters,
                    historical_periods: request.historical_periods,
                    forecast_periods: request.forecast_periods,
                    group_id: group.group_id,
                    request_id: request.request_id,
                    algorithm_name: &request.algorithm,
                }),
                Err(e) => {
                    let message = describe_failure(&request.algorithm, &e);
                    warn!(
                        request_id = request.request_id,
                        group_id = group.group_id,
                        "FAILED: {}",
                        message
                    );
                    ForecastResult::failure(group.group_id, message)
                }
            }
        })
        .collect();

    let response = BatchResponse {
        request_id: request.request_id,
        algorithm: request.algorithm.clone(),
        results,
    };
    info!(
        request_id = request.request_id,
        algorithm = %request.algorithm,
        groups = response.results.len(),
        failures = response.failures(),
        "batch finished"
    );
    Ok(response)
}
