//! Algorithm execution contract.
//!
//! Every forecasting algorithm receives a [`ForecastRequest`] for one group
//! and returns a [`ForecastResult`]. Algorithms implement the fallible
//! [`ForecastAlgorithm::run`]; callers use [`ForecastAlgorithm::execute`],
//! which never fails: errors and panics are turned into a failure outcome
//! that still carries the group id.

use crate::data::{PredictionFrame, TimeSeriesFrame};
use crate::encoding::encode;
use crate::error::{ForecastError, Result};
use crate::params::RawParameters;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

pub mod average;
pub mod seasonal;

pub use average::AverageForecast;
pub use seasonal::SeasonalForecast;

/// Input of one algorithm invocation for one group
#[derive(Debug, Clone, Copy)]
pub struct ForecastRequest<'a> {
    pub training: &'a TimeSeriesFrame,
    pub prediction: &'a PredictionFrame,
    pub parameters: &'a RawParameters,
    pub historical_periods: usize,
    pub forecast_periods: usize,
    pub group_id: i64,
    pub request_id: i64,
    /// Used for labelling only
    pub algorithm_name: &'a str,
}

impl ForecastRequest<'_> {
    /// Check the windows hold exactly the declared number of periods
    pub fn check_windows(&self) -> Result<()> {
        if self.training.len() != self.historical_periods {
            return Err(ForecastError::DataError(format!(
                "Training window has {} rows but historical_periods is {}",
                self.training.len(),
                self.historical_periods
            )));
        }
        if self.prediction.len() != self.forecast_periods {
            return Err(ForecastError::DataError(format!(
                "Prediction window has {} rows but forecast_periods is {}",
                self.prediction.len(),
                self.forecast_periods
            )));
        }
        Ok(())
    }
}

/// Successful output of [`ForecastAlgorithm::run`] before encoding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    /// In-sample fit over the training window
    pub expost: Vec<f64>,
    /// Out-of-sample prediction over the prediction window
    pub forecast: Vec<f64>,
    pub messages: Vec<String>,
}

/// Outcome of one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    Success {
        #[serde(rename = "EXPOST")]
        expost: String,
        #[serde(rename = "FORECAST")]
        forecast: String,
        messages: Vec<String>,
    },
    Failure {
        err_message: String,
    },
}

/// Uniform result record for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub group_id: i64,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ForecastResult {
    /// Build a failure record
    pub fn failure(group_id: i64, err_message: impl Into<String>) -> Self {
        Self {
            group_id,
            outcome: Outcome::Failure {
                err_message: err_message.into(),
            },
        }
    }

    /// Build a success record by encoding both sequences
    pub fn success(group_id: i64, forecast: Forecast) -> Self {
        Self {
            group_id,
            outcome: Outcome::Success {
                expost: encode(&forecast.expost),
                forecast: encode(&forecast.forecast),
                messages: forecast.messages,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Encoded expost values, on success
    pub fn expost(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { expost, .. } => Some(expost),
            Outcome::Failure { .. } => None,
        }
    }

    /// Encoded forecast values, on success
    pub fn forecast(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { forecast, .. } => Some(forecast),
            Outcome::Failure { .. } => None,
        }
    }

    /// Diagnostic messages, on success
    pub fn messages(&self) -> Option<&[String]> {
        match &self.outcome {
            Outcome::Success { messages, .. } => Some(messages),
            Outcome::Failure { .. } => None,
        }
    }

    /// Failure description, on failure
    pub fn err_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failure { err_message } => Some(err_message),
            Outcome::Success { .. } => None,
        }
    }

    /// Serialize to the JSON wire shape
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A pluggable forecasting algorithm
pub trait ForecastAlgorithm: Send + Sync {
    /// Produce expost and forecast values for one group
    fn run(&self, request: &ForecastRequest<'_>) -> Result<Forecast>;

    /// Run the algorithm and fold any failure into the result.
    ///
    /// Validation errors are reported with their own message; every other
    /// error or panic is reported together with the algorithm name.
    ///
    /// A caught panic still passes through the process panic hook first. The
    /// default hook prints it to stderr; call [`log_panics_with_tracing`] to
    /// send it to the `tracing` subscriber instead.
    fn execute(&self, request: &ForecastRequest<'_>) -> ForecastResult {
        let group_id = request.group_id;
        let name = request.algorithm_name;

        let run = panic::catch_unwind(AssertUnwindSafe(|| self.run(request)));
        let result = match run {
            Ok(Ok(forecast)) => match check_lengths(request, &forecast) {
                Ok(()) => ForecastResult::success(group_id, forecast),
                Err(e) => ForecastResult::failure(group_id, describe_failure(name, &e)),
            },
            Ok(Err(e)) => ForecastResult::failure(group_id, describe_failure(name, &e)),
            Err(payload) => ForecastResult::failure(
                group_id,
                format!(
                    "Algorithm {} failed to calculate forecast. Error: {}",
                    name,
                    panic_message(payload.as_ref())
                ),
            ),
        };

        match result.err_message() {
            None => debug!(
                request_id = request.request_id,
                group_id,
                algorithm = name,
                "RESULT_BUILT"
            ),
            Some(message) => warn!(
                request_id = request.request_id,
                group_id,
                algorithm = name,
                "FAILED: {}",
                message
            ),
        }
        result
    }
}

fn check_lengths(request: &ForecastRequest<'_>, forecast: &Forecast) -> Result<()> {
    if forecast.expost.len() != request.historical_periods
        || forecast.forecast.len() != request.forecast_periods
    {
        return Err(ForecastError::ComputationError(format!(
            "Produced {} expost and {} forecast values, expected {} and {}",
            forecast.expost.len(),
            forecast.forecast.len(),
            request.historical_periods,
            request.forecast_periods
        )));
    }
    Ok(())
}

pub(crate) fn describe_failure(algorithm_name: &str, error: &ForecastError) -> String {
    match error {
        ForecastError::ValidationError(message) => message.clone(),
        other => format!(
            "Algorithm {} failed to calculate forecast. Error: {}",
            algorithm_name, other
        ),
    }
}

/// Install a panic hook that reports panics as `tracing` events.
///
/// The failure itself is still returned as an `err_message` by
/// [`ForecastAlgorithm::execute`]; the hook only records where it happened.
pub fn log_panics_with_tracing() {
    panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        debug!(location = %location, "PANIC_CAUGHT: {}", panic_message(info.payload()));
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Algorithms available by name
#[derive(Default)]
pub struct AlgorithmRegistry {
    algorithms: BTreeMap<String, Box<dyn ForecastAlgorithm>>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `average` and `prophet` using the given configuration
    pub fn with_defaults(config: &crate::config::ForecastConfig) -> Result<Self> {
        let mut registry = Self::new();
        registry.register("average", AverageForecast);
        registry.register("prophet", SeasonalForecast::with_config(config)?);
        Ok(registry)
    }

    /// Register an algorithm, replacing any previous one of the same name
    pub fn register<A: ForecastAlgorithm + 'static>(&mut self, name: &str, algorithm: A) {
        self.algorithms.insert(name.to_string(), Box::new(algorithm));
    }

    /// Look up an algorithm by name
    pub fn get(&self, name: &str) -> Option<&dyn ForecastAlgorithm> {
        self.algorithms.get(name).map(|a| a.as_ref())
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.algorithms.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Exploding;

    impl ForecastAlgorithm for Exploding {
        fn run(&self, _request: &ForecastRequest<'_>) -> Result<Forecast> {
            panic!("numerical blow-up")
        }
    }

    struct WrongLength;

    impl ForecastAlgorithm for WrongLength {
        fn run(&self, _request: &ForecastRequest<'_>) -> Result<Forecast> {
            Ok(Forecast {
                expost: vec![1.0],
                forecast: vec![],
                messages: vec![],
            })
        }
    }

    fn request<'a>(
        training: &'a TimeSeriesFrame,
        prediction: &'a PredictionFrame,
        parameters: &'a RawParameters,
    ) -> ForecastRequest<'a> {
        ForecastRequest {
            training,
            prediction,
            parameters,
            historical_periods: 0,
            forecast_periods: 0,
            group_id: 17,
            request_id: 1,
            algorithm_name: "test",
        }
    }

    #[test]
    fn panics_become_failures() {
        let training = TimeSeriesFrame::new(vec![], vec![]).unwrap();
        let prediction = PredictionFrame::default();
        let parameters = RawParameters::new();

        let result = Exploding.execute(&request(&training, &prediction, &parameters));
        assert_eq!(result.group_id, 17);
        assert_eq!(
            result.err_message(),
            Some("Algorithm test failed to calculate forecast. Error: numerical blow-up")
        );
    }

    #[test]
    fn wrong_lengths_become_failures() {
        let training = TimeSeriesFrame::new(vec![], vec![]).unwrap();
        let prediction = PredictionFrame::default();
        let parameters = RawParameters::new();

        let result = WrongLength.execute(&request(&training, &prediction, &parameters));
        assert!(!result.is_success());
        assert!(result.err_message().unwrap().contains("expected 0 and 0"));
    }

    #[test]
    fn wire_shape_omits_unused_keys() {
        let ok = ForecastResult::success(
            3,
            Forecast {
                expost: vec![1.0, 2.0],
                forecast: vec![3.5],
                messages: vec!["done".to_string()],
            },
        );
        assert_eq!(
            ok.to_json().unwrap(),
            r#"{"group_id":3,"EXPOST":"1;2","FORECAST":"3.5","messages":["done"]}"#
        );

        let failed = ForecastResult::failure(4, "boom");
        assert_eq!(
            failed.to_json().unwrap(),
            r#"{"group_id":4,"err_message":"boom"}"#
        );

        let back: ForecastResult = serde_json::from_str(&ok.to_json().unwrap()).unwrap();
        assert_eq!(back, ok);
    }

    #[test]
    fn registry_lists_defaults() {
        let registry = AlgorithmRegistry::with_defaults(&Default::default()).unwrap();
        assert_eq!(registry.names(), vec!["average", "prophet"]);
        assert!(registry.get("arima").is_none());
    }
}
