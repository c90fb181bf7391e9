//! # Demand Forecast
//!
//! Execution contract for pluggable time series forecasting algorithms run
//! per planning group.
//!
//! ## Features
//!
//! - A uniform algorithm contract ([`ForecastAlgorithm`]) whose `execute`
//!   never fails: one group's error never aborts a batch
//! - Declarative parameter schemas with defaults and domain checks
//! - `;`-delimited encoding of expost and forecast sequences
//! - A baseline average algorithm and a trend/seasonality algorithm backed by
//!   a swappable engine
//!
//! ## Quick Start
//!
//! ```rust
//! use demand_forecast::{AverageForecast, ForecastAlgorithm, ForecastRequest};
//! use demand_forecast::{PredictionFrame, RawParameters, TimeSeriesFrame};
//! use chrono::NaiveDate;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2023, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let training = TimeSeriesFrame::new(vec![day(1), day(2), day(3)], vec![10.0, 20.0, 30.0])?;
//! let prediction = PredictionFrame::new(vec![day(4), day(5)])?;
//! let parameters = RawParameters::new();
//!
//! let result = AverageForecast.execute(&ForecastRequest {
//!     training: &training,
//!     prediction: &prediction,
//!     parameters: &parameters,
//!     historical_periods: 3,
//!     forecast_periods: 2,
//!     group_id: 1,
//!     request_id: 1,
//!     algorithm_name: "average",
//! });
//!
//! assert_eq!(result.expost(), Some("20;20;20"));
//! assert_eq!(result.forecast(), Some("20;20"));
//! # Ok::<(), demand_forecast::ForecastError>(())
//! ```

pub mod algorithms;
pub mod batch;
pub mod config;
pub mod data;
pub mod encoding;
pub mod error;
pub mod models;
pub mod params;

// Re-export commonly used types
pub use crate::algorithms::{
    log_panics_with_tracing, AlgorithmRegistry, AverageForecast, Forecast, ForecastAlgorithm,
    ForecastRequest, ForecastResult, Outcome, SeasonalForecast,
};
pub use crate::batch::{run_batch, BatchRequest, BatchResponse, GroupInput};
pub use crate::config::{EngineConfig, ForecastConfig, SeasonalityToggle};
pub use crate::data::{split_history, Observation, PredictionFrame, TimeSeriesFrame};
pub use crate::encoding::{decode, encode};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{
    EngineBuilder, EnginePrediction, EngineSettings, ForecastEngine, SeasonalTrendModel,
    SeasonalityMode,
};
pub use crate::params::{resolve, ParamSpec, RawParameters, ResolvedParameters, SeasonalParams};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
