//! Time series frames for one planning group

use crate::error::{ForecastError, Result};
use crate::models::{ENGINE_TIME_COLUMN, ENGINE_VALUE_COLUMN};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Deserializer};

/// Name of the time column in a training frame
pub const TIMESTAMP_COLUMN: &str = "timestamp";
/// Name of the observed value column in a training frame
pub const HISTORY_COLUMN: &str = "HISTORY";

/// A single observed point of a group's history
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Observation {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Training window of one group.
///
/// Backed by a polars frame with a millisecond [`TIMESTAMP_COLUMN`] and a
/// [`HISTORY_COLUMN`] of observed values, in strictly increasing time order.
#[derive(Debug, Clone)]
pub struct TimeSeriesFrame {
    df: DataFrame,
}

/// Future timestamps a forecast is produced for
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionFrame {
    timestamps: Vec<NaiveDateTime>,
}

impl TimeSeriesFrame {
    /// Create a frame from parallel timestamp and value vectors
    pub fn new(timestamps: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DataError(format!(
                "Timestamps length ({}) doesn't match values length ({})",
                timestamps.len(),
                values.len()
            )));
        }
        ensure_increasing(&timestamps, "training window")?;

        let millis: Vec<i64> = timestamps
            .iter()
            .map(|ts| ts.and_utc().timestamp_millis())
            .collect();
        let df = DataFrame::new(vec![
            Series::new(TIMESTAMP_COLUMN, millis),
            Series::new(HISTORY_COLUMN, values),
        ])?;

        Ok(Self { df })
    }

    /// Create a frame from observations already in chronological order
    pub fn from_observations(observations: &[Observation]) -> Result<Self> {
        Self::new(
            observations.iter().map(|o| o.timestamp).collect(),
            observations.iter().map(|o| o.value).collect(),
        )
    }

    /// Wrap an existing DataFrame.
    ///
    /// The frame must carry an `i64` millisecond [`TIMESTAMP_COLUMN`] and a
    /// numeric [`HISTORY_COLUMN`].
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        let frame = Self { df };
        let timestamps = frame.timestamps()?;
        ensure_increasing(&timestamps, "training window")?;
        frame.values()?;
        Ok(frame)
    }

    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check if the frame is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Observed values in time order
    pub fn values(&self) -> Result<Vec<f64>> {
        let col = self.df.column(HISTORY_COLUMN)?.cast(&DataType::Float64)?;
        col.f64()?
            .into_iter()
            .map(|v| {
                v.ok_or_else(|| {
                    ForecastError::DataError(format!("Missing value in column '{}'", HISTORY_COLUMN))
                })
            })
            .collect()
    }

    /// Timestamps in time order
    pub fn timestamps(&self) -> Result<Vec<NaiveDateTime>> {
        let col = self.df.column(TIMESTAMP_COLUMN)?;
        col.i64()?
            .into_iter()
            .map(|ms| {
                ms.and_then(DateTime::<Utc>::from_timestamp_millis)
                    .map(|dt| dt.naive_utc())
                    .ok_or_else(|| {
                        ForecastError::DataError(format!(
                            "Missing or out of range value in column '{}'",
                            TIMESTAMP_COLUMN
                        ))
                    })
            })
            .collect()
    }

    /// Copy of the frame renamed to the engine column contract (`ds`, `y`)
    pub fn to_engine_frame(&self) -> Result<DataFrame> {
        let mut df = self.df.select([TIMESTAMP_COLUMN, HISTORY_COLUMN])?;
        df.rename(TIMESTAMP_COLUMN, ENGINE_TIME_COLUMN)?;
        df.rename(HISTORY_COLUMN, ENGINE_VALUE_COLUMN)?;
        Ok(df)
    }
}

impl PredictionFrame {
    /// Create a prediction window from strictly increasing timestamps
    pub fn new(timestamps: Vec<NaiveDateTime>) -> Result<Self> {
        ensure_increasing(&timestamps, "prediction window")?;
        Ok(Self { timestamps })
    }

    /// Get the timestamps
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// Number of future periods
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the window is empty
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Split a group's series into its training and prediction windows.
///
/// The training window keeps the most recent `historical_periods`
/// observations, the prediction window the first `forecast_periods` of
/// `future`. Both windows must be in order and the prediction window must
/// start after the training window ends.
pub fn split_history(
    observations: &[Observation],
    future: &[NaiveDateTime],
    historical_periods: usize,
    forecast_periods: usize,
) -> Result<(TimeSeriesFrame, PredictionFrame)> {
    if observations.len() < historical_periods {
        return Err(ForecastError::DataError(format!(
            "Need {} historical periods but only {} observations are available",
            historical_periods,
            observations.len()
        )));
    }
    if future.len() < forecast_periods {
        return Err(ForecastError::DataError(format!(
            "Need {} forecast periods but only {} future timestamps are available",
            forecast_periods,
            future.len()
        )));
    }

    let mut sorted = observations.to_vec();
    sorted.sort_by_key(|o| o.timestamp);
    let training = &sorted[sorted.len() - historical_periods..];
    let prediction = &future[..forecast_periods];

    if let (Some(last), Some(first)) = (training.last(), prediction.first()) {
        if first <= &last.timestamp {
            return Err(ForecastError::DataError(format!(
                "Prediction window starts at {} which is not after the last observation {}",
                first, last.timestamp
            )));
        }
    }

    Ok((
        TimeSeriesFrame::from_observations(training)?,
        PredictionFrame::new(prediction.to_vec())?,
    ))
}

/// Parse a timestamp given either as a date (`2023-01-31`) or a date-time
/// (`2023-01-31T12:00:00` or `2023-01-31 12:00:00`)
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ForecastError::DataError(format!("Invalid timestamp: {}", raw)))
}

/// Serde helper for a single timestamp field
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Serde helper for a list of timestamps
pub fn deserialize_timestamps<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    raw.iter()
        .map(|s| parse_timestamp(s).map_err(serde::de::Error::custom))
        .collect()
}

fn ensure_increasing(timestamps: &[NaiveDateTime], window: &str) -> Result<()> {
    if let Some(pair) = timestamps.windows(2).find(|w| w[1] <= w[0]) {
        return Err(ForecastError::DataError(format!(
            "Timestamps of the {} must be strictly increasing ({} is followed by {})",
            window, pair[0], pair[1]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn frame_round_trips_timestamps_and_values() {
        let frame = TimeSeriesFrame::new(vec![day(1), day(2)], vec![1.5, 2.5]).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.timestamps().unwrap(), vec![day(1), day(2)]);
        assert_eq!(frame.values().unwrap(), vec![1.5, 2.5]);
    }

    #[test]
    fn engine_frame_uses_ds_and_y() {
        let frame = TimeSeriesFrame::new(vec![day(1)], vec![3.0]).unwrap();
        let df = frame.to_engine_frame().unwrap();
        let names: Vec<&str> = df.get_column_names();
        assert_eq!(names, vec![ENGINE_TIME_COLUMN, ENGINE_VALUE_COLUMN]);
    }

    #[test]
    fn unordered_timestamps_are_rejected() {
        assert!(TimeSeriesFrame::new(vec![day(2), day(1)], vec![1.0, 2.0]).is_err());
        assert!(PredictionFrame::new(vec![day(3), day(3)]).is_err());
    }

    #[test]
    fn parse_accepts_dates_and_datetimes() {
        assert_eq!(parse_timestamp("2023-01-05").unwrap(), day(5));
        assert_eq!(parse_timestamp("2023-01-05T00:00:00").unwrap(), day(5));
        assert_eq!(parse_timestamp(" 2023-01-05 00:00:00 ").unwrap(), day(5));
        assert!(parse_timestamp("05/01/2023").is_err());
    }
}
