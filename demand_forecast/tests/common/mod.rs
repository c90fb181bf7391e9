// Shared fixtures for the integration tests
#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use demand_forecast::{PredictionFrame, TimeSeriesFrame};

pub fn daily(start_day: u32, n: usize) -> Vec<NaiveDateTime> {
    let start = NaiveDate::from_ymd_opt(2023, 1, start_day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n).map(|i| start + Duration::days(i as i64)).collect()
}

/// Training frame of `values` on consecutive days from 2023-01-01 and a
/// prediction window of `horizon` days straight after
pub fn frames(values: &[f64], horizon: usize) -> (TimeSeriesFrame, PredictionFrame) {
    let all = daily(1, values.len() + horizon);
    let (past, future) = all.split_at(values.len());
    (
        TimeSeriesFrame::new(past.to_vec(), values.to_vec()).unwrap(),
        PredictionFrame::new(future.to_vec()).unwrap(),
    )
}

/// Weekly patterned demand with a gentle upward trend
pub fn weekly_demand(n: usize) -> Vec<f64> {
    let pattern = [1.0, 1.3, 0.9, 1.1, 1.0, 0.5, 0.7];
    (0..n)
        .map(|i| (200.0 + i as f64) * pattern[i % 7])
        .collect()
}
