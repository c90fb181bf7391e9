mod common;

use common::{daily, weekly_demand};
use demand_forecast::{
    run_batch, AlgorithmRegistry, BatchRequest, ForecastConfig, ForecastError, GroupInput,
    Observation, RawParameters,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn group(group_id: i64, values: &[f64], horizon: usize) -> GroupInput {
    let all = daily(1, values.len() + horizon);
    let (past, future) = all.split_at(values.len());
    GroupInput {
        group_id,
        history: past
            .iter()
            .zip(values)
            .map(|(timestamp, value)| Observation {
                timestamp: *timestamp,
                value: *value,
            })
            .collect(),
        future: future.to_vec(),
    }
}

fn request(algorithm: &str, historical: usize, horizon: usize, groups: Vec<GroupInput>) -> BatchRequest {
    BatchRequest {
        request_id: 99,
        algorithm: algorithm.to_string(),
        parameters: RawParameters::new(),
        historical_periods: historical,
        forecast_periods: horizon,
        groups,
    }
}

fn registry() -> AlgorithmRegistry {
    AlgorithmRegistry::with_defaults(&ForecastConfig::default()).unwrap()
}

#[test]
fn unknown_algorithm_fails_the_batch() {
    let err = run_batch(&registry(), &request("arima", 3, 1, vec![group(1, &[1.0, 2.0, 3.0], 1)]))
        .unwrap_err();
    assert!(matches!(err, ForecastError::ConfigError(_)));
    assert!(err.to_string().contains("average, prophet"));
}

#[test]
fn one_group_failing_leaves_the_others() {
    let groups = vec![
        group(1, &[10.0, 20.0, 30.0, 40.0], 2),
        group(2, &[5.0, 6.0], 2),
        group(3, &[1.0, 1.0, 1.0, 1.0], 2),
    ];
    let response = run_batch(&registry(), &request("average", 4, 2, groups)).unwrap();

    assert_eq!(response.request_id, 99);
    assert_eq!(response.failures(), 1);
    let ids: Vec<i64> = response.results.iter().map(|r| r.group_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    assert_eq!(response.results[0].forecast(), Some("25;25"));
    assert_eq!(
        response.results[1].err_message(),
        Some(
            "Algorithm average failed to calculate forecast. Error: Data error: \
             Need 4 historical periods but only 2 observations are available"
        )
    );
    assert_eq!(response.results[2].expost(), Some("1;1;1;1"));
}

#[test]
fn training_window_keeps_the_latest_periods() {
    let response = run_batch(
        &registry(),
        &request("average", 2, 1, vec![group(5, &[100.0, 3.0, 5.0], 1)]),
    )
    .unwrap();
    assert_eq!(response.results[0].expost(), Some("4;4"));
    assert_eq!(response.results[0].forecast(), Some("4"));
}

#[test]
fn validation_failure_is_per_group() {
    let mut batch = request(
        "prophet",
        28,
        7,
        vec![group(1, &weekly_demand(28), 7), group(2, &weekly_demand(28), 7)],
    );
    batch
        .parameters
        .insert("seasonality_mode".to_string(), json!("bogus"));

    let response = run_batch(&registry(), &batch).unwrap();
    assert_eq!(response.failures(), 2);
    for result in &response.results {
        assert_eq!(
            result.err_message(),
            Some("Value 'bogus' maintained in forecast model as seasonality_mode must be 'additive' or 'multiplicative'.")
        );
    }
}

#[test]
fn late_future_window_fails_like_an_algorithm_error() {
    let mut overlapping = group(4, &[1.0, 2.0, 3.0], 2);
    overlapping.future = daily(2, 2);

    let response = run_batch(&registry(), &request("prophet", 3, 2, vec![overlapping])).unwrap();
    let message = response.results[0].err_message().unwrap();
    assert!(message.starts_with("Algorithm prophet failed to calculate forecast. Error: Data error: "));
    assert!(message.contains("is not after the last observation"));
}

#[test]
fn request_parses_from_json() {
    let batch: BatchRequest = serde_json::from_value(json!({
        "request_id": 12,
        "algorithm": "prophet",
        "parameters": {"uncertainty_samples": "40"},
        "historical_periods": 21,
        "forecast_periods": 3,
        "groups": [{
            "group_id": 8,
            "history": (0..21)
                .map(|i| json!({
                    "timestamp": format!("2023-03-{:02}", i + 1),
                    "value": 100.0 + i as f64
                }))
                .collect::<Vec<_>>(),
            "future": ["2023-03-22", "2023-03-23T00:00:00", "2023-03-24 00:00:00"]
        }]
    }))
    .unwrap();

    assert_eq!(batch.groups[0].history.len(), 21);
    assert_eq!(batch.groups[0].future.len(), 3);

    let response = run_batch(&registry(), &batch).unwrap();
    let result = &response.results[0];
    assert!(result.is_success(), "{:?}", result.err_message());
    assert_eq!(result.messages().unwrap().len(), 6);

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["results"][0]["group_id"], 8);
    assert!(json["results"][0]["FORECAST"].is_string());
}

#[test]
fn parameters_default_to_empty() {
    let batch: BatchRequest = serde_json::from_str(
        r#"{"request_id": 1, "algorithm": "average", "historical_periods": 0,
            "forecast_periods": 0, "groups": []}"#,
    )
    .unwrap();
    assert!(batch.parameters.is_empty());
    let response = run_batch(&registry(), &batch).unwrap();
    assert!(response.results.is_empty());
}
