use demand_forecast::{AlgorithmRegistry, EngineConfig, ForecastConfig, ForecastError, SeasonalityToggle};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_file_and_fills_defaults() {
    let file = config_file(
        r#"{
            "engine": {"weekly_seasonality": "off", "seed": 11},
            "date_format": "%d.%m.%Y"
        }"#,
    );
    let config = ForecastConfig::from_json_file(file.path()).unwrap();

    assert_eq!(config.date_format, "%d.%m.%Y");
    assert_eq!(
        config.engine,
        EngineConfig {
            weekly_seasonality: SeasonalityToggle::Off,
            seed: 11,
            ..EngineConfig::default()
        }
    );
}

#[test]
fn empty_object_is_default() {
    let file = config_file("{}");
    assert_eq!(
        ForecastConfig::from_json_file(file.path()).unwrap(),
        ForecastConfig::default()
    );
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ForecastConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ForecastError::IoError(_)));
}

#[test]
fn malformed_json_is_json_error() {
    let file = config_file("{\"engine\": ");
    let err = ForecastConfig::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, ForecastError::JsonError(_)));
}

#[test]
fn invalid_settings_are_config_errors() {
    for json in [
        r#"{"engine": {"interval_width": 0.0}}"#,
        r#"{"engine": {"yearly_seasonality": "on", "yearly_order": 0}}"#,
        r#"{"date_format": ""}"#,
        r#"{"date_format": "%Q"}"#,
    ] {
        let err = ForecastConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ForecastError::ConfigError(_)), "{} gave {}", json, err);
    }
}

#[test]
fn registry_rejects_invalid_config() {
    let config = ForecastConfig {
        date_format: String::new(),
        ..ForecastConfig::default()
    };
    assert!(AlgorithmRegistry::with_defaults(&config).is_err());
}
