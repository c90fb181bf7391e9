//! Parameter resolution.
//!
//! Callers pass loosely typed parameters as a JSON object. Every algorithm
//! declares a schema of the names it recognises, each with a default and a
//! domain. [`resolve`] applies defaults, checks every supplied value against
//! its domain and yields either typed values or a validation error before any
//! model is touched. Names outside the schema are ignored.

use crate::error::{ForecastError, Result};
use crate::models::{EngineSettings, SeasonalityMode};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Raw parameters as supplied by the caller
pub type RawParameters = Map<String, Value>;

/// Set of values a parameter may take
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Domain {
    /// One of the listed string literals
    OneOf(&'static [&'static str]),
    /// Anything that coerces to an integer within the optional bounds
    Integer { min: Option<i64>, max: Option<i64> },
}

/// Default applied when a parameter is absent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    Text(&'static str),
    Integer(i64),
}

/// Declaration of one recognised parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: ParamDefault,
    pub domain: Domain,
}

/// A resolved parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
}

impl From<ParamDefault> for ParamValue {
    fn from(default: ParamDefault) -> Self {
        match default {
            ParamDefault::Text(s) => ParamValue::Text(s.to_string()),
            ParamDefault::Integer(i) => ParamValue::Integer(i),
        }
    }
}

/// Parameters after defaults and domain checks
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedParameters {
    values: BTreeMap<&'static str, ParamValue>,
}

impl ResolvedParameters {
    /// Get a resolved value by name
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Get a resolved text value
    pub fn text(&self, name: &str) -> Result<&str> {
        match self.values.get(name) {
            Some(ParamValue::Text(s)) => Ok(s),
            _ => Err(ForecastError::ConfigError(format!(
                "Parameter '{}' is not a declared text parameter",
                name
            ))),
        }
    }

    /// Get a resolved integer value
    pub fn integer(&self, name: &str) -> Result<i64> {
        match self.values.get(name) {
            Some(ParamValue::Integer(i)) => Ok(*i),
            _ => Err(ForecastError::ConfigError(format!(
                "Parameter '{}' is not a declared integer parameter",
                name
            ))),
        }
    }

    /// Number of resolved parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing was resolved
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Apply defaults and validate `raw` against `schema`.
///
/// Parameters are checked in schema order and independently of each other;
/// the first failure is returned.
pub fn resolve(raw: &RawParameters, schema: &[ParamSpec]) -> Result<ResolvedParameters> {
    let mut values = BTreeMap::new();
    for spec in schema {
        let value = match raw.get(spec.name) {
            None => spec.default.into(),
            Some(supplied) => check_domain(spec, supplied)?,
        };
        values.insert(spec.name, value);
    }
    Ok(ResolvedParameters { values })
}

fn check_domain(spec: &ParamSpec, supplied: &Value) -> Result<ParamValue> {
    match spec.domain {
        Domain::OneOf(choices) => match supplied {
            Value::String(s) if choices.contains(&s.as_str()) => Ok(ParamValue::Text(s.clone())),
            _ => Err(ForecastError::ValidationError(format!(
                "Value '{}' maintained in forecast model as {} must be {}.",
                render(supplied),
                spec.name,
                list_choices(choices)
            ))),
        },
        Domain::Integer { min, max } => {
            let value = coerce_integer(supplied).ok_or_else(|| {
                ForecastError::ValidationError(format!(
                    "Value '{}' maintained in forecast model as {} must be integer.",
                    render(supplied),
                    spec.name
                ))
            })?;
            if let Some(min) = min.filter(|m| value < *m) {
                return Err(ForecastError::ValidationError(format!(
                    "Value '{}' maintained in forecast model as {} must be at least {}.",
                    render(supplied),
                    spec.name,
                    min
                )));
            }
            if let Some(max) = max.filter(|m| value > *m) {
                return Err(ForecastError::ValidationError(format!(
                    "Value '{}' maintained in forecast model as {} must be at most {}.",
                    render(supplied),
                    spec.name,
                    max
                )));
            }
            Ok(ParamValue::Integer(value))
        }
    }
}

/// Integers pass through, finite floats truncate toward zero and strings are
/// parsed after trimming. Anything else does not coerce.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn list_choices(choices: &[&str]) -> String {
    let quoted: Vec<String> = choices.iter().map(|c| format!("'{}'", c)).collect();
    match quoted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

/// Schema of the seasonal (external model) algorithm
pub const SEASONAL_SCHEMA: &[ParamSpec] = &[
    ParamSpec {
        name: "seasonality_mode",
        default: ParamDefault::Text("additive"),
        domain: Domain::OneOf(SeasonalityMode::CHOICES),
    },
    ParamSpec {
        name: "uncertainty_samples",
        default: ParamDefault::Integer(0),
        domain: Domain::Integer {
            min: Some(0),
            max: Some(u32::MAX as i64),
        },
    },
];

/// Typed parameters of the seasonal algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeasonalParams {
    pub seasonality_mode: SeasonalityMode,
    pub uncertainty_samples: u32,
}

impl SeasonalParams {
    /// Resolve raw parameters against [`SEASONAL_SCHEMA`]
    pub fn from_raw(raw: &RawParameters) -> Result<Self> {
        let resolved = resolve(raw, SEASONAL_SCHEMA)?;
        let seasonality_mode = resolved.text("seasonality_mode")?.parse()?;
        let uncertainty_samples = u32::try_from(resolved.integer("uncertainty_samples")?)
            .map_err(|e| ForecastError::ValidationError(e.to_string()))?;

        Ok(Self {
            seasonality_mode,
            uncertainty_samples,
        })
    }

    /// Engine settings for one invocation
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            seasonality_mode: self.seasonality_mode,
            uncertainty_samples: self.uncertainty_samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawParameters {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn choices_are_listed_naturally() {
        assert_eq!(list_choices(&["a"]), "'a'");
        assert_eq!(list_choices(&["a", "b"]), "'a' or 'b'");
        assert_eq!(list_choices(&["a", "b", "c"]), "'a', 'b' or 'c'");
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(coerce_integer(&json!(12)), Some(12));
        assert_eq!(coerce_integer(&json!(2.9)), Some(2));
        assert_eq!(coerce_integer(&json!(" 40 ")), Some(40));
        assert_eq!(coerce_integer(&json!("4.5")), None);
        assert_eq!(coerce_integer(&json!(true)), None);
        assert_eq!(coerce_integer(&Value::Null), None);
    }

    #[test]
    fn non_string_choice_is_rendered_as_json() {
        let err = resolve(&raw(json!({"seasonality_mode": 3})), SEASONAL_SCHEMA).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Value '3' maintained in forecast model as seasonality_mode must be 'additive' or 'multiplicative'."
        );
    }

    #[test]
    fn negative_samples_are_rejected() {
        let err = SeasonalParams::from_raw(&raw(json!({"uncertainty_samples": -1}))).unwrap_err();
        assert!(matches!(err, ForecastError::ValidationError(_)));
        assert!(err.to_string().contains("must be at least 0"));
    }

    #[test]
    fn typed_params_from_strings() {
        let params = SeasonalParams::from_raw(&raw(json!({
            "seasonality_mode": "multiplicative",
            "uncertainty_samples": "100"
        })))
        .unwrap();
        assert_eq!(params.seasonality_mode, SeasonalityMode::Multiplicative);
        assert_eq!(params.uncertainty_samples, 100);
    }
}
