//! `;`-delimited encoding of numeric sequences.
//!
//! Expost and forecast values cross the storage boundary as a single string:
//! every value rendered with its `Display` form, joined by [`DELIMITER`], with
//! no trailing delimiter and no brackets. Only numeric values are supported;
//! their renderings never contain the delimiter.

use crate::error::{ForecastError, Result};
use num_traits::Num;
use std::fmt::Display;
use std::str::FromStr;

/// Separator between encoded values
pub const DELIMITER: char = ';';

/// Encode `values` as a delimited string.
///
/// ```
/// use demand_forecast::encoding::encode;
///
/// assert_eq!(encode(&[20.0, 20.5, -1.25]), "20;20.5;-1.25");
/// assert_eq!(encode::<f64>(&[]), "");
/// ```
pub fn encode<T: Num + Display>(values: &[T]) -> String {
    let mut out = String::new();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        out.push_str(&value.to_string());
    }
    out
}

/// Decode a delimited string produced by [`encode`].
///
/// The empty string decodes to an empty sequence.
pub fn decode<T>(encoded: &str) -> Result<Vec<T>>
where
    T: Num + FromStr,
    <T as FromStr>::Err: Display,
{
    if encoded.is_empty() {
        return Ok(Vec::new());
    }

    encoded
        .split(DELIMITER)
        .map(|token| {
            token.parse::<T>().map_err(|e| {
                ForecastError::EncodingError(format!("Cannot parse '{}' as a number: {}", token, e))
            })
        })
        .collect()
}
