//! Serde helpers for QWeather payloads, which send most numbers as strings.

use serde::{Deserialize, Deserializer, de::DeserializeOwned, de::Error as _};
use serde_json::Value;

use crate::error::HeWeatherError;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

/// `"20.5"` or `20.5` as `f64`.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected a number, got {s:?}"))),
    }
}

/// Optional whole percentage. Null, missing and `""` are all absent; `"0"` is `Some(0)`.
pub(crate) fn optional_percent<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected a whole percentage, got {s:?}"))),
        Some(NumberOrString::Number(n))
            if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) =>
        {
            Ok(Some(n as u32))
        }
        Some(NumberOrString::Number(n)) => {
            Err(D::Error::custom(format!("expected a whole percentage, got {n}")))
        }
    }
}

/// Deserialize an envelope that already passed the status check.
pub(crate) fn decode<T: DeserializeOwned>(endpoint: &str, body: Value) -> Result<T, HeWeatherError> {
    serde_json::from_value(body).map_err(|e| HeWeatherError::Payload {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "number")]
        value: f64,
        #[serde(default, deserialize_with = "optional_percent")]
        pop: Option<u32>,
    }

    fn sample(v: Value) -> Result<Sample, HeWeatherError> {
        decode("test", v)
    }

    #[test]
    fn numbers_accept_strings_and_numbers() {
        assert_eq!(sample(json!({"value": "20.5"})).unwrap().value, 20.5);
        assert_eq!(sample(json!({"value": 7})).unwrap().value, 7.0);
        assert_eq!(sample(json!({"value": " -3 "})).unwrap().value, -3.0);
    }

    #[test]
    fn non_numeric_string_is_payload_error() {
        let err = sample(json!({"value": "warm"})).unwrap_err();
        assert!(matches!(err, HeWeatherError::Payload { .. }));
    }

    #[test]
    fn percent_absence_rules() {
        assert_eq!(sample(json!({"value": 1})).unwrap().pop, None);
        assert_eq!(sample(json!({"value": 1, "pop": null})).unwrap().pop, None);
        assert_eq!(sample(json!({"value": 1, "pop": ""})).unwrap().pop, None);
        assert_eq!(sample(json!({"value": 1, "pop": "0"})).unwrap().pop, Some(0));
        assert_eq!(sample(json!({"value": 1, "pop": "30"})).unwrap().pop, Some(30));
        assert_eq!(sample(json!({"value": 1, "pop": 55})).unwrap().pop, Some(55));
    }

    #[test]
    fn fractional_percent_is_rejected() {
        assert!(sample(json!({"value": 1, "pop": "12.5"})).is_err());
        assert!(sample(json!({"value": 1, "pop": -4})).is_err());
    }
}
