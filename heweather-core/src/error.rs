use thiserror::Error;

/// Failures of a single QWeather API call.
///
/// `endpoint` is the request URL without its query string, so the API key
/// never ends up in messages or logs.
#[derive(Debug, Error)]
pub enum HeWeatherError {
    /// Network failure, timeout, or a body that is not JSON.
    #[error("cannot connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Envelope status in 401..=403.
    #[error("{endpoint} rejected the API key (status {code})")]
    InvalidApiKey { endpoint: String, code: i64 },

    /// Any other non-200 envelope status.
    #[error("{endpoint} rejected the request (status {code})")]
    ApiParam { endpoint: String, code: i64 },

    /// Successful envelope whose payload does not have the expected shape.
    #[error("unexpected payload from {endpoint}: {reason}")]
    Payload { endpoint: String, reason: String },

    #[error("invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl HeWeatherError {
    /// Envelope status code carried by the error, if upstream produced one.
    pub fn code(&self) -> Option<i64> {
        match self {
            HeWeatherError::InvalidApiKey { code, .. } | HeWeatherError::ApiParam { code, .. } => {
                Some(*code)
            }
            _ => None,
        }
    }

    /// Classify a non-200 envelope status.
    pub(crate) fn from_status(endpoint: String, code: i64) -> Self {
        if (401..=403).contains(&code) {
            HeWeatherError::InvalidApiKey { endpoint, code }
        } else {
            HeWeatherError::ApiParam { endpoint, code }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_range_is_inclusive() {
        for code in [401, 402, 403] {
            let err = HeWeatherError::from_status("x".into(), code);
            assert!(matches!(err, HeWeatherError::InvalidApiKey { .. }), "{code}");
            assert_eq!(err.code(), Some(code));
        }
    }

    #[test]
    fn other_codes_are_param_errors() {
        for code in [-1, 204, 400, 404, 429, 500, 70000, 99999] {
            let err = HeWeatherError::from_status("x".into(), code);
            assert!(matches!(err, HeWeatherError::ApiParam { .. }), "{code}");
        }
    }

    #[test]
    fn display_names_endpoint_and_code() {
        let err = HeWeatherError::from_status("https://api.test/v7/weather/now".into(), 402);
        let msg = err.to_string();
        assert!(msg.contains("https://api.test/v7/weather/now"));
        assert!(msg.contains("402"));
    }
}
