use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{fmt::Debug, sync::Arc, time::Duration};
use tracing::{debug, warn};

use crate::{
    error::HeWeatherError,
    model::{CityList, FetchParameters, Horizon},
};

pub mod capability;
mod de;
pub mod location;
pub mod weather;

pub use weather::{FetchReport, LegStatus, WeatherFetcher};

pub const DEFAULT_LOCATION_API_URL: &str = "https://geoapi.qweather.com/v2/city/lookup";
pub const DEFAULT_WEATHER_API_URL: &str = "https://devapi.qweather.com/v7/weather/";

/// Budget for one request, connect and body included.
pub const TIMEOUT: Duration = Duration::from_secs(10);

/// One GET returning the JSON envelope, already checked for a 200 `code`.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get_json(&self, url: Url) -> Result<Value, HeWeatherError>;
}

/// [`Transport`] backed by reqwest. Single attempt, no retries.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, HeWeatherError> {
        Self::with_timeout(TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, HeWeatherError> {
        let http = Client::builder().timeout(timeout).build().map_err(HeWeatherError::Client)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: Url) -> Result<Value, HeWeatherError> {
        let endpoint = endpoint_of(&url);
        debug!(%endpoint, "GET");

        let connect_error = |source: reqwest::Error| {
            warn!(%endpoint, error = %source, "request failed");
            HeWeatherError::Connect { endpoint: endpoint.clone(), source }
        };

        let res = self.http.get(url).send().await.map_err(connect_error)?;
        let body: Value = res.json().await.map_err(connect_error)?;

        check_envelope(&endpoint, body)
    }
}

/// Validate the `code` field every QWeather response carries.
pub fn check_envelope(endpoint: &str, body: Value) -> Result<Value, HeWeatherError> {
    let code = match body.get("code") {
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(Value::Number(n)) => n.as_i64(),
        _ => None,
    }
    .ok_or_else(|| HeWeatherError::Payload {
        endpoint: endpoint.to_string(),
        reason: "missing or malformed envelope code".to_string(),
    })?;

    if code != 200 {
        warn!(%endpoint, code, "API returned error status");
        return Err(HeWeatherError::from_status(endpoint.to_string(), code));
    }

    Ok(body)
}

/// Request URL without its query string.
pub(crate) fn endpoint_of(url: &Url) -> String {
    let mut bare = url.clone();
    bare.set_query(None);
    bare.to_string()
}

/// GET `url` and deserialize the checked envelope into `T`.
pub(crate) async fn get_decoded<T: DeserializeOwned>(
    transport: &dyn Transport,
    url: Url,
) -> Result<T, HeWeatherError> {
    let endpoint = endpoint_of(&url);
    let body = transport.get_json(url).await?;
    de::decode(&endpoint, body)
}

fn default_location_url() -> String {
    DEFAULT_LOCATION_API_URL.to_string()
}

fn default_weather_url() -> String {
    DEFAULT_WEATHER_API_URL.to_string()
}

/// API base URLs. Overridable so tests and proxies can point elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_location_url")]
    pub location_url: String,

    /// Base of the `now`, `24h`, `3d` and `7d` resources.
    #[serde(default = "default_weather_url")]
    pub weather_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self { location_url: default_location_url(), weather_url: default_weather_url() }
    }
}

impl Endpoints {
    pub fn new(location_url: impl Into<String>, weather_url: impl Into<String>) -> Self {
        Self { location_url: location_url.into(), weather_url: weather_url.into() }
    }

    pub(crate) fn lookup_url(&self, location: &str, api_key: &str) -> Result<Url, HeWeatherError> {
        build_url(&self.location_url, &[("location", location), ("key", api_key)])
    }

    /// `<weather_url>/<resource>` with the given query.
    pub(crate) fn weather_url(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<Url, HeWeatherError> {
        let base = self.weather_url.trim_end_matches('/');
        build_url(&format!("{base}/{resource}"), query)
    }
}

fn build_url(base: &str, query: &[(&str, &str)]) -> Result<Url, HeWeatherError> {
    Url::parse_with_params(base, query).map_err(|e| HeWeatherError::InvalidEndpoint {
        url: base.to_string(),
        reason: e.to_string(),
    })
}

/// Entry point bundling a transport with the endpoints it talks to.
#[derive(Debug, Clone)]
pub struct HeWeather {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
}

impl HeWeather {
    /// Client over [`HttpTransport`] with the default timeout.
    pub fn new(endpoints: Endpoints) -> Result<Self, HeWeatherError> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new()?), endpoints))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, endpoints: Endpoints) -> Self {
        Self { transport, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn resolve_location(
        &self,
        location: &str,
        api_key: &str,
    ) -> Result<CityList, HeWeatherError> {
        location::resolve_location(self.transport.as_ref(), &self.endpoints, location, api_key)
            .await
    }

    pub async fn probe_extended_forecast(&self, location: &str, api_key: &str) -> bool {
        capability::probe_extended_forecast(
            self.transport.as_ref(),
            &self.endpoints,
            location,
            api_key,
        )
        .await
    }

    /// Horizons the key may use for `location`.
    pub async fn available_horizons(&self, location: &str, api_key: &str) -> Vec<Horizon> {
        capability::available_horizons(self.probe_extended_forecast(location, api_key).await)
    }

    /// A fetcher sharing this client's transport.
    pub fn fetcher(&self, params: FetchParameters) -> WeatherFetcher {
        WeatherFetcher::new(params, self.endpoints.clone(), Arc::clone(&self.transport))
    }
}
