//! Periodic fetch of current conditions plus one forecast horizon.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{Endpoints, Transport, de, get_decoded};
use crate::{
    condition::classify,
    error::HeWeatherError,
    model::{FetchParameters, ForecastEntry, ForecastSet, Horizon, WeatherSnapshot},
};

#[derive(Debug, Deserialize)]
struct NowResponse {
    now: NowData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NowData {
    #[serde(deserialize_with = "de::number")]
    temp: f64,
    #[serde(deserialize_with = "de::number")]
    humidity: f64,
    #[serde(deserialize_with = "de::number")]
    pressure: f64,
    text: String,
    #[serde(deserialize_with = "de::number")]
    vis: f64,
    #[serde(deserialize_with = "de::number")]
    wind360: f64,
    #[serde(deserialize_with = "de::number")]
    wind_speed: f64,
}

impl From<NowData> for WeatherSnapshot {
    fn from(now: NowData) -> Self {
        Self {
            temperature: now.temp,
            humidity: now.humidity,
            pressure: now.pressure,
            condition: classify(&now.text),
            visibility: now.vis,
            wind_bearing: now.wind360,
            wind_speed: now.wind_speed,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    hourly: Vec<HourlyData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HourlyData {
    fx_time: String,
    text: String,
    #[serde(deserialize_with = "de::number")]
    temp: f64,
    #[serde(deserialize_with = "de::number")]
    pressure: f64,
    #[serde(deserialize_with = "de::number")]
    precip: f64,
    #[serde(deserialize_with = "de::number")]
    wind360: f64,
    #[serde(deserialize_with = "de::number")]
    wind_speed: f64,
    #[serde(default, deserialize_with = "de::optional_percent")]
    pop: Option<u32>,
}

impl From<HourlyData> for ForecastEntry {
    fn from(hour: HourlyData) -> Self {
        Self {
            datetime: hour.fx_time,
            condition: classify(&hour.text),
            temperature: hour.temp,
            templow: None,
            pressure: hour.pressure,
            precipitation: hour.precip,
            wind_bearing: hour.wind360,
            wind_speed: hour.wind_speed,
            precipitation_probability: hour.pop,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: Vec<DailyData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyData {
    fx_date: String,
    text_day: String,
    #[serde(deserialize_with = "de::number")]
    temp_max: f64,
    #[serde(deserialize_with = "de::number")]
    temp_min: f64,
    #[serde(deserialize_with = "de::number")]
    pressure: f64,
    #[serde(deserialize_with = "de::number")]
    precip: f64,
    #[serde(deserialize_with = "de::number")]
    wind360_day: f64,
    #[serde(deserialize_with = "de::number")]
    wind_speed_day: f64,
}

impl From<DailyData> for ForecastEntry {
    fn from(day: DailyData) -> Self {
        Self {
            datetime: day.fx_date,
            condition: classify(&day.text_day),
            temperature: day.temp_max,
            templow: Some(day.temp_min),
            pressure: day.pressure,
            precipitation: day.precip,
            wind_bearing: day.wind360_day,
            wind_speed: day.wind_speed_day,
            precipitation_probability: None,
        }
    }
}

/// Outcome of one leg of [`WeatherFetcher::fetch`].
#[derive(Debug)]
pub enum LegStatus {
    /// Fresh data replaced the previous value.
    Updated,
    /// The previous value was kept.
    Failed(HeWeatherError),
}

impl LegStatus {
    pub fn is_updated(&self) -> bool {
        matches!(self, LegStatus::Updated)
    }

    pub fn error(&self) -> Option<&HeWeatherError> {
        match self {
            LegStatus::Updated => None,
            LegStatus::Failed(err) => Some(err),
        }
    }
}

#[derive(Debug)]
pub struct FetchReport {
    pub now: LegStatus,
    pub forecast: LegStatus,
    pub finished_at: DateTime<Utc>,
}

impl FetchReport {
    /// Both legs produced fresh data.
    pub fn is_complete(&self) -> bool {
        self.now.is_updated() && self.forecast.is_updated()
    }
}

/// Owns the latest snapshot and forecast for one location/key pair.
///
/// `fetch` never fails: each leg replaces its own data on success and keeps
/// the old data on failure, so the two may come from different cycles.
#[derive(Debug)]
pub struct WeatherFetcher {
    params: FetchParameters,
    endpoints: Endpoints,
    transport: Arc<dyn Transport>,
    snapshot: Option<WeatherSnapshot>,
    forecast: ForecastSet,
    snapshot_updated_at: Option<DateTime<Utc>>,
    forecast_updated_at: Option<DateTime<Utc>>,
}

impl WeatherFetcher {
    pub fn new(
        params: FetchParameters,
        endpoints: Endpoints,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            params,
            endpoints,
            transport,
            snapshot: None,
            forecast: ForecastSet::default(),
            snapshot_updated_at: None,
            forecast_updated_at: None,
        }
    }

    pub fn params(&self) -> &FetchParameters {
        &self.params
    }

    /// Latest current conditions; `None` until a "now" leg succeeds.
    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn forecast(&self) -> &ForecastSet {
        &self.forecast
    }

    pub fn snapshot_updated_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot_updated_at
    }

    pub fn forecast_updated_at(&self) -> Option<DateTime<Utc>> {
        self.forecast_updated_at
    }

    /// Refresh both legs, one after the other.
    #[instrument(skip(self), fields(location = %self.params.location, horizon = %self.params.horizon))]
    pub async fn fetch(&mut self) -> FetchReport {
        let now = match self.fetch_now().await {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.snapshot_updated_at = Some(Utc::now());
                LegStatus::Updated
            }
            Err(err) => {
                warn!(error = %err, "current conditions unavailable, keeping previous snapshot");
                LegStatus::Failed(err)
            }
        };

        let forecast = match self.fetch_forecast().await {
            Ok(set) => {
                debug!(points = set.len(), "forecast replaced");
                self.forecast = set;
                self.forecast_updated_at = Some(Utc::now());
                LegStatus::Updated
            }
            Err(err) => {
                warn!(error = %err, "forecast unavailable, keeping previous forecast");
                LegStatus::Failed(err)
            }
        };

        FetchReport { now, forecast, finished_at: Utc::now() }
    }

    /// Request and normalize current conditions without touching state.
    pub async fn fetch_now(&self) -> Result<WeatherSnapshot, HeWeatherError> {
        let url = self.endpoints.weather_url("now", &self.query())?;
        let parsed: NowResponse = get_decoded(self.transport.as_ref(), url).await?;
        Ok(parsed.now.into())
    }

    /// Request and normalize the configured horizon without touching state.
    pub async fn fetch_forecast(&self) -> Result<ForecastSet, HeWeatherError> {
        let horizon = self.params.horizon;
        let url = self.endpoints.weather_url(horizon.path(), &self.query())?;
        let transport = self.transport.as_ref();

        let set: ForecastSet = match horizon {
            Horizon::Hourly => {
                let parsed: HourlyResponse = get_decoded(transport, url).await?;
                parsed.hourly.into_iter().map(ForecastEntry::from).collect()
            }
            Horizon::ThreeDays | Horizon::SevenDays => {
                let parsed: DailyResponse = get_decoded(transport, url).await?;
                parsed.daily.into_iter().map(ForecastEntry::from).collect()
            }
        };

        Ok(set)
    }

    fn query(&self) -> [(&str, &str); 3] {
        [
            ("location", self.params.location.as_str()),
            ("key", self.params.api_key.as_str()),
            ("lang", "en"),
        ]
    }
}
