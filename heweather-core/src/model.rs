use serde::{Deserialize, Serialize};
use std::fmt;

use crate::condition::WeatherCondition;

/// Forecast granularity requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Horizon {
    /// 24 hourly points.
    Hourly,
    /// 3 daily points.
    #[default]
    ThreeDays,
    /// 7 daily points.
    SevenDays,
}

impl Horizon {
    /// Selector value as stored in configuration: 1, 3 or 7.
    pub fn selector(self) -> u8 {
        match self {
            Horizon::Hourly => 1,
            Horizon::ThreeDays => 3,
            Horizon::SevenDays => 7,
        }
    }

    /// Path segment below the weather API base.
    pub fn path(self) -> &'static str {
        match self {
            Horizon::Hourly => "24h",
            Horizon::ThreeDays => "3d",
            Horizon::SevenDays => "7d",
        }
    }

    pub const fn all() -> &'static [Horizon] {
        &[Horizon::ThreeDays, Horizon::SevenDays, Horizon::Hourly]
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Horizon::Hourly => f.write_str("24 hours"),
            Horizon::ThreeDays => f.write_str("3 days"),
            Horizon::SevenDays => f.write_str("7 days"),
        }
    }
}

impl TryFrom<u8> for Horizon {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Horizon::Hourly),
            3 => Ok(Horizon::ThreeDays),
            7 => Ok(Horizon::SevenDays),
            other => Err(format!("unsupported forecast horizon {other}; expected 1, 3 or 7")),
        }
    }
}

impl From<Horizon> for u8 {
    fn from(value: Horizon) -> Self {
        value.selector()
    }
}

/// Immutable inputs of one [`WeatherFetcher`](crate::WeatherFetcher).
#[derive(Clone, PartialEq, Eq)]
pub struct FetchParameters {
    /// `"lon,lat"` or a resolved city id.
    pub location: String,
    pub api_key: String,
    pub horizon: Horizon,
}

impl FetchParameters {
    pub fn new(location: impl Into<String>, api_key: impl Into<String>, horizon: Horizon) -> Self {
        Self { location: location.into(), api_key: api_key.into(), horizon }
    }
}

// Keeps the key out of `{:?}` output and therefore out of traces.
impl fmt::Debug for FetchParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchParameters")
            .field("location", &self.location)
            .field("api_key", &"<redacted>")
            .field("horizon", &self.horizon)
            .finish()
    }
}

/// Current conditions, metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// °C
    pub temperature: f64,
    /// %
    pub humidity: f64,
    /// hPa
    pub pressure: f64,
    pub condition: WeatherCondition,
    /// km
    pub visibility: f64,
    /// Degrees, 0..=360.
    pub wind_bearing: f64,
    /// km/h
    pub wind_speed: f64,
}

/// One hourly or daily forecast point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// `fxTime` or `fxDate` as sent by the API.
    pub datetime: String,
    pub condition: WeatherCondition,
    /// Hourly temperature, or the daily high.
    pub temperature: f64,
    /// Daily low; `None` for hourly points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templow: Option<f64>,
    pub pressure: f64,
    /// mm
    pub precipitation: f64,
    pub wind_bearing: f64,
    pub wind_speed: f64,
    /// Percent; only hourly points carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_probability: Option<u32>,
}

/// Forecast points in upstream (chronological) order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastSet {
    entries: Vec<ForecastEntry>,
}

impl ForecastSet {
    pub fn entries(&self) -> &[ForecastEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ForecastEntry> {
        self.entries.iter()
    }
}

impl From<Vec<ForecastEntry>> for ForecastSet {
    fn from(entries: Vec<ForecastEntry>) -> Self {
        Self { entries }
    }
}

impl FromIterator<ForecastEntry> for ForecastSet {
    fn from_iter<T: IntoIterator<Item = ForecastEntry>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a ForecastSet {
    type Item = &'a ForecastEntry;
    type IntoIter = std::slice::Iter<'a, ForecastEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A location lookup hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityCandidate {
    pub id: String,
    /// `"{name}-{adm2}-{adm1}"`
    pub label: String,
}

/// Lookup hits keyed by city id, in upstream order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CityList {
    cities: Vec<CityCandidate>,
}

impl CityList {
    /// Insert a candidate. A repeated id keeps its position and takes the new label.
    pub fn insert(&mut self, id: String, label: String) {
        match self.cities.iter_mut().find(|c| c.id == id) {
            Some(existing) => existing.label = label,
            None => self.cities.push(CityCandidate { id, label }),
        }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.cities.iter().find(|c| c.id == id).map(|c| c.label.as_str())
    }

    pub fn first(&self) -> Option<&CityCandidate> {
        self.cities.first()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CityCandidate> {
        self.cities.iter()
    }
}

impl IntoIterator for CityList {
    type Item = CityCandidate;
    type IntoIter = std::vec::IntoIter<CityCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.cities.into_iter()
    }
}
