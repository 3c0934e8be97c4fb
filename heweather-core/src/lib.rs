//! Core library for the `heweather` adapter.
//!
//! This crate defines:
//! - Classification of QWeather condition labels into canonical codes
//! - The HTTP transport and its error taxonomy
//! - City lookup and forecast entitlement probing used during setup
//! - [`WeatherFetcher`], which keeps the latest conditions and forecast for a site
//! - Site configuration
//!
//! It is used by `heweather-cli`, but can also be embedded by other hosts.

pub mod condition;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use condition::{Condition, WeatherCondition, classify};
pub use config::{Config, SiteConfig};
pub use error::HeWeatherError;
pub use model::{
    CityCandidate, CityList, FetchParameters, ForecastEntry, ForecastSet, Horizon,
    WeatherSnapshot,
};
pub use provider::{
    Endpoints, FetchReport, HeWeather, HttpTransport, LegStatus, Transport, WeatherFetcher,
};
