//! Interactive `heweather add` flow: look up the city, then pick forecast
//! horizon and refresh interval.

use anyhow::bail;
use heweather_core::{
    CityCandidate, Config, HeWeather, HeWeatherError, SiteConfig,
    config::{DEFAULT_SCAN_INTERVAL_MINUTES, SCAN_INTERVAL_CHOICES},
};
use inquire::{Confirm, Select, Text};
use std::fmt;
use tracing::debug;

use crate::cli::{describe, explain};

struct CityChoice(CityCandidate);

impl fmt::Display for CityChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0.label, self.0.id)
    }
}

/// A site is stored by city id, so an id-less hit is unusable.
fn checked_city(city: CityCandidate) -> anyhow::Result<CityCandidate> {
    if city.id.trim().is_empty() {
        bail!("QWeather returned '{}' without a city id", city.label);
    }
    Ok(city)
}

/// Walk the user through configuring `name`. `None` means the user backed out.
pub async fn run(
    api: &HeWeather,
    key: &str,
    name: &str,
    location: Option<String>,
    config: &Config,
) -> anyhow::Result<Option<SiteConfig>> {
    if config.sites.contains_key(name) {
        let replace = Confirm::new(&format!("Site '{name}' exists. Replace it?"))
            .with_default(false)
            .prompt()?;
        if !replace {
            return Ok(None);
        }
    }

    let mut text = location;
    let city = loop {
        let query = match text.take() {
            Some(t) => t,
            None => match Text::new("Location (city name or \"lon,lat\"):").prompt_skippable()? {
                Some(t) => t,
                None => return Ok(None),
            },
        };

        let cities = match api.resolve_location(&query, key).await {
            Ok(cities) => cities,
            Err(err @ HeWeatherError::InvalidApiKey { .. }) => return Err(explain(err)),
            Err(err) => {
                debug!(error = %err, "lookup failed");
                println!("Lookup failed: {}.", describe(&err));
                continue;
            }
        };

        if cities.is_empty() {
            println!("No city matches '{query}'.");
            continue;
        }

        let options: Vec<CityChoice> = cities.into_iter().map(CityChoice).collect();
        match Select::new("City:", options).prompt_skippable()? {
            Some(choice) => break checked_city(choice.0)?,
            None => return Ok(None),
        }
    };

    let horizons = api.available_horizons(&city.id, key).await;
    let Some(forecast) = Select::new("Forecast:", horizons).prompt_skippable()? else {
        return Ok(None);
    };

    let cursor = SCAN_INTERVAL_CHOICES
        .iter()
        .position(|m| *m == DEFAULT_SCAN_INTERVAL_MINUTES)
        .unwrap_or(0);
    let Some(scan_interval_minutes) =
        Select::new("Refresh every (minutes):", SCAN_INTERVAL_CHOICES.to_vec())
            .with_starting_cursor(cursor)
            .prompt_skippable()?
    else {
        return Ok(None);
    };

    println!("{name}: {} ({forecast}, every {scan_interval_minutes} min)", city.label);
    Ok(Some(SiteConfig { location: city.id, forecast, scan_interval_minutes }))
}
