//! Human-readable and JSON output.

use chrono::{DateTime, Local, Utc};
use heweather_core::{Config, FetchReport, LegStatus, WeatherFetcher};
use serde_json::json;

use crate::cli::describe;

pub fn sites(config: &Config) {
    if config.sites.is_empty() {
        println!("No sites configured. Run `heweather add <name>`.");
        return;
    }

    for (name, site) in &config.sites {
        let marker = if config.default_site.as_deref() == Some(name.as_str()) { "*" } else { " " };
        println!(
            "{marker} {name:<16} {:<20} {:<9} every {} min",
            site.location, site.forecast, site.scan_interval_minutes
        );
    }
}

pub fn weather(name: &str, fetcher: &WeatherFetcher, report: &FetchReport) {
    println!("== {name} ({}) at {}", fetcher.params().location, local(report.finished_at));

    match fetcher.snapshot() {
        Some(s) => {
            println!(
                "Now: {}  {:.1}°C  humidity {:.0}%  {:.0} hPa  visibility {:.0} km  wind {:.0}° {:.0} km/h",
                s.condition, s.temperature, s.humidity, s.pressure, s.visibility, s.wind_bearing,
                s.wind_speed
            );
        }
        None => println!("Now: no data yet"),
    }
    stale("conditions", &report.now, fetcher.snapshot_updated_at());

    for entry in fetcher.forecast() {
        let low = entry.templow.map(|t| format!(" / {t:.1}°C")).unwrap_or_default();
        let pop = entry
            .precipitation_probability
            .map(|p| format!("  {p}% chance"))
            .unwrap_or_default();
        println!(
            "  {:<17} {:<15} {:.1}°C{low}  {:.1} mm{pop}  wind {:.0}° {:.0} km/h",
            entry.datetime,
            entry.condition.as_str(),
            entry.temperature,
            entry.precipitation,
            entry.wind_bearing,
            entry.wind_speed
        );
    }
    stale("forecast", &report.forecast, fetcher.forecast_updated_at());
}

fn stale(what: &str, status: &LegStatus, updated: Option<DateTime<Utc>>) {
    if let LegStatus::Failed(err) = status {
        match updated {
            Some(at) => println!("  ({what} from {}: {})", local(at), describe(err)),
            None => println!("  ({what} unavailable: {})", describe(err)),
        }
    }
}

pub fn json(name: &str, fetcher: &WeatherFetcher) -> anyhow::Result<()> {
    let out = json!({
        "site": name,
        "location": fetcher.params().location,
        "snapshot": fetcher.snapshot(),
        "snapshot_updated_at": fetcher.snapshot_updated_at(),
        "forecast": fetcher.forecast(),
        "forecast_updated_at": fetcher.forecast_updated_at(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn local(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
