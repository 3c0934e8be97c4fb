use anyhow::{Context, anyhow, bail};
use clap::{ArgAction, Parser, Subcommand};
use heweather_core::{Config, HeWeather, HeWeatherError, WeatherFetcher};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::{render, setup};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "heweather", version, about = "QWeather conditions and forecasts")]
pub struct Cli {
    /// QWeather API key. Never written to the config file.
    #[arg(long, env = "HEWEATHER_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// More log output (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List cities matching a name or "lon,lat".
    Lookup { location: String },

    /// Show which forecast horizons the API key may use.
    Probe { location: String },

    /// Interactively configure a site.
    Add {
        name: String,

        /// Location text to look up; prompted for when absent.
        #[arg(long)]
        location: Option<String>,
    },

    /// Remove a configured site.
    Remove { name: String },

    /// Make a site the default.
    Default { name: String },

    /// List configured sites.
    List,

    /// Fetch once and print conditions and forecast.
    Show {
        /// Site name; the default site when absent.
        site: Option<String>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Refresh on the site's interval until Ctrl-C.
    Watch { site: Option<String> },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let api_key = self.api_key;

        match self.command {
            Command::Lookup { location } => {
                let key = require_key(api_key.as_deref())?;
                let config = Config::load()?;
                let api = HeWeather::new(config.endpoints)?;

                let cities = api.resolve_location(&location, key).await.map_err(explain)?;
                if cities.is_empty() {
                    println!("No city matches '{location}'.");
                }
                for city in cities.iter() {
                    println!("{:<12} {}", city.id, city.label);
                }
            }
            Command::Probe { location } => {
                let key = require_key(api_key.as_deref())?;
                let config = Config::load()?;
                let api = HeWeather::new(config.endpoints)?;

                let horizons = api.available_horizons(&location, key).await;
                let names: Vec<String> = horizons.iter().map(ToString::to_string).collect();
                println!("Available forecasts: {}", names.join(", "));
            }
            Command::Add { name, location } => {
                let key = require_key(api_key.as_deref())?;
                let mut config = Config::load()?;
                let api = HeWeather::new(config.endpoints.clone())?;

                if let Some(site) = setup::run(&api, key, &name, location, &config).await? {
                    config.upsert_site(&name, site);
                    config.save()?;
                    println!("Saved site '{name}'.");
                }
            }
            Command::Remove { name } => {
                let mut config = Config::load()?;
                config
                    .remove_site(&name)
                    .ok_or_else(|| anyhow!("Unknown site '{name}'."))?;
                config.save()?;
                println!("Removed site '{name}'.");
            }
            Command::Default { name } => {
                let mut config = Config::load()?;
                config.set_default_site(&name)?;
                config.save()?;
                println!("Default site is now '{name}'.");
            }
            Command::List => {
                let config = Config::load()?;
                render::sites(&config);
            }
            Command::Show { site, json } => {
                let key = require_key(api_key.as_deref())?;
                let config = Config::load()?;
                let (name, mut fetcher) = fetcher_for(&config, site.as_deref(), key)?;

                let report = fetcher.fetch().await;
                if let (Some(now), Some(forecast)) = (report.now.error(), report.forecast.error()) {
                    bail!(
                        "No data for site '{name}': {}; {}",
                        describe(now),
                        describe(forecast)
                    );
                }

                if json {
                    render::json(name, &fetcher)?;
                } else {
                    render::weather(name, &fetcher, &report);
                }
            }
            Command::Watch { site } => {
                let key = require_key(api_key.as_deref())?;
                let config = Config::load()?;
                let (name, mut fetcher) = fetcher_for(&config, site.as_deref(), key)?;
                let minutes = config.site(name)?.1.scan_interval_minutes;

                let mut ticker = tokio::time::interval(Duration::from_secs(minutes * 60));
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                info!(site = name, minutes, "watching");

                loop {
                    // A cycle cut short by Ctrl-C may leave only the "now" leg applied.
                    let report = tokio::select! {
                        report = async {
                            ticker.tick().await;
                            fetcher.fetch().await
                        } => report,
                        _ = tokio::signal::ctrl_c() => {
                            info!("interrupted");
                            break;
                        }
                    };
                    render::weather(name, &fetcher, &report);
                }
            }
        }

        Ok(())
    }
}

fn require_key(key: Option<&str>) -> anyhow::Result<&str> {
    key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
        anyhow!(
            "No API key given.\n\
             Hint: pass --api-key or set HEWEATHER_API_KEY."
        )
    })
}

fn fetcher_for<'a>(
    config: &'a Config,
    site: Option<&str>,
    key: &str,
) -> anyhow::Result<(&'a str, WeatherFetcher)> {
    let (name, site) = config.site_or_default(site)?;
    let api = HeWeather::new(config.endpoints.clone())
        .context("Failed to initialise the HTTP client")?;
    Ok((name, api.fetcher(site.fetch_parameters(key))))
}

/// Short user-facing reason for an API failure.
pub fn describe(err: &HeWeatherError) -> &'static str {
    match err {
        HeWeatherError::Connect { .. } => "cannot connect to QWeather",
        HeWeatherError::InvalidApiKey { .. } => "invalid API key",
        HeWeatherError::ApiParam { .. } => "request rejected, check the location",
        HeWeatherError::Payload { .. } => "unexpected response from QWeather",
        HeWeatherError::InvalidEndpoint { .. } | HeWeatherError::Client(_) => {
            "client misconfigured"
        }
    }
}

/// Wrap an API error with its user-facing reason.
pub fn explain(err: HeWeatherError) -> anyhow::Error {
    let reason = describe(&err);
    anyhow::Error::new(err).context(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_show_with_default_site() {
        let cli = Cli::try_parse_from(["heweather", "--api-key", "K", "show"]).unwrap();
        assert_eq!(cli.api_key.as_deref(), Some("K"));
        assert!(matches!(cli.command, Command::Show { site: None, json: false }));
    }

    #[test]
    fn cli_counts_verbosity_after_subcommand() {
        let cli = Cli::try_parse_from(["heweather", "watch", "home", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Watch { site: Some(ref s) } if s == "home"));
    }

    #[test]
    fn blank_key_is_rejected() {
        assert!(require_key(None).is_err());
        assert!(require_key(Some("  ")).is_err());
        assert_eq!(require_key(Some("K")).unwrap(), "K");
    }

    #[test]
    fn explain_keeps_reason_and_cause() {
        let err = explain(HeWeatherError::InvalidApiKey { endpoint: "e".into(), code: 401 });
        assert_eq!(err.to_string(), "invalid API key");
        assert!(format!("{err:#}").contains("401"));
    }
}
