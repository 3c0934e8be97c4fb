use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path, path::PathBuf};

use crate::{
    model::{FetchParameters, Horizon},
    provider::Endpoints,
};

/// Refresh intervals offered during setup, in minutes.
pub const SCAN_INTERVAL_CHOICES: &[u64] = &[5, 10, 30, 60];

pub const DEFAULT_SCAN_INTERVAL_MINUTES: u64 = 30;

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_MINUTES
}

/// One configured location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// City id or `"lon,lat"`.
    pub location: String,

    #[serde(default)]
    pub forecast: Horizon,

    #[serde(default = "default_scan_interval")]
    pub scan_interval_minutes: u64,
}

impl SiteConfig {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            forecast: Horizon::default(),
            scan_interval_minutes: DEFAULT_SCAN_INTERVAL_MINUTES,
        }
    }

    /// The API key is supplied per run and never stored here.
    pub fn fetch_parameters(&self, api_key: &str) -> FetchParameters {
        FetchParameters::new(self.location.clone(), api_key, self.forecast)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.location.trim().is_empty() {
            bail!("Site '{name}' has an empty location.");
        }
        if !SCAN_INTERVAL_CHOICES.contains(&self.scan_interval_minutes) {
            bail!(
                "Site '{name}' has scan_interval_minutes = {}; allowed values are {:?}.",
                self.scan_interval_minutes,
                SCAN_INTERVAL_CHOICES
            );
        }
        Ok(())
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_site = "home"
///
/// [sites.home]
/// location = "101010100"
/// forecast = 7
/// scan_interval_minutes = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    pub default_site: Option<String>,

    #[serde(default)]
    pub sites: BTreeMap<String, SiteConfig>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Config {
    /// Return the default site and its name.
    pub fn default_site(&self) -> Result<(&str, &SiteConfig)> {
        let name = self.default_site.as_deref().ok_or_else(|| {
            anyhow!(
                "No default site configured.\n\
                 Hint: run `heweather add <name>` first."
            )
        })?;

        self.site(name)
    }

    pub fn site(&self, name: &str) -> Result<(&str, &SiteConfig)> {
        self.sites
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| anyhow!("Unknown site '{name}'. Run `heweather list` to see sites."))
    }

    /// Named site if given, otherwise the default one.
    pub fn site_or_default(&self, name: Option<&str>) -> Result<(&str, &SiteConfig)> {
        match name {
            Some(name) => self.site(name),
            None => self.default_site(),
        }
    }

    /// Add or replace a site; the first site becomes the default.
    pub fn upsert_site(&mut self, name: &str, site: SiteConfig) {
        self.sites.insert(name.to_string(), site);

        if self.default_site.is_none() {
            self.default_site = Some(name.to_string());
        }
    }

    /// Remove a site, moving the default to another site if needed.
    pub fn remove_site(&mut self, name: &str) -> Option<SiteConfig> {
        let removed = self.sites.remove(name)?;

        if self.default_site.as_deref() == Some(name) {
            self.default_site = self.sites.keys().next().cloned();
        }

        Some(removed)
    }

    pub fn set_default_site(&mut self, name: &str) -> Result<()> {
        self.site(name)?;
        self.default_site = Some(name.to_string());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for (name, site) in &self.sites {
            site.validate(name)?;
        }
        let dangling = self.default_site.as_deref().filter(|name| !self.sites.contains_key(*name));
        if let Some(name) = dangling {
            bail!("default_site '{name}' does not name a configured site.");
        }
        Ok(())
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "heweather", "heweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
