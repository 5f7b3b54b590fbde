use anyhow::{Context, Result};
use chrono_tz::Tz;
use nestegg_core::parse_timezone;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::{default_data_path, ensure_nestegg_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSection {
    /// Display only; amounts are stored without a currency.
    pub currency: String,
    /// IANA zone used to decide what "today" is for deadlines.
    pub timezone: String,
    /// Default tracing filter when NESTEGG_LOG is unset.
    pub log_level: String,
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            timezone: "America/Chicago".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    /// Override for the data file (default: ~/.nestegg/data.json)
    pub data_file: Option<String>,
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        parse_timezone(&self.general.timezone).context("invalid timezone in config.toml")
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        match &self.storage.data_file {
            Some(p) if !p.trim().is_empty() => Ok(PathBuf::from(p)),
            _ => default_data_path(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_nestegg_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
