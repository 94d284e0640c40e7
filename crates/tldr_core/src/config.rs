use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TldrError};
use crate::page::PlaceholderStyle;
use crate::platform::Platform;
use crate::repository::PAGE_SOURCE_URL;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_MAX_AGE_DAYS: u64 = 14;
pub const DEFAULT_UPDATE_TIMEOUT_SECS: u64 = 30;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct TldrConfig {
    #[serde(default)]
    pub lookup: LookupSection,
    #[serde(default)]
    pub update: UpdateSection,
    #[serde(default)]
    pub render: RenderSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct LookupSection {
    pub platform: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct UpdateSection {
    pub source_url: Option<String>,
    pub max_age_days: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub recommend: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct RenderSection {
    pub placeholders: Option<String>,
}

/// Effective settings after env > config file > default resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub platform: Platform,
    pub language: Option<String>,
    pub source_url: String,
    pub max_age: Duration,
    pub update_timeout: Duration,
    pub recommend_update: bool,
    pub placeholders: PlaceholderStyle,
}

/// Load and parse a TldrConfig from a TOML file. Returns default if file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<TldrConfig> {
    if !config_path.exists() {
        return Ok(TldrConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .map_err(|source| TldrError::io("read config", config_path, source))?;
    toml::from_str(&content).map_err(|error| TldrError::Config {
        origin: config_path.display().to_string(),
        message: error.message().to_string(),
    })
}

impl TldrConfig {
    pub fn settings(&self) -> Result<Settings> {
        self.settings_with_lookup(|key| env::var(key).ok())
    }

    pub fn settings_with_lookup<F>(&self, lookup_env: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_value = |key: &str| {
            lookup_env(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let platform = match env_value("TLDR_PLATFORM") {
            Some(value) => parse_platform(&value, "TLDR_PLATFORM")?,
            None => match self.lookup.platform.as_deref() {
                Some(value) => parse_platform(value, "[lookup].platform")?,
                None => Platform::host(),
            },
        };

        let language = env_value("TLDR_LANGUAGE").or_else(|| {
            self.lookup
                .language
                .as_ref()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        });

        let source_url = env_value("TLDR_SOURCE_URL")
            .or_else(|| self.update.source_url.clone())
            .unwrap_or_else(|| PAGE_SOURCE_URL.to_string());

        let max_age_days = match env_value("TLDR_MAX_AGE_DAYS") {
            Some(value) => parse_number(&value, "TLDR_MAX_AGE_DAYS")?,
            None => self.update.max_age_days.unwrap_or(DEFAULT_MAX_AGE_DAYS),
        };

        let timeout_secs = match env_value("TLDR_UPDATE_TIMEOUT_SECS") {
            Some(value) => parse_number(&value, "TLDR_UPDATE_TIMEOUT_SECS")?,
            None => self
                .update
                .timeout_secs
                .unwrap_or(DEFAULT_UPDATE_TIMEOUT_SECS),
        };

        let recommend_update = match env_value("TLDR_UPDATE_RECOMMEND") {
            Some(value) => parse_flag(&value, "TLDR_UPDATE_RECOMMEND")?,
            None => self.update.recommend.unwrap_or(true),
        };

        let placeholders = match env_value("TLDR_PLACEHOLDERS") {
            Some(value) => parse_placeholders(&value, "TLDR_PLACEHOLDERS")?,
            None => match self.render.placeholders.as_deref() {
                Some(value) => parse_placeholders(value, "[render].placeholders")?,
                None => PlaceholderStyle::default(),
            },
        };

        Ok(Settings {
            platform,
            language,
            source_url,
            max_age: Duration::from_secs(max_age_days.saturating_mul(SECONDS_PER_DAY)),
            update_timeout: Duration::from_secs(timeout_secs),
            recommend_update,
            placeholders,
        })
    }
}

fn invalid(origin: &str, message: String) -> TldrError {
    TldrError::Config {
        origin: origin.to_string(),
        message,
    }
}

fn parse_platform(value: &str, origin: &str) -> Result<Platform> {
    value
        .parse::<Platform>()
        .map_err(|error| invalid(origin, error.to_string()))
}

fn parse_number(value: &str, origin: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| invalid(origin, format!("expected a whole number, got `{value}`")))
}

fn parse_flag(value: &str, origin: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(origin, format!("expected true or false, got `{value}`"))),
    }
}

fn parse_placeholders(value: &str, origin: &str) -> Result<PlaceholderStyle> {
    PlaceholderStyle::parse(value)
        .ok_or_else(|| invalid(origin, format!("expected keep or strip, got `{value}`")))
}
