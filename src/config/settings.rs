//! Application settings loading from config.toml
//!
//! This module loads the organisation name, the optional remote mirror settings and the
//! holiday calendar seed from a TOML file. Environment variables override the parts
//! that differ between deployments.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    /// Organisation details used in reports
    #[serde(default)]
    pub organization: OrganizationConfig,
    /// Remote mirror settings
    #[serde(default)]
    pub sync: SyncConfig,
    /// Holidays to seed into the off-day calendar
    #[serde(default)]
    pub off_days: Vec<OffDayConfig>,
}

/// Organisation details
#[derive(Debug, Deserialize, Clone)]
pub struct OrganizationConfig {
    /// Name printed in report file names
    pub name: String,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            name: "Plant".to_string(),
        }
    }
}

/// Remote mirror settings
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SyncConfig {
    /// Base URL of the mirror; no mirroring when absent
    pub url: Option<String>,
    /// Refresh local collections from the mirror at startup
    #[serde(default)]
    pub pull_on_start: bool,
}

/// A holiday entry in config.toml
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct OffDayConfig {
    /// Date as `YYYY-MM-DD`
    pub date: String,
    /// Holiday name
    pub description: String,
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load settings from: {:?}", path_ref);

    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_settings(&contents)
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `PRODTRACK_CONFIG` (default `./config.toml`) and applies
/// environment overrides. A missing file yields the defaults.
pub fn load_app_settings() -> Result<Settings> {
    let path = std::env::var("PRODTRACK_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

    let mut settings = if Path::new(&path).exists() {
        load_settings(&path)?
    } else {
        tracing::warn!("Config file {path} not found, using defaults");
        Settings::default()
    };

    if let Ok(url) = std::env::var("PRODTRACK_SYNC_URL") {
        settings.sync.url = Some(url);
    }
    if let Ok(name) = std::env::var("PRODTRACK_ORG_NAME") {
        settings.organization.name = name;
    }

    Ok(settings)
}
