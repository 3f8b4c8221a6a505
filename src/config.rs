use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::models::Quality;

const CONFIG_DIR: &str = "tidarr-send";
const SETTINGS_FILE: &str = "settings.json";

/// Persisted plugin settings.
///
/// Stored as a single JSON object with camelCase keys so the file stays
/// compatible with what the browser plugin persisted. The admin password is
/// kept in clear text; that is a known limitation of the storage contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub server_url: String,
    pub admin_password: String,
    pub download_quality: Quality,
    pub debug_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            admin_password: String::new(),
            download_quality: Quality::High,
            debug_mode: false,
        }
    }
}

impl Settings {
    /// Load settings from the config file, then apply environment overrides.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let mut settings = match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        let settings = serde_json::from_str(&contents)
            .with_context(|| format!("malformed settings file {}", path.display()))?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::path().context("could not determine the user config directory")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write settings to {}", path.display()))?;
        Ok(())
    }

    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(SETTINGS_FILE))
    }

    /// Environment overrides, applied on top of whatever the file said.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("TIDARR_URL") {
            self.server_url = url;
        }
        if let Ok(password) = std::env::var("TIDARR_ADMIN_PASSWORD") {
            self.admin_password = password;
        }
        if let Ok(quality) = std::env::var("TIDARR_QUALITY") {
            match quality.parse() {
                Ok(quality) => self.download_quality = quality,
                Err(err) => log::warn!("ignoring TIDARR_QUALITY: {err}"),
            }
        }
        if let Ok(debug) = std::env::var("TIDARR_DEBUG") {
            self.debug_mode = matches!(debug.as_str(), "1" | "true" | "yes");
        }
    }

    /// Immutable server snapshot for one send operation. Taken once per send
    /// so later settings edits cannot race an in-flight request.
    pub fn server(&self) -> ServerConfig {
        ServerConfig::new(&self.server_url, &self.admin_password)
    }
}

/// Where and how to reach the Tidarr instance for a single operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Base URL with surrounding whitespace and trailing slashes stripped.
    pub url: String,
    /// Empty string means "no authentication step".
    pub password: String,
}

impl ServerConfig {
    pub fn new(url: &str, password: &str) -> Self {
        Self {
            url: url.trim().trim_end_matches('/').to_string(),
            password: password.to_string(),
        }
    }

    /// A usable base URL: non-empty and absolute http(s).
    pub fn is_configured(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }
}
