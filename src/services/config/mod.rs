//! Application configuration.
//!
//! Read from `config.toml` in the platform config directory (or the path in
//! `TIMEBOX_CONFIG`). Environment variables override individual fields so
//! secrets can stay out of the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH_ENV: &str = "TIMEBOX_CONFIG";
pub const IDENTITY_URL_ENV: &str = "TIMEBOX_IDENTITY_URL";
pub const IDENTITY_KEY_ENV: &str = "TIMEBOX_IDENTITY_KEY";
pub const CHECKOUT_URL_ENV: &str = "TIMEBOX_CHECKOUT_URL";
pub const WEBHOOK_SECRET_ENV: &str = "TIMEBOX_WEBHOOK_SECRET";

const DATABASE_FILE: &str = "timebox.db";

/// Loopback port the OAuth redirect comes back to. The provider must allow
/// `http://127.0.0.1:<port>/auth/callback` as a redirect URL.
pub const DEFAULT_CALLBACK_PORT: u16 = 8765;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub url: String,
    pub anon_key: String,
    /// 0 picks any free port.
    pub callback_port: u16,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            callback_port: DEFAULT_CALLBACK_PORT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    pub checkout_url: String,
    pub webhook_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub identity: IdentityConfig,
    pub billing: BillingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            identity: IdentityConfig::default(),
            billing: BillingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the resolved path and apply environment overrides. A
    /// missing file yields defaults.
    pub fn load() -> Result<Self> {
        let path = config_path();
        let mut config = match path.as_deref() {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => {
                log::info!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Like [`AppConfig::load`], but a malformed file is logged and replaced
    /// by defaults.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config: {:#}, using defaults", e);
                let mut config = Self::default();
                config.apply_env_overrides();
                config
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid config TOML")
    }

    pub fn apply_env_overrides(&mut self) {
        override_from_env(&mut self.identity.url, IDENTITY_URL_ENV);
        override_from_env(&mut self.identity.anon_key, IDENTITY_KEY_ENV);
        override_from_env(&mut self.billing.checkout_url, CHECKOUT_URL_ENV);
        override_from_env(&mut self.billing.webhook_secret, WEBHOOK_SECRET_ENV);
    }

    pub fn identity_configured(&self) -> bool {
        !self.identity.url.is_empty() && !self.identity.anon_key.is_empty()
    }
}

fn override_from_env(field: &mut String, var: &str) {
    if let Ok(value) = std::env::var(var) {
        if !value.trim().is_empty() {
            *field = value.trim().to_string();
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "Timebox", "TimeboxNotes")
}

/// `TIMEBOX_CONFIG` if set, otherwise `config.toml` in the config directory.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

fn default_database_path() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        PathBuf::from(DATABASE_FILE)
    }

    #[cfg(not(debug_assertions))]
    {
        match project_dirs() {
            Some(dirs) => dirs.data_dir().join(DATABASE_FILE),
            None => PathBuf::from(DATABASE_FILE),
        }
    }
}
