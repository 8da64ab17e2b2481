//! TOML + environment configuration for the dashboard.
//!
//! Precedence, lowest to highest: built-in defaults, the config file at
//! the platform config dir, `FIBRELY_*` environment variables, CLI flags
//! (applied in `main`).

use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Backend base URL (e.g., "https://isp.example.net").
    pub backend_url: Option<String>,

    /// Reverse-geocoding service base URL.
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,

    /// API key sent as `X-API-KEY` (plaintext — prefer the env var).
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Log file path; logging is file-only while the terminal is raw.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: None,
            geocode_url: default_geocode_url(),
            api_key: None,
            timeout_secs: default_timeout(),
            log_file: None,
        }
    }
}

fn default_geocode_url() -> String {
    "https://nominatim.openstreetmap.org".into()
}

fn default_timeout() -> u64 {
    30
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "fibrely", "fibrely").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fibrely");
    p
}

/// Load the Config from defaults + file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("FIBRELY_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, falling back to defaults when the file is absent or bad.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}
