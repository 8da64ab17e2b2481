// Shared transport configuration for building reqwest::Client instances.
//
// The backend client and the geocoder share timeout and auth-header
// settings through this module, avoiding duplicated builder logic.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    /// API token for the backend, sent as `X-API-KEY`. The geocoder
    /// never receives it.
    pub api_key: Option<SecretString>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            api_key: None,
        }
    }
}

impl TransportConfig {
    /// Build a plain `reqwest::Client` (no auth headers) from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("fibrely/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))
    }

    /// Build a `reqwest::Client` with the `X-API-KEY` header injected,
    /// if a key is configured.
    pub fn build_authed_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        if let Some(ref key) = self.api_key {
            let mut value = HeaderValue::from_str(key.expose_secret()).map_err(|e| {
                Error::Configuration(format!("invalid API key header value: {e}"))
            })?;
            value.set_sensitive(true);
            headers.insert("X-API-KEY", value);
        }

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("fibrely/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))
    }
}
