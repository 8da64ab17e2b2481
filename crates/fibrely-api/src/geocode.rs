//! Best-effort reverse geocoding for OLT coordinates.
//!
//! Talks to a Nominatim-compatible endpoint. Failures here are never
//! fatal — callers substitute [`ADDRESS_FALLBACK`] and move on.

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Shown in place of an address whenever resolution fails.
pub const ADDRESS_FALLBACK: &str = "Address not available";

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
}

/// Reverse-geocoding client. Cheap to clone.
#[derive(Clone)]
pub struct Geocoder {
    http: reqwest::Client,
    base_url: Url,
}

impl Geocoder {
    /// Build against a Nominatim-compatible base URL
    /// (e.g. `https://nominatim.openstreetmap.org`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Url::parse(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Resolve coordinates to a formatted address string.
    ///
    /// `GET {base}/reverse?lat={lat}&lon={lon}&format=jsonv2`
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<String, Error> {
        let mut url = self.base_url.join("reverse")?;
        url.query_pairs_mut()
            .append_pair("lat", &lat.to_string())
            .append_pair("lon", &lon.to_string())
            .append_pair("format", "jsonv2");
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: "reverse geocoding failed".to_owned(),
            });
        }

        let parsed: ReverseResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;

        parsed.display_name.ok_or(Error::Api {
            status: status.as_u16(),
            message: "no display_name in geocoding response".to_owned(),
        })
    }
}
