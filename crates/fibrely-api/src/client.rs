// Hand-crafted async HTTP client for the Fibrely backend REST API.
//
// Base path: /api/v1/
// Auth: X-API-KEY header (optional, injected by TransportConfig)

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{DeviceCreate, DeviceCreated, OltGraphResponse};

// ── Error response shape from the backend ────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Fibrely backend.
///
/// Communicates via JSON REST endpoints under `/api/v1/`. Cheap to clone;
/// clones share the underlying connection pool.
#[derive(Clone)]
pub struct OltClient {
    http: reqwest::Client,
    base_url: Url,
}

impl OltClient {
    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_authed_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Build the base URL ending in `/api/v1/` regardless of whether the
    /// caller supplied the prefix.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api/v1") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/v1/"));
        }

        Ok(url)
    }

    /// Join a relative path (e.g. `"olts/OLT1"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        // base_url always ends with `/api/v1/`, so joining a relative
        // segment keeps the prefix.
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    /// Decode a 2xx body as `T`; map everything else to [`Error::Api`]
    /// using the backend's `{message}` envelope when present.
    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected response")
                        .to_owned()
                });
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        // 204 with an empty body decodes as JSON null, which only works
        // for Option targets; the backend never does this today.
        if status == StatusCode::NO_CONTENT && body.is_empty() {
            return serde_json::from_str("null").map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the full device graph for one OLT.
    ///
    /// `GET /api/v1/olts/{olt_id}`
    pub async fn get_olt(&self, olt_id: &str) -> Result<OltGraphResponse, Error> {
        self.get(&format!("olts/{olt_id}")).await
    }

    /// Create a child device under the given OLT's topology.
    ///
    /// `POST /api/v1/olts/{olt_id}/devices`
    pub async fn create_device(
        &self,
        olt_id: &str,
        req: &DeviceCreate,
    ) -> Result<DeviceCreated, Error> {
        self.post(&format!("olts/{olt_id}/devices"), req).await
    }
}
