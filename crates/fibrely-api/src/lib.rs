//! `fibrely-api` — async client for the Fibrely ISP backend.
//!
//! Two HTTP surfaces:
//!
//! - **[`OltClient`]** — the backend REST API: fetches the full OLT device
//!   graph (`get_olt`) and creates child devices (`create_device`).
//! - **[`Geocoder`]** — best-effort reverse geocoding of OLT coordinates
//!   against a Nominatim-compatible endpoint.
//!
//! Wire DTOs live in [`types`] and mirror the backend JSON exactly;
//! `fibrely-core` converts them into canonical domain types.

pub mod client;
pub mod error;
pub mod geocode;
pub mod transport;
pub mod types;

pub use client::OltClient;
pub use error::Error;
pub use geocode::{ADDRESS_FALLBACK, Geocoder};
pub use transport::TransportConfig;
