//! Wire-format types for the Fibrely backend REST API.
//!
//! These mirror the backend JSON exactly (camelCase identity fields,
//! per-kind `{kind}_id` / `{kind}_name` / `{kind}_power` device fields).
//! `fibrely-core` converts them into canonical domain types — consumers
//! of the workspace never touch these directly.

use serde::{Deserialize, Serialize};

// ── Shared fragments ─────────────────────────────────────────────────

/// Back-reference from a device to its parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDto {
    /// Parent device kind: `"olt" | "ms" | "subms" | "fdb" | "x2"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    /// Optional parent port index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
}

/// Downstream connection entry. The backend maintains these by hand;
/// targets may be other devices or end-user drops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDto {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Owner reference attached to the OLT response.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnedByDto {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

// ── Device collections ───────────────────────────────────────────────

/// MS (mini-splitter) device. Capacity is a split string, e.g. `"1x4"`.
#[derive(Debug, Clone, Deserialize)]
pub struct MsDeviceDto {
    pub ms_id: String,
    #[serde(default)]
    pub ms_name: Option<String>,
    #[serde(default)]
    pub ms_power: Option<String>,
    /// `[latitude, longitude]`.
    #[serde(default)]
    pub location: Option<[f64; 2]>,
    #[serde(default)]
    pub input: Option<InputDto>,
    #[serde(default)]
    pub outputs: Vec<OutputDto>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// SUBMS (sub-splitter) device. Capacity is a split string.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmsDeviceDto {
    pub subms_id: String,
    #[serde(default)]
    pub subms_name: Option<String>,
    #[serde(default)]
    pub subms_power: Option<String>,
    #[serde(default)]
    pub location: Option<[f64; 2]>,
    #[serde(default)]
    pub input: Option<InputDto>,
    #[serde(default)]
    pub outputs: Vec<OutputDto>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// FDB (fibre distribution box). Capacity is a raw port count.
#[derive(Debug, Clone, Deserialize)]
pub struct FdbDeviceDto {
    pub fdb_id: String,
    #[serde(default)]
    pub fdb_name: Option<String>,
    #[serde(default)]
    pub fdb_power: Option<u32>,
    #[serde(default)]
    pub location: Option<[f64; 2]>,
    #[serde(default)]
    pub input: Option<InputDto>,
    #[serde(default)]
    pub outputs: Vec<OutputDto>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// X2 terminal distribution device. Capacity is a raw port count.
#[derive(Debug, Clone, Deserialize)]
pub struct X2DeviceDto {
    pub x2_id: String,
    #[serde(default)]
    pub x2_name: Option<String>,
    #[serde(default)]
    pub x2_power: Option<u32>,
    #[serde(default)]
    pub location: Option<[f64; 2]>,
    #[serde(default)]
    pub input: Option<InputDto>,
    #[serde(default)]
    pub outputs: Vec<OutputDto>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

// ── OLT graph response ───────────────────────────────────────────────

/// Full OLT snapshot: root identity plus all four embedded device arrays.
/// Fetched once per topology view.
#[derive(Debug, Clone, Deserialize)]
pub struct OltGraphResponse {
    #[serde(rename = "oltId")]
    pub olt_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "oltIp")]
    pub olt_ip: Option<String>,
    #[serde(default, rename = "oltMac")]
    pub olt_mac: Option<String>,
    #[serde(default, rename = "serialNo")]
    pub serial_no: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Declared port capacity of the OLT.
    #[serde(default, rename = "oltPower")]
    pub olt_power: Option<u32>,
    /// `active | inactive | maintenance | error`.
    #[serde(default)]
    pub status: Option<String>,
    /// `on | off`.
    #[serde(default, rename = "powerStatus")]
    pub power_status: Option<String>,
    #[serde(default)]
    pub outputs: Vec<OutputDto>,
    #[serde(default)]
    pub ms_devices: Vec<MsDeviceDto>,
    #[serde(default)]
    pub fdb_devices: Vec<FdbDeviceDto>,
    #[serde(default)]
    pub subms_devices: Vec<SubmsDeviceDto>,
    #[serde(default)]
    pub x2_devices: Vec<X2DeviceDto>,
    #[serde(default, rename = "ownedBy")]
    pub owned_by: Option<OwnedByDto>,
}

// ── Device creation ──────────────────────────────────────────────────

/// Capacity payload for device creation: a raw port count for FDB/X2,
/// a split string for MS/SUBMS.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CapacitySpec {
    Ports(u32),
    Split(String),
}

/// Request body for `POST /api/v1/olts/{olt_id}/devices`.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceCreate {
    /// Device kind to create: `"ms" | "subms" | "fdb" | "x2"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub capacity: CapacitySpec,
    pub latitude: f64,
    pub longitude: f64,
    /// Parent attachment point.
    pub input: InputDto,
}

/// Response body for a successful device creation.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceCreated {
    pub id: String,
}
