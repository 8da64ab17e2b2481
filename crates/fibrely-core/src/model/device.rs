// ── Device domain types ──

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

// ── Kinds and hierarchy ─────────────────────────────────────────────

/// Canonical device kind. The OLT is the root; everything else hangs off
/// it through `input` back-references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Olt,
    Ms,
    Subms,
    Fdb,
    X2,
}

impl DeviceKind {
    /// Parse the backend's kind discriminator. Unknown strings are `None` —
    /// the referencing node is then treated as an orphan.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "olt" => Some(Self::Olt),
            "ms" => Some(Self::Ms),
            "subms" => Some(Self::Subms),
            "fdb" => Some(Self::Fdb),
            "x2" => Some(Self::X2),
            _ => None,
        }
    }

    /// Wire-format discriminator string.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Olt => "olt",
            Self::Ms => "ms",
            Self::Subms => "subms",
            Self::Fdb => "fdb",
            Self::X2 => "x2",
        }
    }

    /// Kinds that may attach below this one. X2 is terminal — it connects
    /// only to end-user premises.
    pub fn allowed_children(self) -> &'static [DeviceKind] {
        match self {
            Self::Olt | Self::Ms => &[Self::Subms, Self::Fdb],
            Self::Subms => &[Self::Fdb],
            Self::Fdb => &[Self::X2],
            Self::X2 => &[],
        }
    }

    /// Whether `child` may attach below this kind.
    pub fn allows_child(self, child: DeviceKind) -> bool {
        self.allowed_children().contains(&child)
    }

    /// Splitter kinds declare capacity as a `"1x4"`-style string;
    /// the rest use a raw port count.
    pub fn capacity_is_split(self) -> bool {
        matches!(self, Self::Ms | Self::Subms)
    }

    /// Uppercase display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Olt => "OLT",
            Self::Ms => "MS",
            Self::Subms => "SUBMS",
            Self::Fdb => "FDB",
            Self::X2 => "X2",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Identity ────────────────────────────────────────────────────────

/// Backend device identifier (opaque string like `"MS1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Kind + id pair uniquely addressing a node in one graph. Ids are only
/// guaranteed unique within a kind, so the pair is the real key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeKey {
    pub kind: DeviceKind,
    pub id: DeviceId,
}

impl NodeKey {
    pub fn new(kind: DeviceKind, id: impl Into<DeviceId>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.as_wire(), self.id)
    }
}

// ── Capacity ────────────────────────────────────────────────────────

/// Declared port capacity of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capacity {
    /// Fan-out declared as a split string, e.g. `"1x4"` = 4 usable outputs.
    Split(String),
    /// Raw usable-port count (OLT, FDB, X2).
    Ports(u32),
    /// Capacity never declared by the backend.
    Undeclared,
}

impl Capacity {
    /// Total usable ports.
    ///
    /// Split strings parse the substring after the literal `x`; a missing
    /// `x` or a non-numeric operand resolves to 0 rather than erroring —
    /// the backend ships such values today and the view must not die on
    /// them. Creation-time validation is strict instead (see `draft`).
    pub fn total(&self) -> u32 {
        match self {
            Self::Split(raw) => raw
                .split_once('x')
                .and_then(|(_, after)| after.trim().parse().ok())
                .unwrap_or(0),
            Self::Ports(n) => *n,
            Self::Undeclared => 0,
        }
    }

    /// Human-readable form for display.
    pub fn display(&self) -> String {
        match self {
            Self::Split(raw) => raw.clone(),
            Self::Ports(n) => n.to_string(),
            Self::Undeclared => "—".to_owned(),
        }
    }
}

// ── Status ──────────────────────────────────────────────────────────

/// OLT operational status. Unrecognized wire values map to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OltStatus {
    Active,
    Inactive,
    Maintenance,
    Error,
    Unknown,
}

impl OltStatus {
    pub fn from_wire(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            "inactive" => Self::Inactive,
            "maintenance" => Self::Maintenance,
            "error" => Self::Error,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Maintenance => "Maintenance",
            Self::Error => "Error",
            Self::Unknown => "Unknown",
        }
    }
}

/// OLT power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerState {
    On,
    Off,
    Unknown,
}

impl PowerState {
    pub fn from_wire(s: &str) -> Self {
        match s {
            "on" => Self::On,
            "off" => Self::Off,
            _ => Self::Unknown,
        }
    }
}

// ── Connectivity fragments ──────────────────────────────────────────

/// Geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Back-reference from a device to its parent. Child discovery derives
/// entirely from these — never from the authored `outputs` lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRef {
    pub kind: DeviceKind,
    pub id: DeviceId,
    pub port: Option<u32>,
}

impl InputRef {
    pub fn parent_key(&self) -> NodeKey {
        NodeKey {
            kind: self.kind,
            id: self.id.clone(),
        }
    }
}

/// What a recorded output connects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputTarget {
    Device(DeviceKind),
    /// End-user drop — counts against ports but is not a device node.
    User,
    /// Backend recorded something this model doesn't know about.
    Unknown,
}

/// One entry of a device's authored downstream list. The list's length is
/// the authoritative *active connection* count for port accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRef {
    pub target: OutputTarget,
    pub id: String,
    pub description: Option<String>,
}

// ── Nodes ───────────────────────────────────────────────────────────

/// A distribution device below the OLT (MS, SUBMS, FDB, or X2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceNode {
    pub kind: DeviceKind,
    pub id: DeviceId,
    pub name: Option<String>,
    pub capacity: Capacity,
    pub location: Option<GeoPoint>,
    /// Absent or unresolvable input makes this node an orphan.
    pub input: Option<InputRef>,
    pub outputs: Vec<OutputRef>,
    pub attachments: Vec<String>,
}

impl DeviceNode {
    pub fn key(&self) -> NodeKey {
        NodeKey {
            kind: self.kind,
            id: self.id.clone(),
        }
    }

    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}

/// The root Optical Line Terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Olt {
    pub id: DeviceId,
    pub name: Option<String>,
    pub ip: Option<IpAddr>,
    pub mac: Option<String>,
    pub serial: Option<String>,
    pub location: Option<GeoPoint>,
    pub capacity: Capacity,
    pub status: OltStatus,
    pub power: PowerState,
    pub outputs: Vec<OutputRef>,
    pub owned_by: Option<String>,
}

impl Olt {
    pub fn key(&self) -> NodeKey {
        NodeKey {
            kind: DeviceKind::Olt,
            id: self.id.clone(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hierarchy_allows_expected_children() {
        assert_eq!(
            DeviceKind::Olt.allowed_children(),
            &[DeviceKind::Subms, DeviceKind::Fdb]
        );
        assert_eq!(
            DeviceKind::Ms.allowed_children(),
            &[DeviceKind::Subms, DeviceKind::Fdb]
        );
        assert_eq!(DeviceKind::Subms.allowed_children(), &[DeviceKind::Fdb]);
        assert_eq!(DeviceKind::Fdb.allowed_children(), &[DeviceKind::X2]);
        assert!(DeviceKind::X2.allowed_children().is_empty());
    }

    #[test]
    fn x2_is_terminal() {
        assert!(!DeviceKind::X2.allows_child(DeviceKind::Ms));
        assert!(!DeviceKind::X2.allows_child(DeviceKind::X2));
    }

    #[test]
    fn kind_round_trips_through_wire_names() {
        for kind in [
            DeviceKind::Olt,
            DeviceKind::Ms,
            DeviceKind::Subms,
            DeviceKind::Fdb,
            DeviceKind::X2,
        ] {
            assert_eq!(DeviceKind::from_wire(kind.as_wire()), Some(kind));
        }
        assert_eq!(DeviceKind::from_wire("router"), None);
    }

    #[test]
    fn split_capacity_parses_second_operand() {
        assert_eq!(Capacity::Split("1x8".to_owned()).total(), 8);
        assert_eq!(Capacity::Split("2x16".to_owned()).total(), 16);
        assert_eq!(Capacity::Split("1x 4".to_owned()).total(), 4);
    }

    #[test]
    fn malformed_split_capacity_resolves_to_zero() {
        assert_eq!(Capacity::Split("bogus".to_owned()).total(), 0);
        assert_eq!(Capacity::Split("8".to_owned()).total(), 0);
        assert_eq!(Capacity::Split("1xfour".to_owned()).total(), 0);
        assert_eq!(Capacity::Split(String::new()).total(), 0);
    }

    #[test]
    fn undeclared_capacity_is_zero() {
        assert_eq!(Capacity::Undeclared.total(), 0);
        assert_eq!(Capacity::Ports(8).total(), 8);
    }
}
