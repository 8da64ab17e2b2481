//! Domain layer between `fibrely-api` and UI consumers.
//!
//! This crate owns the canonical model and topology logic for the
//! workspace:
//!
//! - **[`DeviceGraph`]** — an indexed, immutable snapshot of one OLT and
//!   its descendant distribution devices. Parent/child structure derives
//!   from `input` back-references; [`DeviceGraph::validate`] rejects
//!   cyclic snapshots outright and reports orphans and outputs/children
//!   disagreements as warnings.
//!
//! - **[`PortSummary`]** — pure total/active/available accounting over a
//!   node's declared capacity and authored outputs list. `available` is
//!   signed; negative means over-provisioned.
//!
//! - **[`DeviceDraft`] / [`validate_draft`]** — creation-form validation
//!   producing the ready-to-send wire request, enforcing the kind
//!   hierarchy (OLT/MS → SUBMS/FDB, SUBMS → FDB, FDB → X2, X2 terminal)
//!   and free-port availability.
//!
//! - **[`convert`]** — backend DTO → model translation, including the
//!   fixed MS/FDB/SUBMS/X2 scan order the renderer depends on.

pub mod convert;
pub mod draft;
pub mod error;
pub mod graph;
pub mod model;
pub mod ports;

// ── Primary re-exports ──────────────────────────────────────────────
pub use convert::graph_from_response;
pub use draft::{DeviceDraft, validate_draft};
pub use error::CoreError;
pub use graph::{ConsistencyReport, DeviceGraph, OutputMismatch, TreeRow};
pub use ports::PortSummary;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Capacity, DeviceId, DeviceKind, DeviceNode, GeoPoint, InputRef, NodeKey, Olt, OltStatus,
    OutputRef, OutputTarget, PowerState,
};
