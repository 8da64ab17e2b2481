// ── Core error types ──
//
// User-facing errors from fibrely-core. The `From<fibrely_api::Error>`
// impl translates transport-layer failures into domain-appropriate
// variants so consumers never see raw HTTP details.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Topology errors ──────────────────────────────────────────────
    /// A device lists itself, directly or transitively, as its own
    /// ancestor. The walk fails fast instead of recursing forever.
    #[error("Cyclic topology: {id} is its own ancestor")]
    CyclicTopology { id: String },

    #[error("Parent device not found: {id}")]
    ParentNotFound { id: String },

    // ── Creation validation ──────────────────────────────────────────
    #[error("A {child} cannot attach below a {parent}")]
    KindNotAllowed { parent: String, child: String },

    #[error("No available ports on {id} ({active}/{total} in use)")]
    PortsExhausted { id: String, active: u32, total: u32 },

    #[error("Invalid {field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Backend error: {message}")]
    Api { message: String },
}

impl From<fibrely_api::Error> for CoreError {
    fn from(err: fibrely_api::Error) -> Self {
        Self::Api {
            message: err.to_string(),
        }
    }
}
