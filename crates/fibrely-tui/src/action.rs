//! All possible UI actions. Actions are the sole mechanism for state
//! mutation in the TUI.

use std::sync::Arc;

use fibrely_api::types::DeviceCreate;
use fibrely_core::{ConsistencyReport, DeviceGraph, NodeKey};

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Graph data ─────────────────────────────────────────────────
    GraphLoaded {
        graph: Arc<DeviceGraph>,
        report: Arc<ConsistencyReport>,
    },
    GraphLoadFailed(String),
    AddressResolved(String),
    Refetch,

    // ── Add-device flow ────────────────────────────────────────────
    OpenAddFlow(NodeKey),
    CloseDialog,
    /// Validated request ready to POST.
    SubmitCreate(DeviceCreate),
    CreateSucceeded {
        id: String,
    },
    CreateFailed(String),

    // ── Notifications ──────────────────────────────────────────────
    Notify(Notification),
}
