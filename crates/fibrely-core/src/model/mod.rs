//! Canonical domain model for the OLT device graph.

mod device;

pub use device::{
    Capacity, DeviceId, DeviceKind, DeviceNode, GeoPoint, InputRef, NodeKey, Olt, OltStatus,
    OutputRef, OutputTarget, PowerState,
};
