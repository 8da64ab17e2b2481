//! Device-creation drafts: what the add-device form collects, validated
//! against the live graph before any request leaves the machine.
//!
//! Over-provisioning is rejected here — a full (or over-full) parent can
//! never gain another child through this path.

use fibrely_api::types::{CapacitySpec, DeviceCreate, InputDto};

use crate::error::CoreError;
use crate::graph::DeviceGraph;
use crate::model::{DeviceKind, NodeKey};

/// Raw form fields for a new device, as typed by the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDraft {
    pub kind: DeviceKind,
    pub name: String,
    /// Split string (`"1x4"`) for MS/SUBMS, integer text for FDB/X2.
    pub capacity: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Validate a draft against its parent and produce the wire request.
///
/// Checks, in order: the parent exists, the kind is legal under the
/// parent, the parent has a free port, the name is non-empty, and the
/// capacity text is well-formed for the kind.
pub fn validate_draft(
    graph: &DeviceGraph,
    parent: &NodeKey,
    draft: &DeviceDraft,
) -> Result<DeviceCreate, CoreError> {
    let ports = graph
        .ports_of(parent)
        .ok_or_else(|| CoreError::ParentNotFound {
            id: parent.id.to_string(),
        })?;

    if !parent.kind.allows_child(draft.kind) {
        return Err(CoreError::KindNotAllowed {
            parent: parent.kind.label().to_owned(),
            child: draft.kind.label().to_owned(),
        });
    }

    if !ports.has_free_port() {
        return Err(CoreError::PortsExhausted {
            id: parent.id.to_string(),
            active: ports.active,
            total: ports.total,
        });
    }

    let name = draft.name.trim();
    if name.is_empty() {
        return Err(CoreError::ValidationFailed {
            field: "name".to_owned(),
            reason: "must not be empty".to_owned(),
        });
    }

    let capacity = parse_capacity(draft.kind, &draft.capacity)?;

    Ok(DeviceCreate {
        kind: draft.kind.as_wire().to_owned(),
        name: name.to_owned(),
        capacity,
        latitude: draft.latitude,
        longitude: draft.longitude,
        input: InputDto {
            kind: parent.kind.as_wire().to_owned(),
            id: parent.id.to_string(),
            port: None,
        },
    })
}

/// Strict capacity parse for creation. Load-time parsing is forgiving
/// (malformed → 0 ports); new devices must declare a real capacity.
fn parse_capacity(kind: DeviceKind, raw: &str) -> Result<CapacitySpec, CoreError> {
    let raw = raw.trim();

    if kind.capacity_is_split() {
        let parsed = raw.split_once('x').and_then(|(lanes, ports)| {
            let lanes: u32 = lanes.trim().parse().ok()?;
            let ports: u32 = ports.trim().parse().ok()?;
            (lanes >= 1 && ports >= 1).then_some(())
        });
        if parsed.is_none() {
            return Err(CoreError::ValidationFailed {
                field: "capacity".to_owned(),
                reason: format!("expected a split like 1x4, got {raw:?}"),
            });
        }
        Ok(CapacitySpec::Split(raw.to_owned()))
    } else {
        let ports: u32 = raw.parse().map_err(|_| CoreError::ValidationFailed {
            field: "capacity".to_owned(),
            reason: format!("expected a port count, got {raw:?}"),
        })?;
        if ports == 0 {
            return Err(CoreError::ValidationFailed {
                field: "capacity".to_owned(),
                reason: "port count must be at least 1".to_owned(),
            });
        }
        Ok(CapacitySpec::Ports(ports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Capacity, DeviceId, DeviceNode, GeoPoint, InputRef, Olt, OltStatus, OutputRef,
        OutputTarget, PowerState,
    };

    fn graph() -> DeviceGraph {
        let olt = Olt {
            id: DeviceId::from("OLT1"),
            name: None,
            ip: None,
            mac: None,
            serial: None,
            location: Some(GeoPoint {
                latitude: 26.9,
                longitude: 75.8,
            }),
            capacity: Capacity::Ports(8),
            status: OltStatus::Active,
            power: PowerState::On,
            outputs: Vec::new(),
            owned_by: None,
        };
        let full_ms = DeviceNode {
            kind: DeviceKind::Ms,
            id: DeviceId::from("MS-FULL"),
            name: None,
            capacity: Capacity::Split("1x2".to_owned()),
            location: None,
            input: Some(InputRef {
                kind: DeviceKind::Olt,
                id: DeviceId::from("OLT1"),
                port: None,
            }),
            outputs: vec![
                OutputRef {
                    target: OutputTarget::User,
                    id: "U1".to_owned(),
                    description: None,
                },
                OutputRef {
                    target: OutputTarget::User,
                    id: "U2".to_owned(),
                    description: None,
                },
            ],
            attachments: Vec::new(),
        };
        let x2 = DeviceNode {
            kind: DeviceKind::X2,
            id: DeviceId::from("X2-1"),
            name: None,
            capacity: Capacity::Ports(4),
            location: None,
            input: Some(InputRef {
                kind: DeviceKind::Olt,
                id: DeviceId::from("OLT1"),
                port: None,
            }),
            outputs: Vec::new(),
            attachments: Vec::new(),
        };
        DeviceGraph::new(olt, vec![full_ms, x2])
    }

    fn draft(kind: DeviceKind, capacity: &str) -> DeviceDraft {
        DeviceDraft {
            kind,
            name: "New device".to_owned(),
            capacity: capacity.to_owned(),
            latitude: 26.9,
            longitude: 75.8,
        }
    }

    #[test]
    fn valid_fdb_draft_becomes_wire_request() {
        let graph = graph();
        let parent = NodeKey::new(DeviceKind::Olt, "OLT1");

        let req = validate_draft(&graph, &parent, &draft(DeviceKind::Fdb, "8")).expect("valid");
        assert_eq!(req.kind, "fdb");
        assert_eq!(req.name, "New device");
        assert!(matches!(req.capacity, CapacitySpec::Ports(8)));
        assert_eq!(req.input.kind, "olt");
        assert_eq!(req.input.id, "OLT1");
    }

    #[test]
    fn valid_subms_draft_keeps_split_string() {
        let graph = graph();
        let parent = NodeKey::new(DeviceKind::Olt, "OLT1");

        let req =
            validate_draft(&graph, &parent, &draft(DeviceKind::Subms, "1x8")).expect("valid");
        assert!(matches!(req.capacity, CapacitySpec::Split(ref s) if s == "1x8"));
    }

    #[test]
    fn ms_under_x2_is_rejected() {
        let graph = graph();
        let parent = NodeKey::new(DeviceKind::X2, "X2-1");

        let err = validate_draft(&graph, &parent, &draft(DeviceKind::Ms, "1x4"))
            .expect_err("must reject");
        assert!(matches!(err, CoreError::KindNotAllowed { .. }));
    }

    #[test]
    fn x2_under_ms_is_rejected() {
        let graph = graph();
        let parent = NodeKey::new(DeviceKind::Ms, "MS-FULL");

        let err = validate_draft(&graph, &parent, &draft(DeviceKind::X2, "2"))
            .expect_err("must reject");
        assert!(matches!(err, CoreError::KindNotAllowed { .. }));
    }

    #[test]
    fn full_parent_is_rejected() {
        let graph = graph();
        let parent = NodeKey::new(DeviceKind::Ms, "MS-FULL");

        let err = validate_draft(&graph, &parent, &draft(DeviceKind::Fdb, "4"))
            .expect_err("must reject");
        match err {
            CoreError::PortsExhausted { active, total, .. } => {
                assert_eq!(active, 2);
                assert_eq!(total, 2);
            }
            other => panic!("expected PortsExhausted, got {other}"),
        }
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let graph = graph();
        let parent = NodeKey::new(DeviceKind::Ms, "MS-MISSING");

        let err = validate_draft(&graph, &parent, &draft(DeviceKind::Fdb, "4"))
            .expect_err("must reject");
        assert!(matches!(err, CoreError::ParentNotFound { .. }));
    }

    #[test]
    fn creation_capacity_is_strict_unlike_load() {
        let graph = graph();
        let parent = NodeKey::new(DeviceKind::Olt, "OLT1");

        for bad in ["bogus", "4", "0x4", "1x0", ""] {
            let err = validate_draft(&graph, &parent, &draft(DeviceKind::Subms, bad))
                .expect_err("malformed split must reject");
            assert!(matches!(err, CoreError::ValidationFailed { .. }), "{bad}");
        }
        for bad in ["1x4", "zero", "0", ""] {
            let err = validate_draft(&graph, &parent, &draft(DeviceKind::Fdb, bad))
                .expect_err("malformed count must reject");
            assert!(matches!(err, CoreError::ValidationFailed { .. }), "{bad}");
        }
    }

    #[test]
    fn blank_name_is_rejected() {
        let graph = graph();
        let parent = NodeKey::new(DeviceKind::Olt, "OLT1");
        let mut d = draft(DeviceKind::Fdb, "4");
        d.name = "   ".to_owned();

        let err = validate_draft(&graph, &parent, &d).expect_err("must reject");
        assert!(matches!(err, CoreError::ValidationFailed { ref field, .. } if field == "name"));
    }
}
