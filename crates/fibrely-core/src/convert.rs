//! Conversion from `fibrely-api` wire DTOs into the canonical model.
//!
//! The backend spells every device collection differently
//! (`ms_id`/`ms_power`, `fdb_id`/`fdb_power`, …); this module flattens
//! them into uniform [`DeviceNode`]s, concatenated in the fixed scan
//! order the renderer depends on: MS, FDB, SUBMS, X2.

use fibrely_api::types::{
    FdbDeviceDto, InputDto, MsDeviceDto, OltGraphResponse, OutputDto, SubmsDeviceDto, X2DeviceDto,
};

use crate::graph::DeviceGraph;
use crate::model::{
    Capacity, DeviceId, DeviceKind, DeviceNode, GeoPoint, InputRef, Olt, OltStatus, OutputRef,
    OutputTarget, PowerState,
};

/// Decode a full backend snapshot into an indexed [`DeviceGraph`].
pub fn graph_from_response(resp: OltGraphResponse) -> DeviceGraph {
    let olt = Olt {
        id: DeviceId::from(resp.olt_id),
        name: resp.name,
        ip: resp.olt_ip.and_then(|s| s.parse().ok()),
        mac: resp.olt_mac,
        serial: resp.serial_no,
        location: match (resp.latitude, resp.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        },
        capacity: resp.olt_power.map_or(Capacity::Undeclared, Capacity::Ports),
        status: resp
            .status
            .as_deref()
            .map_or(OltStatus::Unknown, OltStatus::from_wire),
        power: resp
            .power_status
            .as_deref()
            .map_or(PowerState::Unknown, PowerState::from_wire),
        outputs: convert_outputs(resp.outputs),
        owned_by: resp.owned_by.and_then(|o| o.name.or(o.id)),
    };

    // Fixed scan order: MS, FDB, SUBMS, X2.
    let mut devices: Vec<DeviceNode> = Vec::with_capacity(
        resp.ms_devices.len()
            + resp.fdb_devices.len()
            + resp.subms_devices.len()
            + resp.x2_devices.len(),
    );
    devices.extend(resp.ms_devices.into_iter().map(convert_ms));
    devices.extend(resp.fdb_devices.into_iter().map(convert_fdb));
    devices.extend(resp.subms_devices.into_iter().map(convert_subms));
    devices.extend(resp.x2_devices.into_iter().map(convert_x2));

    DeviceGraph::new(olt, devices)
}

fn convert_ms(dto: MsDeviceDto) -> DeviceNode {
    DeviceNode {
        kind: DeviceKind::Ms,
        id: DeviceId::from(dto.ms_id),
        name: dto.ms_name,
        capacity: dto.ms_power.map_or(Capacity::Undeclared, Capacity::Split),
        location: convert_location(dto.location),
        input: dto.input.and_then(convert_input),
        outputs: convert_outputs(dto.outputs),
        attachments: dto.attachments,
    }
}

fn convert_subms(dto: SubmsDeviceDto) -> DeviceNode {
    DeviceNode {
        kind: DeviceKind::Subms,
        id: DeviceId::from(dto.subms_id),
        name: dto.subms_name,
        capacity: dto
            .subms_power
            .map_or(Capacity::Undeclared, Capacity::Split),
        location: convert_location(dto.location),
        input: dto.input.and_then(convert_input),
        outputs: convert_outputs(dto.outputs),
        attachments: dto.attachments,
    }
}

fn convert_fdb(dto: FdbDeviceDto) -> DeviceNode {
    DeviceNode {
        kind: DeviceKind::Fdb,
        id: DeviceId::from(dto.fdb_id),
        name: dto.fdb_name,
        capacity: dto.fdb_power.map_or(Capacity::Undeclared, Capacity::Ports),
        location: convert_location(dto.location),
        input: dto.input.and_then(convert_input),
        outputs: convert_outputs(dto.outputs),
        attachments: dto.attachments,
    }
}

fn convert_x2(dto: X2DeviceDto) -> DeviceNode {
    DeviceNode {
        kind: DeviceKind::X2,
        id: DeviceId::from(dto.x2_id),
        name: dto.x2_name,
        capacity: dto.x2_power.map_or(Capacity::Undeclared, Capacity::Ports),
        location: convert_location(dto.location),
        input: dto.input.and_then(convert_input),
        outputs: convert_outputs(dto.outputs),
        attachments: dto.attachments,
    }
}

fn convert_location(loc: Option<[f64; 2]>) -> Option<GeoPoint> {
    loc.map(|[latitude, longitude]| GeoPoint {
        latitude,
        longitude,
    })
}

/// An unrecognized parent kind makes the node an orphan rather than
/// failing the load.
fn convert_input(dto: InputDto) -> Option<InputRef> {
    let kind = DeviceKind::from_wire(&dto.kind)?;
    Some(InputRef {
        kind,
        id: DeviceId::from(dto.id),
        port: dto.port,
    })
}

fn convert_outputs(dtos: Vec<OutputDto>) -> Vec<OutputRef> {
    dtos.into_iter()
        .map(|dto| OutputRef {
            target: match dto.kind.as_str() {
                "user" => OutputTarget::User,
                other => DeviceKind::from_wire(other)
                    .map_or(OutputTarget::Unknown, OutputTarget::Device),
            },
            id: dto.id,
            description: dto.description,
        })
        .collect()
}
