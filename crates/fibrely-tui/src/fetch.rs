//! Background I/O tasks — connect the API clients to TUI actions.
//!
//! Each task is fire-and-forget: it performs one request and reports the
//! outcome as an [`Action`] through the TUI's action channel. If the app
//! has already shut down, the send fails and the result is dropped.

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use fibrely_api::types::DeviceCreate;
use fibrely_api::{ADDRESS_FALLBACK, Geocoder, OltClient};
use fibrely_core::{CoreError, GeoPoint, graph_from_response};

use crate::action::Action;

/// Fetch the OLT graph, convert, validate, and dispatch the result.
///
/// A cyclic snapshot fails the load outright — the renderer never sees
/// a graph it could loop on.
pub fn spawn_graph_fetch(client: OltClient, olt_id: String, tx: UnboundedSender<Action>) {
    tokio::spawn(async move {
        let action = match client.get_olt(&olt_id).await {
            Ok(resp) => {
                let graph = graph_from_response(resp);
                match graph.validate() {
                    Ok(report) => {
                        debug!(
                            devices = graph.device_count(),
                            warnings = report.warning_count(),
                            "graph snapshot loaded"
                        );
                        Action::GraphLoaded {
                            graph: std::sync::Arc::new(graph),
                            report: std::sync::Arc::new(report),
                        }
                    }
                    Err(e) => Action::GraphLoadFailed(e.to_string()),
                }
            }
            Err(e) => Action::GraphLoadFailed(CoreError::from(e).to_string()),
        };
        let _ = tx.send(action);
    });
}

/// Resolve the OLT's coordinates to an address, best-effort.
///
/// Failures degrade to [`ADDRESS_FALLBACK`]; the user never sees an
/// error from this path.
pub fn spawn_address_lookup(geocoder: Geocoder, point: GeoPoint, tx: UnboundedSender<Action>) {
    tokio::spawn(async move {
        let address = match geocoder.reverse(point.latitude, point.longitude).await {
            Ok(address) => address,
            Err(e) => {
                warn!(error = %e, "reverse geocoding failed");
                ADDRESS_FALLBACK.to_owned()
            }
        };
        let _ = tx.send(Action::AddressResolved(address));
    });
}

/// POST a validated device-creation request and dispatch the outcome.
pub fn spawn_device_create(
    client: OltClient,
    olt_id: String,
    req: DeviceCreate,
    tx: UnboundedSender<Action>,
) {
    tokio::spawn(async move {
        let action = match client.create_device(&olt_id, &req).await {
            Ok(created) => Action::CreateSucceeded { id: created.id },
            Err(e) => Action::CreateFailed(CoreError::from(e).to_string()),
        };
        let _ = tx.send(action);
    });
}
