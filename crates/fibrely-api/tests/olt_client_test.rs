// Integration tests for `OltClient` and `Geocoder` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fibrely_api::types::{CapacitySpec, DeviceCreate, InputDto};
use fibrely_api::{Error, Geocoder, OltClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, OltClient) {
    let server = MockServer::start().await;
    let client =
        OltClient::from_reqwest(&server.uri(), reqwest::Client::new()).expect("client builds");
    (server, client)
}

fn sample_graph_body() -> serde_json::Value {
    json!({
        "oltId": "OLT1",
        "name": "Central Exchange",
        "oltIp": "10.40.0.2",
        "oltMac": "aa:bb:cc:00:11:22",
        "serialNo": "HWTC-9921",
        "latitude": 26.9124,
        "longitude": 75.7873,
        "oltPower": 8,
        "status": "active",
        "powerStatus": "on",
        "outputs": [
            { "type": "ms", "id": "MS1", "description": "feeder A" }
        ],
        "ms_devices": [
            {
                "ms_id": "MS1",
                "ms_name": "Splitter A",
                "ms_power": "1x4",
                "location": [26.9130, 75.7880],
                "input": { "type": "olt", "id": "OLT1", "port": 1 },
                "outputs": []
            }
        ],
        "fdb_devices": [],
        "subms_devices": [],
        "x2_devices": [],
        "ownedBy": { "id": "ENG-7", "name": "Field Team 7" }
    })
}

// ── get_olt ─────────────────────────────────────────────────────────

#[tokio::test]
async fn get_olt_decodes_full_graph() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/olts/OLT1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_graph_body()))
        .mount(&server)
        .await;

    let graph = client.get_olt("OLT1").await.expect("graph fetch");

    assert_eq!(graph.olt_id, "OLT1");
    assert_eq!(graph.name.as_deref(), Some("Central Exchange"));
    assert_eq!(graph.olt_power, Some(8));
    assert_eq!(graph.status.as_deref(), Some("active"));
    assert_eq!(graph.ms_devices.len(), 1);
    assert_eq!(graph.ms_devices[0].ms_id, "MS1");
    assert_eq!(graph.ms_devices[0].ms_power.as_deref(), Some("1x4"));
    let input = graph.ms_devices[0].input.as_ref().expect("input ref");
    assert_eq!(input.kind, "olt");
    assert_eq!(input.id, "OLT1");
    assert_eq!(
        graph.owned_by.as_ref().and_then(|o| o.name.as_deref()),
        Some("Field Team 7")
    );
}

#[tokio::test]
async fn get_olt_missing_collections_default_empty() {
    let (server, client) = setup().await;

    // Sparse body: backend omits empty arrays entirely.
    Mock::given(method("GET"))
        .and(path("/api/v1/olts/OLT2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "oltId": "OLT2" })))
        .mount(&server)
        .await;

    let graph = client.get_olt("OLT2").await.expect("graph fetch");

    assert!(graph.ms_devices.is_empty());
    assert!(graph.fdb_devices.is_empty());
    assert!(graph.subms_devices.is_empty());
    assert!(graph.x2_devices.is_empty());
    assert!(graph.outputs.is_empty());
    assert_eq!(graph.olt_power, None);
}

#[tokio::test]
async fn get_olt_not_found_surfaces_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/olts/NOPE"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "OLT not found" })),
        )
        .mount(&server)
        .await;

    let err = client.get_olt("NOPE").await.expect_err("should fail");

    assert!(err.is_not_found());
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "OLT not found");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn get_olt_garbage_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/olts/OLT1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let err = client.get_olt("OLT1").await.expect_err("should fail");
    match err {
        Error::Deserialization { body, .. } => assert!(body.contains("proxy error")),
        other => panic!("expected Deserialization error, got {other:?}"),
    }
}

// ── create_device ───────────────────────────────────────────────────

#[tokio::test]
async fn create_device_posts_expected_body() {
    let (server, client) = setup().await;

    let req = DeviceCreate {
        kind: "fdb".to_owned(),
        name: "FDB South".to_owned(),
        capacity: CapacitySpec::Ports(8),
        latitude: 26.9130,
        longitude: 75.7880,
        input: InputDto {
            kind: "ms".to_owned(),
            id: "MS1".to_owned(),
            port: None,
        },
    };

    Mock::given(method("POST"))
        .and(path("/api/v1/olts/OLT1/devices"))
        .and(body_json(json!({
            "type": "fdb",
            "name": "FDB South",
            "capacity": 8,
            "latitude": 26.9130,
            "longitude": 75.7880,
            "input": { "type": "ms", "id": "MS1" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "FDB42" })))
        .mount(&server)
        .await;

    let created = client.create_device("OLT1", &req).await.expect("create");
    assert_eq!(created.id, "FDB42");
}

#[tokio::test]
async fn create_device_split_capacity_serializes_as_string() {
    let (server, client) = setup().await;

    let req = DeviceCreate {
        kind: "subms".to_owned(),
        name: "Sub North".to_owned(),
        capacity: CapacitySpec::Split("1x8".to_owned()),
        latitude: 0.0,
        longitude: 0.0,
        input: InputDto {
            kind: "ms".to_owned(),
            id: "MS1".to_owned(),
            port: Some(2),
        },
    };

    Mock::given(method("POST"))
        .and(path("/api/v1/olts/OLT1/devices"))
        .and(body_json(json!({
            "type": "subms",
            "name": "Sub North",
            "capacity": "1x8",
            "latitude": 0.0,
            "longitude": 0.0,
            "input": { "type": "ms", "id": "MS1", "port": 2 }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "SUBMS9" })))
        .mount(&server)
        .await;

    let created = client.create_device("OLT1", &req).await.expect("create");
    assert_eq!(created.id, "SUBMS9");
}

#[tokio::test]
async fn create_device_rejection_surfaces_message() {
    let (server, client) = setup().await;

    let req = DeviceCreate {
        kind: "x2".to_owned(),
        name: "X2 East".to_owned(),
        capacity: CapacitySpec::Ports(2),
        latitude: 0.0,
        longitude: 0.0,
        input: InputDto {
            kind: "fdb".to_owned(),
            id: "FDB1".to_owned(),
            port: None,
        },
    };

    Mock::given(method("POST"))
        .and(path("/api/v1/olts/OLT1/devices"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "parent is full" })),
        )
        .mount(&server)
        .await;

    let err = client
        .create_device("OLT1", &req)
        .await
        .expect_err("should fail");
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "parent is full");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

// ── API key header ──────────────────────────────────────────────────

#[tokio::test]
async fn api_key_sent_as_header() {
    let server = MockServer::start().await;

    let transport = TransportConfig {
        api_key: Some("sekrit-token".to_owned().into()),
        ..TransportConfig::default()
    };
    let client = OltClient::new(&server.uri(), &transport).expect("client builds");

    Mock::given(method("GET"))
        .and(path("/api/v1/olts/OLT1"))
        .and(header("X-API-KEY", "sekrit-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "oltId": "OLT1" })))
        .mount(&server)
        .await;

    let graph = client.get_olt("OLT1").await.expect("graph fetch");
    assert_eq!(graph.olt_id, "OLT1");
}

// ── Geocoder ────────────────────────────────────────────────────────

#[tokio::test]
async fn reverse_geocode_returns_display_name() {
    let server = MockServer::start().await;
    let geocoder =
        Geocoder::new(&server.uri(), &TransportConfig::default()).expect("geocoder builds");

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "26.9124"))
        .and(query_param("lon", "75.7873"))
        .and(query_param("format", "jsonv2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "display_name": "MI Road, Jaipur, Rajasthan, India"
        })))
        .mount(&server)
        .await;

    let address = geocoder.reverse(26.9124, 75.7873).await.expect("address");
    assert_eq!(address, "MI Road, Jaipur, Rajasthan, India");
}

#[tokio::test]
async fn reverse_geocode_failure_is_an_error_not_a_panic() {
    let server = MockServer::start().await;
    let geocoder =
        Geocoder::new(&server.uri(), &TransportConfig::default()).expect("geocoder builds");

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = geocoder.reverse(1.0, 2.0).await.expect_err("should fail");
    match err {
        Error::Api { status, .. } => assert_eq!(status, 503),
        other => panic!("expected Api error, got {other:?}"),
    }
}
