//! End-to-end smoke tests for the full dsbridged stack.
//!
//! Each test spins up the complete application (simulated dSS, in-memory
//! `SQLite`, real integration, real axum router) and exercises the HTTP layer
//! via `tower::ServiceExt::oneshot`. No TCP port is bound.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use dsbridge_adapter_http_axum::router;
use dsbridge_adapter_http_axum::state::AppState;
use dsbridge_adapter_storage_sqlite_sqlx::{Config, Database, SqliteStateRepository};
use dsbridge_adapter_virtual::{VirtualConfig, VirtualServer};
use dsbridge_app::event_bus::InProcessEventBus;
use dsbridge_app::integration::{ConnectionParams, DigitalStromIntegration};
use dsbridge_app::ports::Integration;
use dsbridge_app::registry::IntegrationRegistry;
use dsbridge_domain::entity::EntityState;
use dsbridge_domain::error::{ConfigurationError, DsBridgeError};
use dsbridge_domain::event::EventType;
use dsbridge_domain::id::EntityId;
use dsbridge_domain::service::Service;

const TOKEN: &str = "app-token";
const SLUG: &str = "dss_local_8080";
const KITCHEN: &str = "dslight_apartment_2_1_0";
const LIVING: &str = "dslight_apartment_1_1_0";
const LIVING_DIM: &str = "dslight_apartment_1_1_1";
const LIVING_BLINDS: &str = "dscover_apartment_1_2_0";

type Bridge = DigitalStromIntegration<
    Arc<VirtualServer>,
    Arc<VirtualServer>,
    SqliteStateRepository,
    Arc<InProcessEventBus>,
>;

struct Stack {
    server: Arc<VirtualServer>,
    db: Database,
    event_bus: Arc<InProcessEventBus>,
    registry: Arc<IntegrationRegistry<Bridge>>,
}

impl Stack {
    fn app(&self) -> axum::Router {
        router::build(AppState::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.event_bus),
        ))
    }

    fn bridge(&self) -> Arc<Bridge> {
        self.registry.get(SLUG).unwrap()
    }
}

fn params(token: Option<&str>) -> ConnectionParams {
    ConnectionParams {
        token: token.map(str::to_string),
        retry_delay: Duration::ZERO,
        ..ConnectionParams::default()
    }
}

fn simulated() -> Arc<VirtualServer> {
    Arc::new(VirtualServer::new(VirtualConfig {
        token: TOKEN.to_string(),
        stack_delay: Duration::from_millis(10),
        ..VirtualConfig::default()
    }))
}

async fn database() -> Database {
    Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise")
}

async fn bridge(
    server: &Arc<VirtualServer>,
    db: &Database,
    event_bus: &Arc<InProcessEventBus>,
) -> Result<Bridge, DsBridgeError> {
    DigitalStromIntegration::setup(
        params(Some(TOKEN)),
        Arc::clone(server),
        Arc::clone(server),
        SqliteStateRepository::new(db.pool().clone()),
        Arc::clone(event_bus),
    )
    .await
}

/// Build a fully-wired, started stack.
async fn stack() -> Stack {
    let server = simulated();
    let db = database().await;
    let event_bus = Arc::new(InProcessEventBus::default());

    let registry = IntegrationRegistry::new();
    registry
        .insert(bridge(&server, &db, &event_bus).await.unwrap())
        .unwrap();
    registry.start_all().await.unwrap();

    Stack {
        server,
        db,
        event_bus,
        registry: Arc::new(registry),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn wait_for_state(bridge: &Bridge, id: &str, expected: EntityState) {
    let id = EntityId::new(id);
    for _ in 0..200 {
        if bridge.entity(&id).unwrap().state == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("{id} never reached {expected}");
}

// ---------------------------------------------------------------------------
// Health check and discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let stack = stack().await;
    let resp = stack.app().oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_list_configured_server() {
    let stack = stack().await;
    let resp = stack.app().oneshot(get("/api/servers")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json[0]["slug"], SLUG);
    assert_eq!(json[0]["title"], "Apartment (dss.local:8080)");
    assert_eq!(json[0]["entities"], 13);
}

#[tokio::test]
async fn should_expose_discovered_entities() {
    let stack = stack().await;
    let resp = stack
        .app()
        .oneshot(get("/api/servers/dss_local_8080/entities"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let entities = json.as_array().unwrap();
    let count = |class: &str| {
        entities
            .iter()
            .filter(|entity| entity["class"] == class)
            .count()
    };
    assert_eq!(count("light"), 4);
    assert_eq!(count("cover"), 1);
    assert_eq!(count("switch"), 2);
    assert_eq!(count("scene"), 6);

    let living = entities
        .iter()
        .find(|entity| entity["id"] == LIVING)
        .unwrap();
    assert_eq!(living["name"], "Living room off");
    assert_eq!(living["state"], "unknown");
    assert_eq!(living["device"]["manufacturer"], "digitalSTROM AG");
}

// ---------------------------------------------------------------------------
// Service calls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_turn_light_on_and_persist_state() {
    let stack = stack().await;
    let resp = stack
        .app()
        .oneshot(post(&format!(
            "/api/servers/{SLUG}/entities/{KITCHEN}/turn_on"
        )))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["state"], "on");

    let stored = SqliteStateRepository::new(stack.db.pool().clone())
        .get(&EntityId::new(KITCHEN))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.state, EntityState::On);

    // The echoed callScene event keeps the light on.
    tokio::time::sleep(Duration::from_millis(50)).await;
    wait_for_state(&stack.bridge(), KITCHEN, EntityState::On).await;
}

#[tokio::test]
async fn should_activate_plain_scene() {
    let stack = stack().await;
    let mut events = stack.event_bus.subscribe();

    let resp = stack
        .app()
        .oneshot(post(&format!(
            "/api/servers/{SLUG}/entities/dsscene_apartment_0_76/activate"
        )))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let event = events.recv().await.unwrap();
    assert_eq!(event.event_type, EventType::SceneActivated);
}

#[tokio::test]
async fn should_reject_unknown_service() {
    let stack = stack().await;
    let resp = stack
        .app()
        .oneshot(post(&format!("/api/servers/{SLUG}/entities/{KITCHEN}/dim")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_return_not_found_for_unknown_entity() {
    let stack = stack().await;
    let resp = stack
        .app()
        .oneshot(get(&format!("/api/servers/{SLUG}/entities/dslight_nope")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_report_offline_server_as_bad_gateway() {
    let stack = stack().await;
    stack.server.fail_next(1);

    let resp = stack
        .app()
        .oneshot(post(&format!(
            "/api/servers/{SLUG}/entities/{KITCHEN}/turn_on"
        )))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let entity = stack.bridge().entity(&EntityId::new(KITCHEN)).unwrap();
    assert_eq!(entity.state, EntityState::Unknown);
}

// ---------------------------------------------------------------------------
// Events from the server
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_follow_scene_calls_made_elsewhere() {
    let stack = stack().await;

    // A wall switch calls the kitchen "on" preset.
    stack
        .server
        .inject(serde_json::json!({
            "name": "callScene",
            "properties": {"zoneID": 2, "groupID": 1, "sceneID": 5}
        }))
        .await;
    wait_for_state(&stack.bridge(), KITCHEN, EntityState::On).await;

    // A broadcast "off" for zone 2 turns it back off.
    stack
        .server
        .inject(serde_json::json!({
            "name": "callScene",
            "properties": {"zoneID": 2, "groupID": 1, "sceneID": 0}
        }))
        .await;
    wait_for_state(&stack.bridge(), KITCHEN, EntityState::Off).await;

    let living = stack.bridge().entity(&EntityId::new(LIVING)).unwrap();
    assert_eq!(living.state, EntityState::Unknown);
}

#[tokio::test]
async fn should_apply_group_broadcast_to_every_light_in_zone() {
    let stack = stack().await;

    stack
        .server
        .inject(serde_json::json!({
            "name": "callScene",
            "properties": {"zoneID": 1, "groupID": 1, "sceneID": 5}
        }))
        .await;
    wait_for_state(&stack.bridge(), LIVING, EntityState::On).await;
    wait_for_state(&stack.bridge(), LIVING_DIM, EntityState::On).await;

    stack
        .server
        .inject(serde_json::json!({
            "name": "callScene",
            "properties": {"zoneID": 1, "groupID": 1, "sceneID": 0}
        }))
        .await;
    wait_for_state(&stack.bridge(), LIVING, EntityState::Off).await;
    wait_for_state(&stack.bridge(), LIVING_DIM, EntityState::Off).await;

    let blinds = stack.bridge().entity(&EntityId::new(LIVING_BLINDS)).unwrap();
    assert_eq!(blinds.state, EntityState::Unknown);
}

#[tokio::test]
async fn should_ignore_malformed_events() {
    let stack = stack().await;
    stack
        .server
        .inject(serde_json::json!({"name": "callScene", "properties": {"zoneID": "two"}}))
        .await;
    stack
        .server
        .inject(serde_json::json!({
            "name": "callScene",
            "properties": {"zoneID": 2, "groupID": 1, "sceneID": 5}
        }))
        .await;

    wait_for_state(&stack.bridge(), KITCHEN, EntityState::On).await;
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_restore_state_after_restart() {
    let stack = stack().await;
    stack
        .bridge()
        .handle_service_call(&EntityId::new(KITCHEN), Service::TurnOn)
        .await
        .unwrap();
    stack.registry.stop_all().await.unwrap();

    let restarted = bridge(&stack.server, &stack.db, &stack.event_bus)
        .await
        .unwrap();
    let kitchen = restarted.entity(&EntityId::new(KITCHEN)).unwrap();
    assert_eq!(kitchen.state, EntityState::On);
    let living = restarted.entity(&EntityId::new(LIVING)).unwrap();
    assert_eq!(living.state, EntityState::Unknown);
}

#[tokio::test]
async fn should_reject_token_refused_by_server() {
    let server = simulated();
    let db = database().await;

    let result = DigitalStromIntegration::setup(
        params(Some("not-the-token")),
        Arc::clone(&server),
        Arc::clone(&server),
        SqliteStateRepository::new(db.pool().clone()),
        Arc::new(InProcessEventBus::default()),
    )
    .await;

    assert!(matches!(
        result,
        Err(DsBridgeError::Configuration(ConfigurationError::InvalidToken))
    ));
}

#[tokio::test]
async fn should_not_be_ready_while_server_offline() {
    let server = simulated();
    server.fail_next(2);
    let db = database().await;
    let event_bus = Arc::new(InProcessEventBus::default());

    let result = bridge(&server, &db, &event_bus).await;
    assert!(matches!(result, Err(DsBridgeError::NotReady(_))));

    let retried = bridge(&server, &db, &event_bus).await;
    assert!(retried.is_ok());
}

#[tokio::test]
async fn should_require_token() {
    let server = simulated();
    let db = database().await;

    let result = DigitalStromIntegration::setup(
        params(None),
        Arc::clone(&server),
        Arc::clone(&server),
        SqliteStateRepository::new(db.pool().clone()),
        Arc::new(InProcessEventBus::default()),
    )
    .await;

    assert!(matches!(
        result,
        Err(DsBridgeError::Configuration(ConfigurationError::MissingToken))
    ));
}
