//! End-to-end smoke tests for the full heatwatchd stack.
//!
//! Each test assembles the complete application (in-memory `SQLite`,
//! simulated probes, a real control loop, the real axum router) and
//! exercises the HTTP layer via `tower::ServiceExt::oneshot` — no TCP port
//! is bound and no hardware is touched.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tokio::sync::watch;
use tower::ServiceExt;

use heatwatch_adapter_http_axum::router;
use heatwatch_adapter_http_axum::state::AppState;
use heatwatch_adapter_outlet_http::TasmotaTransport;
use heatwatch_adapter_storage_sqlite_sqlx::{Config, SqliteReadingStore};
use heatwatch_app::control_loop::{ControlLoop, LoopSettings};
use heatwatch_app::outlet_controller::{OutletController, RetryPolicy};
use heatwatch_app::registry::{SensorDescriptor, SensorRegistry};
use heatwatch_app::simulated::SimulatedProbe;
use heatwatch_domain::control::{ControlThresholds, DecisionEngine};
use heatwatch_domain::sensor::{SensorId, SensorKind, SensorRole};

struct Harness {
    control: ControlLoop<TasmotaTransport, SqliteReadingStore>,
    app: axum::Router,
}

/// Build a fully-wired stack backed by an in-memory `SQLite` database,
/// two simulated sensors and an unreachable outlet running in simulation.
async fn harness(boiler: f64, chimney: f64) -> Harness {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");
    let pool = db.pool().clone();

    let mut registry = SensorRegistry::new();
    registry.register(
        SensorDescriptor {
            id: SensorId::new("boiler").unwrap(),
            name: "Boiler".to_owned(),
            kind: SensorKind::Simulated,
            role: SensorRole::Boiler,
            enabled: true,
        },
        Box::new(SimulatedProbe::new(boiler)),
    );
    registry.register(
        SensorDescriptor {
            id: SensorId::new("chimney").unwrap(),
            name: "Chimney".to_owned(),
            kind: SensorKind::Simulated,
            role: SensorRole::Chimney,
            enabled: true,
        },
        Box::new(SimulatedProbe::new(chimney)),
    );

    let (_stop_tx, stop_rx) = watch::channel(false);
    let outlet: OutletController<TasmotaTransport> =
        OutletController::new(None, RetryPolicy::default(), true, stop_rx.clone());

    let control = ControlLoop::new(
        registry,
        Some(outlet),
        DecisionEngine::new(ControlThresholds::default()),
        SqliteReadingStore::new(pool.clone()),
        LoopSettings::default(),
        stop_rx,
    );

    let state = AppState::new(control.subscribe(), SqliteReadingStore::new(pool));
    let app = router::build(state);

    Harness { control, app }
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let harness = harness(55.0, 150.0).await;
    let resp = harness
        .app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_publish_status_after_first_tick() {
    let mut harness = harness(55.0, 150.0).await;
    harness.control.tick().await;

    let (status, json) = get_json(harness.app, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["boiler_temp"], 55.0);
    assert_eq!(json["chimney_temp"], 150.0);
    assert_eq!(json["phase"], "running");
    assert_eq!(json["sensors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn should_switch_simulated_outlet_and_record_event_when_boiler_critical() {
    let mut harness = harness(87.0, 150.0).await;
    harness.control.tick().await;

    let (status, json) = get_json(harness.app.clone(), "/api/outlet").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mode"], "simulated_offline");
    assert_eq!(json["reported_on"], true);
    assert_eq!(json["last_reason"], "boiler_critical");

    let (status, json) = get_json(harness.app, "/api/history/events").await;
    assert_eq!(status, StatusCode::OK);
    let events = json.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["action"], "on");
    assert_eq!(events[0]["reason"], "boiler_critical");
}

#[tokio::test]
async fn should_serve_persisted_temperature_history() {
    let mut harness = harness(55.0, 150.0).await;
    harness.control.tick().await;
    harness.control.tick().await;

    let (status, json) = get_json(harness.app.clone(), "/api/history/temperatures").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 4);

    let (status, json) =
        get_json(harness.app, "/api/history/temperatures?sensor_id=chimney").await;
    assert_eq!(status, StatusCode::OK);
    let readings = json.as_array().unwrap();
    assert_eq!(readings.len(), 2);
    assert!(readings.iter().all(|r| r["sensor_id"] == "chimney"));
}

#[tokio::test]
async fn should_expose_sensor_detail_and_404_for_unknown() {
    let mut harness = harness(55.0, 150.0).await;
    harness.control.tick().await;

    let (status, json) = get_json(harness.app.clone(), "/api/sensor/boiler").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["temperature"], 55.0);
    assert_eq!(json["role"], "boiler");

    let (status, _) = get_json(harness.app, "/api/sensor/attic").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_summarise_system_state() {
    let mut harness = harness(55.0, 90.0).await;
    harness.control.tick().await;

    let (status, json) = get_json(harness.app, "/api/system").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sensors_total"], 2);
    assert_eq!(json["sensors_available"], 2);
    assert_eq!(json["phase"], "cooling_down");
    assert_eq!(json["outlet_mode"], "simulated_offline");
}
