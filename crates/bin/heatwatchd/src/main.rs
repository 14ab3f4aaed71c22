//! # heatwatchd — boiler watchdog daemon
//!
//! Composition root that wires all adapters together and runs the system.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env var overrides) and validate it
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct probes, the sensor registry and the outlet transport
//! - Assemble and spawn the control loop
//! - Build the axum router, bind to a TCP port and serve the monitoring API
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no control logic belongs here.

mod config;

use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use heatwatch_adapter_http_axum::state::AppState;
use heatwatch_adapter_outlet_http::{CloudPlugConfig, CloudPlugTransport, TasmotaTransport};
use heatwatch_adapter_probe_linux::{Ds18b20Probe, Max31855Probe};
use heatwatch_adapter_storage_sqlite_sqlx::{Config as DbConfig, SqliteReadingStore};
use heatwatch_app::control_loop::ControlLoop;
use heatwatch_app::outlet_controller::OutletController;
use heatwatch_app::ports::{OutletReply, OutletRequest, OutletTransport, TransportError};
use heatwatch_app::registry::{SensorDescriptor, SensorRegistry};
use heatwatch_app::simulated::SimulatedProbe;
use heatwatch_domain::control::DecisionEngine;
use heatwatch_domain::sensor::SensorId;

use crate::config::{Config, OutletKind, ProbeKind};

/// Runtime selection of the configured plug protocol.
///
/// The control loop is generic over one transport type; this enum is that
/// type, delegating to whichever protocol the config picked.
enum Transport {
    Tasmota(TasmotaTransport),
    Cloud(CloudPlugTransport),
}

impl OutletTransport for Transport {
    fn endpoint(&self) -> &str {
        match self {
            Self::Tasmota(t) => t.endpoint(),
            Self::Cloud(t) => t.endpoint(),
        }
    }

    async fn execute(&self, request: OutletRequest) -> Result<OutletReply, TransportError> {
        match self {
            Self::Tasmota(t) => t.execute(request).await,
            Self::Cloud(t) => t.execute(request).await,
        }
    }
}

fn build_registry(config: &Config) -> Result<SensorRegistry, Box<dyn std::error::Error>> {
    let mut registry = SensorRegistry::new();
    for sensor in &config.sensors {
        let descriptor = SensorDescriptor {
            id: SensorId::new(sensor.id.as_str())?,
            name: sensor.name.clone().unwrap_or_else(|| sensor.id.clone()),
            kind: sensor.kind.sensor_kind(),
            role: sensor.role,
            enabled: sensor.enabled,
        };
        let probe: Box<dyn heatwatch_app::ports::TemperatureProbe> = match sensor.kind {
            ProbeKind::Ds18b20 => Box::new(Ds18b20Probe::new(
                sensor.address.as_deref().unwrap_or(&sensor.id),
            )),
            ProbeKind::Max31855 => {
                // Presence of `device` is enforced by config validation.
                let device = sensor.device.clone().unwrap_or_default();
                Box::new(Max31855Probe::new(device))
            }
            ProbeKind::Simulated => Box::new(SimulatedProbe::with_jitter(
                sensor.base_temperature,
                sensor.jitter,
            )),
        };
        registry.register(descriptor, probe);
    }
    Ok(registry)
}

fn build_transport(config: &Config) -> Result<Option<Transport>, Box<dyn std::error::Error>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.outlet.request_timeout_secs.max(1)))
        .build()?;
    let transport = match config.outlet.kind {
        OutletKind::None => None,
        OutletKind::Tasmota => {
            let endpoint = config.outlet.endpoint.clone().unwrap_or_default();
            Some(Transport::Tasmota(TasmotaTransport::new(endpoint, client)))
        }
        OutletKind::Cloud => Some(Transport::Cloud(CloudPlugTransport::new(
            CloudPlugConfig {
                username: config.outlet.username.clone().unwrap_or_default(),
                password: config.outlet.password.clone().unwrap_or_default(),
                device_id: config.outlet.device_id.clone().unwrap_or_default(),
                endpoint: None,
            },
            client,
        ))),
    };
    Ok(transport)
}

/// Raise the stop flag on SIGINT or SIGTERM.
async fn watch_signals(stop: watch::Sender<bool>) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to listen for SIGTERM"),
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
    let _ = stop.send(true);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = DbConfig {
        database_url: config.database.url.clone(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Shutdown plumbing
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(watch_signals(stop_tx));

    // Sensors and outlet
    let registry = build_registry(&config)?;
    let outlet = build_transport(&config)?.map(|transport| {
        OutletController::new(
            Some(transport),
            config.outlet.retry_policy(),
            config.outlet.allow_simulation,
            stop_rx.clone(),
        )
    });
    if outlet.is_none() {
        tracing::warn!("no outlet configured, running in advisory-only mode");
    }

    // Control loop
    let control = ControlLoop::new(
        registry,
        outlet,
        DecisionEngine::new(config.thresholds.to_domain()),
        SqliteReadingStore::new(pool.clone()),
        config.control.to_settings(),
        stop_rx.clone(),
    );
    let status_rx = control.subscribe();
    let control_task = tokio::spawn(control.run());

    // HTTP
    let state = AppState::new(status_rx, SqliteReadingStore::new(pool));
    let app = heatwatch_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    tracing::info!(%bind_addr, "heatwatchd listening");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    let mut serve_stop = stop_rx.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = serve_stop.wait_for(|stop| *stop).await;
        })
        .await?;

    control_task.await?;
    Ok(())
}
