//! # heatwatch-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `TemperatureProbe` — read one physical or simulated sensor
//!   - `OutletTransport` — speak one smart-plug protocol
//!   - `ReadingStore` — append & query temperature history and switch events
//! - Provide the **driving side** of the system:
//!   - `SensorRegistry` — fail-open sensor polling with error counting
//!   - `OutletController` — actuator state machine (retry, simulated fallback)
//!   - `ControlLoop` — periodic tick: read, decide, actuate, persist, publish
//! - Provide **in-process infrastructure** (status feed) that doesn't need IO
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `heatwatch-domain` only (plus `tokio::sync`/`tokio::time` for
//! channels and timers). Never imports adapter crates. Adapters depend on
//! *this* crate, not the reverse.

pub mod control_loop;
pub mod outlet_controller;
pub mod ports;
pub mod registry;
pub mod simulated;
pub mod status_feed;
