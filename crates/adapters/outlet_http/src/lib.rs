//! # heatwatch-adapter-outlet-http
//!
//! Smart-plug transports speaking HTTP:
//!
//! - [`TasmotaTransport`] — plugs running Tasmota firmware on the local
//!   network, driven through the `cm?cmnd=Power ...` web API.
//! - [`CloudPlugTransport`] — TP-Link Kasa plugs reached through the
//!   vendor cloud (login for a token, then passthrough commands to the
//!   device).
//!
//! Each transport performs exactly one attempt per call; retries and
//! offline fallback live in the controller, not here.
//!
//! ## Dependency rule
//!
//! Depends on `heatwatch-app` for the port trait. Never imported by `app`
//! or `domain`.

mod classify;
mod cloudplug;
mod tasmota;

pub use cloudplug::{CloudPlugConfig, CloudPlugTransport};
pub use tasmota::TasmotaTransport;
