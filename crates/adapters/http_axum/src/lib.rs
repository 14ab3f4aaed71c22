//! # heatwatch-adapter-http-axum
//!
//! Read-only monitoring API using [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the latest status snapshot published by the control loop
//! - Serve persisted temperature and switch-event history
//! - Map domain errors to HTTP status codes
//!
//! The API never commands the outlet; the control loop is the only writer.
//!
//! ## Dependency rule
//! Depends on `heatwatch-app` (for the store port and status feed types)
//! and `heatwatch-domain`. The `app` and `domain` crates must never
//! reference this adapter.

pub mod api;
mod error;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use state::AppState;
