//! # heatwatch-domain
//!
//! Pure domain model for the heatwatch boiler supervision system.
//!
//! ## Responsibilities
//! - Foundational types: sensor identifiers, error conventions, timestamps
//! - Define **readings** (per-sensor temperature samples and per-tick snapshots)
//! - Define **outlet state** (mode, reported power state, connection health)
//! - Define **control decisions** (turn-on/turn-off actions with reasons) and
//!   the pure decision logic that produces them
//! - Define the **trend window** used for startup detection
//! - Define **outlet events** (persisted switch transitions) and the
//!   outward-facing status snapshot types
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod control;
pub mod event;
pub mod outlet;
pub mod reading;
pub mod sensor;
pub mod status;
pub mod trend;
