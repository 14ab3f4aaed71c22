//! # heatwatch-adapter-probe-linux
//!
//! Hardware probe adapter for Linux — reads temperatures through sysfs,
//! so no direct bus programming (and no elevated privileges beyond file
//! access) is needed:
//!
//! - [`Ds18b20Probe`] — DS18B20 contact probes on the 1-Wire bus, via the
//!   kernel `w1_therm` driver (`/sys/bus/w1/devices/<id>/temperature`).
//! - [`Max31855Probe`] — MAX31855 thermocouple amplifiers on SPI, via the
//!   kernel IIO subsystem (`in_temp_raw` × `in_temp_scale`).
//!
//! Probes are fail-open: any IO or parse problem is logged and surfaces as
//! a missing reading, never as an error the control loop has to handle.
//!
//! ## Dependency rule
//!
//! Depends on `heatwatch-app` for the port trait. Never imported by `app`
//! or `domain`.

mod ds18b20;
mod error;
mod max31855;

pub use ds18b20::Ds18b20Probe;
pub use error::ProbeError;
pub use max31855::Max31855Probe;
