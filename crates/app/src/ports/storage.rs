//! Reading store port — persistence for temperature history and switch events.

use std::future::Future;

use heatwatch_domain::error::HeatwatchError;
use heatwatch_domain::event::OutletEvent;
use heatwatch_domain::reading::StoredReading;
use heatwatch_domain::sensor::SensorId;
use heatwatch_domain::time::Timestamp;

/// Repository for temperature readings and outlet events.
///
/// History is append-only from the control loop's point of view; the only
/// mutation is the retention sweep via [`delete_before`](Self::delete_before).
pub trait ReadingStore {
    /// Persist one temperature reading.
    fn append_reading(
        &self,
        reading: StoredReading,
    ) -> impl Future<Output = Result<(), HeatwatchError>> + Send;

    /// Persist one confirmed switch event.
    fn append_outlet_event(
        &self,
        event: OutletEvent,
    ) -> impl Future<Output = Result<(), HeatwatchError>> + Send;

    /// Readings newer than `since`, oldest first, optionally filtered to
    /// one sensor.
    fn readings_since(
        &self,
        sensor_id: Option<SensorId>,
        since: Timestamp,
    ) -> impl Future<Output = Result<Vec<StoredReading>, HeatwatchError>> + Send;

    /// Switch events newer than `since`, oldest first.
    fn events_since(
        &self,
        since: Timestamp,
    ) -> impl Future<Output = Result<Vec<OutletEvent>, HeatwatchError>> + Send;

    /// Drop readings and events older than `cutoff`; returns how many rows
    /// were removed.
    fn delete_before(
        &self,
        cutoff: Timestamp,
    ) -> impl Future<Output = Result<u64, HeatwatchError>> + Send;
}
