//! `SQLite` implementation of [`ReadingStore`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use heatwatch_app::ports::ReadingStore;
use heatwatch_domain::error::HeatwatchError;
use heatwatch_domain::event::{EventId, OutletEvent};
use heatwatch_domain::reading::StoredReading;
use heatwatch_domain::sensor::SensorId;
use heatwatch_domain::time::Timestamp;

use crate::error::StorageError;

struct ReadingRow(StoredReading);

impl<'r> FromRow<'r, SqliteRow> for ReadingRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let sensor_id: String = row.try_get("sensor_id")?;
        let temperature: f64 = row.try_get("temperature")?;
        let timestamp_str: String = row.try_get("timestamp")?;

        let sensor_id =
            SensorId::new(&sensor_id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(StoredReading {
            sensor_id,
            temperature,
            timestamp,
        }))
    }
}

struct EventRow(OutletEvent);

impl<'r> FromRow<'r, SqliteRow> for EventRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let action: String = row.try_get("action")?;
        let reason: String = row.try_get("reason")?;
        let timestamp_str: String = row.try_get("timestamp")?;

        let action = serde_json::from_str(&format!("\"{action}\""))
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let reason = serde_json::from_str(&format!("\"{reason}\""))
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(OutletEvent {
            id: EventId::from_uuid(id),
            action,
            reason,
            timestamp,
        }))
    }
}

const INSERT_READING: &str = r"
    INSERT INTO temperature_readings (sensor_id, temperature, timestamp)
    VALUES (?, ?, ?)
";

const INSERT_EVENT: &str = r"
    INSERT INTO outlet_events (id, action, reason, timestamp)
    VALUES (?, ?, ?, ?)
";

const SELECT_READINGS: &str =
    "SELECT * FROM temperature_readings WHERE timestamp > ? ORDER BY timestamp ASC";
const SELECT_READINGS_BY_SENSOR: &str = r"
    SELECT * FROM temperature_readings
    WHERE timestamp > ? AND sensor_id = ?
    ORDER BY timestamp ASC
";
const SELECT_EVENTS: &str = "SELECT * FROM outlet_events WHERE timestamp > ? ORDER BY timestamp ASC";

const DELETE_READINGS: &str = "DELETE FROM temperature_readings WHERE timestamp < ?";
const DELETE_EVENTS: &str = "DELETE FROM outlet_events WHERE timestamp < ?";

/// `SQLite`-backed reading store.
pub struct SqliteReadingStore {
    pool: SqlitePool,
}

impl SqliteReadingStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ReadingStore for SqliteReadingStore {
    async fn append_reading(&self, reading: StoredReading) -> Result<(), HeatwatchError> {
        sqlx::query(INSERT_READING)
            .bind(reading.sensor_id.as_str())
            .bind(reading.temperature)
            .bind(reading.timestamp.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn append_outlet_event(&self, event: OutletEvent) -> Result<(), HeatwatchError> {
        sqlx::query(INSERT_EVENT)
            .bind(event.id.as_uuid())
            .bind(event.action.as_str())
            .bind(event.reason.as_str())
            .bind(event.timestamp.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn readings_since(
        &self,
        sensor_id: Option<SensorId>,
        since: Timestamp,
    ) -> Result<Vec<StoredReading>, HeatwatchError> {
        let rows: Vec<ReadingRow> = match sensor_id {
            Some(sensor_id) => {
                sqlx::query_as(SELECT_READINGS_BY_SENSOR)
                    .bind(since.to_rfc3339())
                    .bind(sensor_id.as_str().to_owned())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query_as(SELECT_READINGS)
                    .bind(since.to_rfc3339())
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn events_since(&self, since: Timestamp) -> Result<Vec<OutletEvent>, HeatwatchError> {
        let rows: Vec<EventRow> = sqlx::query_as(SELECT_EVENTS)
            .bind(since.to_rfc3339())
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn delete_before(&self, cutoff: Timestamp) -> Result<u64, HeatwatchError> {
        let cutoff = cutoff.to_rfc3339();
        let readings = sqlx::query(DELETE_READINGS)
            .bind(&cutoff)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        let events = sqlx::query(DELETE_EVENTS)
            .bind(&cutoff)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(readings.rows_affected() + events.rows_affected())
    }
}
