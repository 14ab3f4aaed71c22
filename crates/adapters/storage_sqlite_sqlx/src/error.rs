//! Storage-specific error type wrapping sqlx errors.

use heatwatch_domain::error::HeatwatchError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to decode a stored value.
    #[error("stored value decoding error")]
    Decode(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for HeatwatchError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
