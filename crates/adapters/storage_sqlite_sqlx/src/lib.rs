//! # heatwatch-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `ReadingStore` port defined in `heatwatch-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `heatwatch-app` (for the port trait) and `heatwatch-domain`
//! (for domain types). The `app` and `domain` crates must never reference
//! this adapter.

mod error;
pub mod pool;
pub mod reading_store;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use reading_store::SqliteReadingStore;
