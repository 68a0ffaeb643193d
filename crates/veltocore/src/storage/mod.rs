//! SQLite storage: pool, migrations and the record store

pub mod db;
pub mod migrations;
pub mod store;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool, UserRecord};
pub use store::{RecordStore, SqliteStore};
