//! Async record store capability used by the engine, reconciler and reporting.

use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::Arc;

use super::db::{self, get_connection, DbPool, UserRecord};
use crate::core::AppResult;

/// Durable mapping from user identity to onboarding record.
///
/// Writes to different keys never interfere; each call is one short-lived
/// operation with no transaction spanning calls.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, user_id: i64) -> AppResult<Option<UserRecord>>;

    /// Insert-or-replace keyed on `user_id`.
    async fn upsert(&self, record: UserRecord) -> AppResult<()>;

    /// Returns the number of records touched (0 or 1).
    async fn set_joined(&self, user_id: i64, joined: bool) -> AppResult<usize>;

    async fn count_all(&self) -> AppResult<u64>;

    async fn count_joined(&self) -> AppResult<u64>;

    /// Full unfiltered read in store-native order.
    async fn all(&self) -> AppResult<Vec<UserRecord>>;
}

/// [`RecordStore`] on the SQLite pool.
///
/// rusqlite is blocking, so every call hops onto the blocking thread pool and
/// checks out its own connection there.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<DbPool>,
}

impl SqliteStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    async fn run<T, F>(&self, op: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        tokio::task::spawn_blocking(move || -> AppResult<T> {
            let conn = get_connection(&pool)?;
            Ok(op(&*conn)?)
        })
        .await?
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get(&self, user_id: i64) -> AppResult<Option<UserRecord>> {
        self.run(move |conn| db::get_user(conn, user_id)).await
    }

    async fn upsert(&self, record: UserRecord) -> AppResult<()> {
        self.run(move |conn| db::upsert_user(conn, &record)).await
    }

    async fn set_joined(&self, user_id: i64, joined: bool) -> AppResult<usize> {
        self.run(move |conn| db::set_joined(conn, user_id, joined)).await
    }

    async fn count_all(&self) -> AppResult<u64> {
        self.run(db::count_users).await
    }

    async fn count_joined(&self) -> AppResult<u64> {
        self.run(db::count_joined).await
    }

    async fn all(&self) -> AppResult<Vec<UserRecord>> {
        self.run(db::get_all_users).await
    }
}
