use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::core::config;
use crate::core::{AppResult, Answers};
use crate::storage::migrations::run_migrations;

/// Onboarding record of one user, one row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Telegram user ID
    pub user_id: i64,
    /// Telegram username at the time of the last write, if any
    pub username: Option<String>,
    /// Completed questionnaire; never a partial set
    pub answers: Option<Answers>,
    /// Whether the user is currently a member of the group
    pub joined: bool,
    /// Unix seconds of the (latest) questionnaire completion
    pub created_at: i64,
}

impl UserRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get(0)?,
            username: row.get(1)?,
            answers: row.get(2)?,
            joined: row.get::<_, i64>(3)? != 0,
            created_at: row.get(4)?,
        })
    }
}

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Every connection runs in WAL mode with a busy timeout, so short writes from
/// concurrent handlers wait for each other instead of failing. Schema
/// migrations run once on the first connection.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Example
///
/// ```no_run
/// use veltocore::storage::create_pool;
///
/// let pool = create_pool("velto.db")?;
/// # Ok::<(), veltocore::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let busy_timeout = config::database::busy_timeout();
    let manager = SqliteConnectionManager::file(database_path).with_init(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
    });
    let pool = Pool::builder()
        .max_size(config::database::MAX_CONNECTIONS)
        .build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection goes back to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Inserts the record or replaces the existing row with the same `user_id`.
pub fn upsert_user(conn: &Connection, record: &UserRecord) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO users (user_id, username, answers, joined, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            record.user_id,
            record.username,
            record.answers,
            i64::from(record.joined),
            record.created_at
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Option<UserRecord>> {
    conn.query_row(
        "SELECT user_id, username, answers, joined, created_at FROM users WHERE user_id = ?1",
        [user_id],
        UserRecord::from_row,
    )
    .optional()
}

/// Sets the membership flag. Returns the number of rows touched, 0 when the
/// user never finished the questionnaire.
pub fn set_joined(conn: &Connection, user_id: i64, joined: bool) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE users SET joined = ?1 WHERE user_id = ?2",
        params![i64::from(joined), user_id],
    )
}

pub fn count_users(conn: &Connection) -> rusqlite::Result<u64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
}

pub fn count_joined(conn: &Connection) -> rusqlite::Result<u64> {
    conn.query_row("SELECT COUNT(*) FROM users WHERE joined = 1", [], |row| row.get(0))
}

/// All records in store-native (rowid) order
pub fn get_all_users(conn: &Connection) -> rusqlite::Result<Vec<UserRecord>> {
    let mut stmt = conn.prepare("SELECT user_id, username, answers, joined, created_at FROM users")?;
    let rows = stmt.query_map([], UserRecord::from_row)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(row?);
    }
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn
    }

    fn record(user_id: i64) -> UserRecord {
        UserRecord {
            user_id,
            username: Some(format!("user{user_id}")),
            answers: Some([("experience", "Beginner"), ("rules", "Yes")].into_iter().collect()),
            joined: false,
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_upsert_and_get() {
        let conn = test_conn();
        let rec = record(1);

        upsert_user(&conn, &rec).unwrap();

        assert_eq!(get_user(&conn, 1).unwrap(), Some(rec));
        assert_eq!(get_user(&conn, 2).unwrap(), None);
    }

    #[test]
    fn test_upsert_replaces_instead_of_duplicating() {
        let conn = test_conn();
        upsert_user(&conn, &record(1)).unwrap();

        let mut second = record(1);
        second.username = None;
        second.created_at = 1_700_000_600;
        upsert_user(&conn, &second).unwrap();

        assert_eq!(count_users(&conn).unwrap(), 1);
        assert_eq!(get_user(&conn, 1).unwrap(), Some(second));
    }

    #[test]
    fn test_set_joined_reports_affected_rows() {
        let conn = test_conn();
        upsert_user(&conn, &record(1)).unwrap();

        assert_eq!(set_joined(&conn, 1, true).unwrap(), 1);
        assert_eq!(set_joined(&conn, 99, true).unwrap(), 0);
        assert!(get_user(&conn, 1).unwrap().unwrap().joined);
        assert_eq!(get_user(&conn, 99).unwrap(), None);
    }

    #[test]
    fn test_counts() {
        let conn = test_conn();
        for id in 1..=3 {
            upsert_user(&conn, &record(id)).unwrap();
        }
        set_joined(&conn, 2, true).unwrap();

        assert_eq!(count_users(&conn).unwrap(), 3);
        assert_eq!(count_joined(&conn).unwrap(), 1);
    }

    #[test]
    fn test_get_all_users_reads_null_answers() {
        let conn = test_conn();
        upsert_user(&conn, &record(1)).unwrap();
        conn.execute(
            "INSERT INTO users (user_id, username, answers, joined, created_at) VALUES (2, NULL, NULL, 1, 0)",
            [],
        )
        .unwrap();

        let users = get_all_users(&conn).unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[1].answers, None);
        assert!(users[1].joined);
    }

    #[test]
    fn test_create_pool_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("velto.db");

        let pool = create_pool(path.to_str().unwrap()).unwrap();
        let conn = get_connection(&pool).unwrap();
        upsert_user(&conn, &record(7)).unwrap();

        assert_eq!(count_users(&conn).unwrap(), 1);
    }
}
