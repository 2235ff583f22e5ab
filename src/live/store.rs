use std::path::Path;

use parking_lot::Mutex;
use rusqlite::Connection;

use crate::db::DbConnection;
use crate::live::LiveError;
use crate::models::{AccessKey, ToggleAxis};
use crate::repo::{AccessKeyRepo, ContestantRepo};

/// Durable storage consumed by the broadcaster.
///
/// Calls are blocking; the broadcaster runs them on the blocking pool.
pub trait RosterStore: Send + Sync + 'static {
    /// Invert one flag atomically and return the value now stored
    fn toggle_flag(&self, stage_name: &str, axis: ToggleAxis) -> Result<bool, LiveError>;

    /// Resolve a presented access key
    fn verify_key(&self, key: &str) -> Result<Option<AccessKey>, LiveError>;
}

/// Roster store backed by the SQLite roster database
pub struct SqliteRosterStore {
    conn: Mutex<Connection>,
}

impl SqliteRosterStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn: Mutex::new(conn) }
    }

    pub fn open(db_path: &Path) -> anyhow::Result<Self> {
        Ok(Self::new(DbConnection::open(db_path)?))
    }

    /// Run `f` with the shared connection
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> T) -> T {
        let conn = self.conn.lock();
        f(&conn)
    }
}

impl RosterStore for SqliteRosterStore {
    fn toggle_flag(&self, stage_name: &str, axis: ToggleAxis) -> Result<bool, LiveError> {
        let conn = self.conn.lock();
        ContestantRepo::toggle_flag(&conn, stage_name, axis)?
            .ok_or_else(|| LiveError::NotFound(stage_name.to_string()))
    }

    fn verify_key(&self, key: &str) -> Result<Option<AccessKey>, LiveError> {
        let conn = self.conn.lock();
        Ok(AccessKeyRepo::verify(&conn, key)?)
    }
}
