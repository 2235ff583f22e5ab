use rusqlite::{Connection, Result};
use std::collections::HashMap;

/// Current database schema version
const CURRENT_VERSION: u32 = 2;

/// Migration system for managing database schema versions
pub struct MigrationManager;

impl MigrationManager {
    /// Initialize the database with the current schema
    /// This creates the schema_version table and applies all migrations
    pub fn initialize(conn: &Connection) -> Result<()> {
        // Create schema_version table to track migrations
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version = Self::get_version(conn)?;

        // Apply migrations up to current version
        for version in (current_version + 1)..=CURRENT_VERSION {
            Self::apply_migration(conn, version)?;
        }

        Ok(())
    }

    /// Apply a specific migration by version number
    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migrations = get_migrations();
        if let Some(migration) = migrations.get(&version) {
            // Execute migration in a transaction
            let tx = conn.unchecked_transaction()?;
            migration(&tx)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [version],
            )?;
            tx.commit()?;
            log::debug!("Applied schema migration v{}", version);
            Ok(())
        } else {
            Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                Some(format!("No migration found for version {}", version)),
            ))
        }
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

type Migration = fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>;

/// Get all migrations indexed by version
fn get_migrations() -> HashMap<u32, Migration> {
    let mut migrations: HashMap<u32, Migration> = HashMap::new();
    migrations.insert(1, migration_v1);
    migrations.insert(2, migration_v2);
    migrations
}

/// Migration v1: contestant roster
fn migration_v1(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE contestants (
            id INTEGER PRIMARY KEY,
            stage_name TEXT NOT NULL UNIQUE CHECK(length(trim(stage_name)) > 0),
            character TEXT NOT NULL,
            cosplay_ts INTEGER NOT NULL,
            prejudge INTEGER NOT NULL DEFAULT 0,
            prejudge_ts INTEGER NULL,
            comment TEXT NULL,
            audio_url TEXT NULL,
            video_url TEXT NULL,
            crossed_out_main INTEGER NOT NULL DEFAULT 0 CHECK(crossed_out_main IN (0, 1)),
            glowing_main INTEGER NOT NULL DEFAULT 0 CHECK(glowing_main IN (0, 1)),
            crossed_out_prejudge INTEGER NOT NULL DEFAULT 0 CHECK(crossed_out_prejudge IN (0, 1)),
            glowing_prejudge INTEGER NOT NULL DEFAULT 0 CHECK(glowing_prejudge IN (0, 1)),
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_contestants_cosplay_ts ON contestants(cosplay_ts)",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_contestants_prejudge_ts ON contestants(prejudge, prejudge_ts)",
        [],
    )?;
    Ok(())
}

/// Migration v2: access keys, optionally linked to one contestant
fn migration_v2(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE access_keys (
            id INTEGER PRIMARY KEY,
            key TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL DEFAULT 'user' CHECK(role IN ('user', 'admin')),
            stage_name TEXT NULL UNIQUE
                REFERENCES contestants(stage_name) ON UPDATE CASCADE ON DELETE SET NULL
        )",
        [],
    )?;
    Ok(())
}
