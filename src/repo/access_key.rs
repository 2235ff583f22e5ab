use rusqlite::{Connection, OptionalExtension};
use crate::models::{AccessKey, Role};
use crate::repo::ContestantRepo;
use anyhow::{Context, Result};

/// Access key repository
pub struct AccessKeyRepo;

impl AccessKeyRepo {
    /// Record an operator-chosen key, optionally linked to one contestant
    pub fn register(conn: &Connection, key: &str, role: Role, stage_name: Option<&str>) -> Result<AccessKey> {
        if let Some(name) = stage_name {
            if ContestantRepo::get_by_stage_name(conn, name)?.is_none() {
                anyhow::bail!("Contestant '{}' not found", name);
            }
            if Self::get_by_stage_name(conn, name)?.is_some() {
                anyhow::bail!("Contestant '{}' already has an access key", name);
            }
        }
        if Self::verify(conn, key)?.is_some() {
            anyhow::bail!("Access key already exists");
        }

        conn.execute(
            "INSERT INTO access_keys (key, role, stage_name) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, role.as_str(), stage_name],
        )
        .context("Failed to register access key")?;

        Ok(AccessKey {
            id: Some(conn.last_insert_rowid()),
            key: key.to_string(),
            role,
            stage_name: stage_name.map(|s| s.to_string()),
        })
    }

    /// Look up a presented key. `None` means the key is not known.
    pub fn verify(conn: &Connection, key: &str) -> Result<Option<AccessKey>> {
        let mut stmt = conn.prepare(
            "SELECT id, key, role, stage_name FROM access_keys WHERE key = ?1"
        )?;
        let found = stmt.query_row([key], row_to_access_key).optional()?;
        Ok(found)
    }

    /// Key linked to a contestant, if any
    pub fn get_by_stage_name(conn: &Connection, stage_name: &str) -> Result<Option<AccessKey>> {
        let mut stmt = conn.prepare(
            "SELECT id, key, role, stage_name FROM access_keys WHERE stage_name = ?1"
        )?;
        let found = stmt.query_row([stage_name], row_to_access_key).optional()?;
        Ok(found)
    }

    /// Whether any admin key has been registered yet
    pub fn has_admin(conn: &Connection) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM access_keys WHERE role = 'admin'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Remove a key. Returns false if it did not exist.
    pub fn remove(conn: &Connection, key: &str) -> Result<bool> {
        let removed = conn.execute("DELETE FROM access_keys WHERE key = ?1", [key])
            .context("Failed to remove access key")?;
        Ok(removed > 0)
    }
}

fn row_to_access_key(row: &rusqlite::Row<'_>) -> rusqlite::Result<AccessKey> {
    let role: String = row.get(2)?;
    Ok(AccessKey {
        id: Some(row.get(0)?),
        key: row.get(1)?,
        role: Role::from_str(&role).unwrap_or(Role::User),
        stage_name: row.get(3)?,
    })
}
