use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{Contestant, ContestantPatch, NewContestant, StageFlags, ToggleAxis};
use anyhow::{Context, Result};

const CONTESTANT_COLUMNS: &str =
    "id, stage_name, character, cosplay_ts, prejudge, prejudge_ts, comment, audio_url, video_url,
     crossed_out_main, glowing_main, crossed_out_prejudge, glowing_prejudge, created_ts, modified_ts";

/// Contestant repository for database operations
pub struct ContestantRepo;

impl ContestantRepo {
    /// Add a contestant to the roster with all live flags cleared
    pub fn create(conn: &Connection, new: &NewContestant) -> Result<Contestant> {
        let now = chrono::Utc::now().timestamp();

        let result = conn.execute(
            "INSERT INTO contestants (stage_name, character, cosplay_ts, prejudge, prejudge_ts,
                    comment, audio_url, video_url, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                new.stage_name,
                new.character,
                new.cosplay_ts,
                new.prejudge_ts.is_some(),
                new.prejudge_ts,
                new.comment,
                new.audio_url,
                new.video_url,
                now,
                now
            ],
        );

        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                anyhow::bail!("Contestant with stage name '{}' already exists", new.stage_name);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create contestant: {}", new.stage_name));
            }
        }

        Ok(Contestant {
            id: Some(conn.last_insert_rowid()),
            stage_name: new.stage_name.clone(),
            character: new.character.clone(),
            cosplay_ts: new.cosplay_ts,
            prejudge: new.prejudge_ts.is_some(),
            prejudge_ts: new.prejudge_ts,
            comment: new.comment.clone(),
            audio_url: new.audio_url.clone(),
            video_url: new.video_url.clone(),
            flags: StageFlags::default(),
            created_ts: now,
            modified_ts: now,
        })
    }

    /// Get contestant by stage name
    pub fn get_by_stage_name(conn: &Connection, stage_name: &str) -> Result<Option<Contestant>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM contestants WHERE stage_name = ?1",
            CONTESTANT_COLUMNS
        ))?;

        let contestant = stmt.query_row([stage_name], row_to_contestant).optional()?;
        Ok(contestant)
    }

    /// List the main-stage schedule ordered by performance time
    pub fn list_all(conn: &Connection) -> Result<Vec<Contestant>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM contestants ORDER BY cosplay_ts, stage_name",
            CONTESTANT_COLUMNS
        ))?;

        let rows = stmt.query_map([], row_to_contestant)?;
        let mut contestants = Vec::new();
        for row in rows {
            contestants.push(row?);
        }
        Ok(contestants)
    }

    /// List contestants with a pre-judging slot ordered by pre-judging time
    pub fn list_prejudge(conn: &Connection) -> Result<Vec<Contestant>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM contestants WHERE prejudge = 1 ORDER BY prejudge_ts, stage_name",
            CONTESTANT_COLUMNS
        ))?;

        let rows = stmt.query_map([], row_to_contestant)?;
        let mut contestants = Vec::new();
        for row in rows {
            contestants.push(row?);
        }
        Ok(contestants)
    }

    /// Update descriptive fields of a contestant. Live flags are left alone.
    pub fn update(conn: &Connection, stage_name: &str, patch: &ContestantPatch) -> Result<Contestant> {
        // Build dynamic update
        let mut sets: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(character) = &patch.character {
            sets.push("character = ?");
            params.push(Box::new(character.clone()));
        }
        if let Some(ts) = patch.cosplay_ts {
            sets.push("cosplay_ts = ?");
            params.push(Box::new(ts));
        }
        if let Some(prejudge_ts) = patch.prejudge_ts {
            sets.push("prejudge = ?");
            params.push(Box::new(prejudge_ts.is_some()));
            sets.push("prejudge_ts = ?");
            params.push(Box::new(prejudge_ts));
        }
        if let Some(comment) = &patch.comment {
            sets.push("comment = ?");
            params.push(Box::new(comment.clone()));
        }
        if let Some(audio) = &patch.audio_url {
            sets.push("audio_url = ?");
            params.push(Box::new(audio.clone()));
        }
        if let Some(video) = &patch.video_url {
            sets.push("video_url = ?");
            params.push(Box::new(video.clone()));
        }

        sets.push("modified_ts = ?");
        params.push(Box::new(chrono::Utc::now().timestamp()));

        // Number the parameters
        let numbered_sets: Vec<String> = sets
            .iter()
            .enumerate()
            .map(|(i, set)| set.replace('?', &format!("?{}", i + 1)))
            .collect();
        let name_param = params.len() + 1;
        let sql = format!(
            "UPDATE contestants SET {} WHERE stage_name = ?{}",
            numbered_sets.join(", "),
            name_param
        );
        params.push(Box::new(stage_name.to_string()));

        let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let updated = conn.execute(&sql, param_refs.as_slice())
            .with_context(|| format!("Failed to update contestant '{}'", stage_name))?;

        if updated == 0 {
            anyhow::bail!("Contestant '{}' not found", stage_name);
        }

        Self::get_by_stage_name(conn, stage_name)?
            .with_context(|| format!("Failed to reload contestant '{}'", stage_name))
    }

    /// Delete a contestant and its flags. Returns false if nothing was deleted.
    pub fn delete(conn: &Connection, stage_name: &str) -> Result<bool> {
        let deleted = conn.execute(
            "DELETE FROM contestants WHERE stage_name = ?1",
            [stage_name],
        )
        .with_context(|| format!("Failed to delete contestant '{}'", stage_name))?;
        Ok(deleted > 0)
    }

    /// Invert one live flag in a single statement and return the stored value.
    ///
    /// Returns `Ok(None)` when no contestant has this stage name; nothing is written then.
    pub fn toggle_flag(conn: &Connection, stage_name: &str, axis: ToggleAxis) -> rusqlite::Result<Option<bool>> {
        let column = axis.column();
        let sql = format!(
            "UPDATE contestants SET {col} = NOT {col}, modified_ts = ?2
             WHERE stage_name = ?1
             RETURNING {col}",
            col = column
        );
        let now = chrono::Utc::now().timestamp();
        conn.query_row(&sql, rusqlite::params![stage_name, now], |row| row.get::<_, bool>(0))
            .optional()
    }
}

fn row_to_contestant(row: &Row<'_>) -> rusqlite::Result<Contestant> {
    Ok(Contestant {
        id: Some(row.get(0)?),
        stage_name: row.get(1)?,
        character: row.get(2)?,
        cosplay_ts: row.get(3)?,
        prejudge: row.get(4)?,
        prejudge_ts: row.get(5)?,
        comment: row.get(6)?,
        audio_url: row.get(7)?,
        video_url: row.get(8)?,
        flags: StageFlags {
            crossed_out_main: row.get(9)?,
            glowing_main: row.get(10)?,
            crossed_out_prejudge: row.get(11)?,
            glowing_prejudge: row.get(12)?,
        },
        created_ts: row.get(13)?,
        modified_ts: row.get(14)?,
    })
}
