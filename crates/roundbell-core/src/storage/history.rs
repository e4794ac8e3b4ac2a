//! SQLite-based workout history.
//!
//! Provides persistent storage for:
//! - Finished workouts (one row per session summary)
//! - Totals across all recorded workouts

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::data_dir;
use crate::error::{HistoryError, Result};
use crate::plan::WorkoutType;
use crate::summary::{HistorySink, WorkoutSummary};

/// A stored workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: i64,
    #[serde(flatten)]
    pub summary: WorkoutSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_sessions: u64,
    pub total_duration_secs: u64,
    pub total_calories: u64,
    pub today_sessions: u64,
    /// Session count per workout type.
    pub by_type: BTreeMap<String, u64>,
}

/// SQLite database of finished workouts.
pub struct HistoryDb {
    conn: Connection,
}

type RawRow = (i64, String, String, String, u64, u32, u32, Option<String>, String);

impl HistoryDb {
    /// Open the database at `~/.config/roundbell/roundbell.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the
    /// database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("roundbell.db");
        Ok(Self::open_at(&path)?)
    }

    pub fn open_at(path: &Path) -> std::result::Result<Self, HistoryError> {
        let conn = Connection::open(path).map_err(|source| HistoryError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!("Opened workout history at {}", path.display());
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> std::result::Result<Self, HistoryError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> std::result::Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS workouts (
                id                 INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id         TEXT NOT NULL UNIQUE,
                title              TEXT NOT NULL DEFAULT '',
                workout_type       TEXT NOT NULL,
                duration_secs      INTEGER NOT NULL,
                estimated_calories INTEGER NOT NULL,
                skips_used         INTEGER NOT NULL DEFAULT 0,
                notes              TEXT,
                completed_at       TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_workouts_completed_at ON workouts(completed_at);
            CREATE INDEX IF NOT EXISTS idx_workouts_type ON workouts(workout_type);",
        )?;
        Ok(())
    }

    /// Store a summary. Recording the same session again replaces the
    /// earlier row, so a retried save never duplicates.
    pub fn insert(&self, summary: &WorkoutSummary) -> std::result::Result<i64, HistoryError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO workouts
                (session_id, title, workout_type, duration_secs, estimated_calories,
                 skips_used, notes, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                summary.session_id.to_string(),
                summary.title,
                summary.workout_type.as_str(),
                summary.duration_secs,
                summary.estimated_calories,
                summary.skips_used,
                summary.notes,
                summary.completed_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent workouts first.
    pub fn recent(&self, limit: usize) -> std::result::Result<Vec<WorkoutRecord>, HistoryError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, title, workout_type, duration_secs, estimated_calories,
                    skips_used, notes, completed_at
             FROM workouts
             ORDER BY completed_at DESC, id DESC
             LIMIT ?1",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, u64>(4)?,
                row.get::<_, u32>(5)?,
                row.get::<_, u32>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(to_record(row?)?);
        }
        Ok(records)
    }

    pub fn stats(&self) -> std::result::Result<HistoryStats, HistoryError> {
        let mut stmt = self.conn.prepare(
            "SELECT workout_type, COUNT(*), COALESCE(SUM(duration_secs), 0),
                    COALESCE(SUM(estimated_calories), 0)
             FROM workouts
             GROUP BY workout_type",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, u64>(3)?,
            ))
        })?;

        let mut stats = HistoryStats::default();
        for row in rows {
            let (workout_type, count, secs, kcal) = row?;
            stats.total_sessions += count;
            stats.total_duration_secs += secs;
            stats.total_calories += kcal;
            stats.by_type.insert(workout_type, count);
        }

        let today = Utc::now().format("%Y-%m-%d").to_string();
        stats.today_sessions = self.conn.query_row(
            "SELECT COUNT(*) FROM workouts WHERE completed_at >= ?1",
            params![format!("{today}T00:00:00+00:00")],
            |row| row.get::<_, u64>(0),
        )?;

        Ok(stats)
    }
}

impl HistorySink for HistoryDb {
    fn record(&mut self, summary: &WorkoutSummary) -> std::result::Result<(), HistoryError> {
        let id = self.insert(summary)?;
        tracing::info!("Recorded workout {} as #{}", summary.session_id, id);
        Ok(())
    }
}

fn to_record(raw: RawRow) -> std::result::Result<WorkoutRecord, HistoryError> {
    let (id, session_id, title, workout_type, duration_secs, estimated_calories, skips_used, notes, completed_at) =
        raw;
    let corrupt = |what: &str, e: &dyn std::fmt::Display| {
        HistoryError::QueryFailed(format!("workout #{id} has invalid {what}: {e}"))
    };

    let session_id = Uuid::parse_str(&session_id).map_err(|e| corrupt("session id", &e))?;
    let workout_type = workout_type
        .parse::<WorkoutType>()
        .map_err(|e| corrupt("workout type", &e))?;
    let completed_at = DateTime::parse_from_rfc3339(&completed_at)
        .map_err(|e| corrupt("timestamp", &e))?
        .with_timezone(&Utc);

    Ok(WorkoutRecord {
        id,
        summary: WorkoutSummary {
            session_id,
            title,
            workout_type,
            duration_secs,
            estimated_calories,
            skips_used,
            notes,
            completed_at,
        },
    })
}
