use crate::app_dirs::AppDirs;
use chrono::{DateTime, Duration, Local, NaiveDate};
use rusqlite::{params, Connection};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("bad timestamp in progress database: {0}")]
    Timestamp(String),
}

/// One finished workout session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    pub workout_id: String,
    pub total_minutes: u32,
    pub calories_burned: u32,
    pub rounds_completed: u32,
    pub completed_at: DateTime<Local>,
}

/// Receives completed sessions. The controller does not wait on or retry it.
pub trait ProgressSink {
    fn record_completion(&mut self, record: &CompletionRecord) -> Result<(), ProgressError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSummary {
    pub workouts: u32,
    pub minutes: u32,
    pub calories: u32,
    pub rounds: u32,
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS completions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        workout_id TEXT NOT NULL,
        total_minutes INTEGER NOT NULL,
        calories INTEGER NOT NULL,
        rounds_completed INTEGER NOT NULL,
        completed_at TEXT NOT NULL,
        completed_on TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_completions_completed_on ON completions(completed_on);
"#;

/// SQLite-backed progress history
#[derive(Debug)]
pub struct ProgressDb {
    conn: Connection,
}

impl ProgressDb {
    /// Open the database in the state directory, creating it if needed
    pub fn new() -> Result<Self, ProgressError> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("roundbell_progress.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProgressError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, ProgressError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, ProgressError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn record(&self, record: &CompletionRecord) -> Result<(), ProgressError> {
        self.conn.execute(
            r#"
            INSERT INTO completions
            (workout_id, total_minutes, calories, rounds_completed, completed_at, completed_on)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.workout_id,
                record.total_minutes,
                record.calories_burned,
                record.rounds_completed,
                record.completed_at.to_rfc3339(),
                record.completed_at.date_naive().to_string(),
            ],
        )?;
        info!(
            workout = %record.workout_id,
            minutes = record.total_minutes,
            calories = record.calories_burned,
            rounds = record.rounds_completed,
            "completion recorded"
        );
        Ok(())
    }

    /// Most recently recorded completions first
    pub fn recent(&self, limit: usize) -> Result<Vec<CompletionRecord>, ProgressError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT workout_id, total_minutes, calories, rounds_completed, completed_at
            FROM completions
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map([limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (workout_id, total_minutes, calories_burned, rounds_completed, at) = row?;
            let completed_at = DateTime::parse_from_rfc3339(&at)
                .map_err(|_| ProgressError::Timestamp(at.clone()))?
                .with_timezone(&Local);
            records.push(CompletionRecord {
                workout_id,
                total_minutes,
                calories_burned,
                rounds_completed,
                completed_at,
            });
        }
        Ok(records)
    }

    pub fn summary(&self) -> Result<ProgressSummary, ProgressError> {
        let summary = self.conn.query_row(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(total_minutes), 0),
                   COALESCE(SUM(calories), 0),
                   COALESCE(SUM(rounds_completed), 0)
            FROM completions
            "#,
            [],
            |row| {
                Ok(ProgressSummary {
                    workouts: row.get(0)?,
                    minutes: row.get(1)?,
                    calories: row.get(2)?,
                    rounds: row.get(3)?,
                })
            },
        )?;
        Ok(summary)
    }

    /// Consecutive training days ending today, or ending yesterday if
    /// nothing has been recorded yet today
    pub fn streak_days(&self, today: NaiveDate) -> Result<u32, ProgressError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT completed_on FROM completions ORDER BY completed_on DESC")?;
        let days = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut days = days
            .iter()
            .filter_map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .filter(|d| *d <= today)
            .peekable();

        let mut expected = match days.peek() {
            Some(d) if *d == today => today,
            Some(d) if *d == today - Duration::days(1) => *d,
            _ => return Ok(0),
        };
        let mut streak = 0;
        for day in days {
            if day != expected {
                break;
            }
            streak += 1;
            expected = day - Duration::days(1);
        }
        debug!(streak, "computed streak");
        Ok(streak)
    }

    /// Write every completion as CSV, oldest first
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize, ProgressError> {
        let mut records = self.recent(usize::MAX >> 1)?;
        records.reverse();
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([
            "completed_at",
            "workout_id",
            "total_minutes",
            "calories",
            "rounds_completed",
        ])?;
        for r in &records {
            csv.write_record([
                r.completed_at.to_rfc3339(),
                r.workout_id.clone(),
                r.total_minutes.to_string(),
                r.calories_burned.to_string(),
                r.rounds_completed.to_string(),
            ])?;
        }
        csv.flush()?;
        Ok(records.len())
    }
}

impl ProgressSink for ProgressDb {
    fn record_completion(&mut self, record: &CompletionRecord) -> Result<(), ProgressError> {
        self.record(record)
    }
}
