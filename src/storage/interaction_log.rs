//! `SQLite` log of LLM interactions.

use super::connection::{acquire_lock, configure_connection};
use crate::text::sanitize_text;
use crate::{Error, Result};
use chrono::SecondsFormat;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, instrument};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS llm_interactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT,
    model TEXT,
    prompt TEXT,
    response TEXT,
    temperature REAL,
    metadata TEXT,
    execution_time REAL
)";

const SELECT_COLUMNS: &str =
    "SELECT id, timestamp, model, prompt, response, temperature, metadata, execution_time \
     FROM llm_interactions";

/// An interaction to be logged.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInteraction<'a> {
    /// Model name.
    pub model: &'a str,
    /// Prompt sent to the model.
    pub prompt: &'a str,
    /// Response text (empty on failure).
    pub response: &'a str,
    /// Sampling temperature.
    pub temperature: f32,
    /// Free-form metadata as JSON.
    pub metadata: serde_json::Value,
    /// Wall-clock duration of the request in seconds.
    pub execution_time: f64,
}

/// A logged interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionRecord {
    /// Row id.
    pub id: i64,
    /// Local timestamp (RFC 3339 with offset, microsecond precision).
    pub timestamp: String,
    /// Model name.
    pub model: String,
    /// Prompt.
    pub prompt: String,
    /// Response.
    pub response: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Metadata JSON text.
    pub metadata: String,
    /// Duration in seconds.
    pub execution_time: f64,
}

impl InteractionRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            model: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            prompt: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            response: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            temperature: row.get::<_, Option<f64>>(5)?.unwrap_or_default(),
            metadata: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            execution_time: row.get::<_, Option<f64>>(7)?.unwrap_or_default(),
        })
    }
}

/// Aggregate view of the interaction log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InteractionSummary {
    /// Total interactions.
    pub count: u64,
    /// Interactions per model, most used first.
    pub per_model: Vec<(String, u64)>,
    /// Mean execution time in seconds, `None` when the log is empty.
    pub mean_execution_time: Option<f64>,
}

/// Handle to the `llm_interactions` table.
pub struct InteractionLog {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl InteractionLog {
    /// Opens (creating if needed) the log database at `path`.
    ///
    /// Parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory, database or table cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::failed("create_log_dir", e))?;
        }
        let conn = Connection::open(path).map_err(|e| Error::failed("open_interaction_log", e))?;
        Self::initialize(conn, Some(path.to_path_buf()))
    }

    /// Opens an in-memory log.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| Error::failed("open_interaction_log", e))?;
        Self::initialize(conn, None)
    }

    fn initialize(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        configure_connection(&conn)?;
        conn.execute(CREATE_TABLE, [])
            .map_err(|e| Error::failed("create_interaction_table", e))?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Database path, `None` for in-memory logs.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Records an interaction, returning its row id.
    ///
    /// Model, prompt, response and metadata are sanitized to ASCII first.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    #[instrument(skip_all, fields(model = interaction.model))]
    pub fn record(&self, interaction: &NewInteraction<'_>) -> Result<i64> {
        let timestamp = chrono::Local::now().to_rfc3339_opts(SecondsFormat::Micros, false);
        let metadata = sanitize_text(&interaction.metadata.to_string());

        let conn = acquire_lock(&self.conn);
        conn.execute(
            "INSERT INTO llm_interactions \
             (timestamp, model, prompt, response, temperature, metadata, execution_time) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                timestamp,
                sanitize_text(interaction.model),
                sanitize_text(interaction.prompt),
                sanitize_text(interaction.response),
                f64::from(interaction.temperature),
                metadata,
                interaction.execution_time,
            ],
        )
        .map_err(|e| Error::failed("record_interaction", e))?;
        let id = conn.last_insert_rowid();
        debug!(id, "Recorded LLM interaction");
        Ok(id)
    }

    /// Fetches a single interaction by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get(&self, id: i64) -> Result<Option<InteractionRecord>> {
        let conn = acquire_lock(&self.conn);
        conn.query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            InteractionRecord::from_row,
        )
        .optional()
        .map_err(|e| Error::failed("get_interaction", e))
    }

    /// Returns up to `limit` interactions, newest first, optionally for one model.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn recent(&self, limit: usize, model: Option<&str>) -> Result<Vec<InteractionRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = acquire_lock(&self.conn);
        let (sql, model_param) = model.map_or_else(
            || (format!("{SELECT_COLUMNS} ORDER BY id DESC LIMIT ?1"), None),
            |m| {
                (
                    format!("{SELECT_COLUMNS} WHERE model = ?2 ORDER BY id DESC LIMIT ?1"),
                    Some(m),
                )
            },
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| Error::failed("prepare_recent_interactions", e))?;
        let rows = match model_param {
            Some(m) => stmt.query_map(params![limit, m], InteractionRecord::from_row),
            None => stmt.query_map(params![limit], InteractionRecord::from_row),
        }
        .map_err(|e| Error::failed("query_recent_interactions", e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::failed("read_interaction", e))
    }

    /// Number of logged interactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count(&self) -> Result<u64> {
        let conn = acquire_lock(&self.conn);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM llm_interactions", [], |row| row.get(0))
            .map_err(|e| Error::failed("count_interactions", e))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Summarizes the log: totals, per-model counts and mean duration.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn summary(&self) -> Result<InteractionSummary> {
        let conn = acquire_lock(&self.conn);
        let (count, mean_execution_time): (i64, Option<f64>) = conn
            .query_row(
                "SELECT COUNT(*), AVG(execution_time) FROM llm_interactions",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| Error::failed("summarize_interactions", e))?;

        let mut stmt = conn
            .prepare(
                "SELECT COALESCE(model, ''), COUNT(*) AS n FROM llm_interactions \
                 GROUP BY model ORDER BY n DESC, model ASC",
            )
            .map_err(|e| Error::failed("prepare_model_counts", e))?;
        let per_model = stmt
            .query_map([], |row| {
                let n: i64 = row.get(1)?;
                Ok((row.get(0)?, u64::try_from(n).unwrap_or_default()))
            })
            .map_err(|e| Error::failed("query_model_counts", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::failed("read_model_counts", e))?;

        Ok(InteractionSummary {
            count: u64::try_from(count).unwrap_or_default(),
            per_model,
            mean_execution_time,
        })
    }
}

impl std::fmt::Debug for InteractionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionLog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn interaction<'a>(model: &'a str, prompt: &'a str, seconds: f64) -> NewInteraction<'a> {
        NewInteraction {
            model,
            prompt,
            response: "A sunrise",
            temperature: 0.7,
            metadata: json!({"provider": "openai"}),
            execution_time: seconds,
        }
    }

    #[test]
    fn test_record_and_get() {
        let log = InteractionLog::in_memory().unwrap();
        let id = log.record(&interaction("gpt-4o-mini", "What did Melanie paint?", 1.5)).unwrap();

        let stored = log.get(id).unwrap().unwrap();
        assert_eq!(stored.model, "gpt-4o-mini");
        assert_eq!(stored.prompt, "What did Melanie paint?");
        assert_eq!(stored.response, "A sunrise");
        assert!((stored.temperature - 0.7).abs() < 1e-6);
        assert!((stored.execution_time - 1.5).abs() < 1e-12);
        assert!(stored.metadata.contains("openai"));
        let parsed = chrono::DateTime::parse_from_rfc3339(&stored.timestamp).unwrap();
        assert_eq!(
            parsed.offset().local_minus_utc(),
            chrono::Local::now().offset().local_minus_utc()
        );
        assert!(log.get(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_record_sanitizes() {
        let log = InteractionLog::in_memory().unwrap();
        let id = log.record(&interaction("gpt", "Café \u{1F600}trip", 0.1)).unwrap();
        let stored = log.get(id).unwrap().unwrap();
        assert_eq!(stored.prompt, "Caf? trip");
    }

    #[test]
    fn test_recent_newest_first_and_filtered() {
        let log = InteractionLog::in_memory().unwrap();
        log.record(&interaction("a", "first", 0.1)).unwrap();
        log.record(&interaction("b", "second", 0.2)).unwrap();
        log.record(&interaction("a", "third", 0.3)).unwrap();

        let all = log.recent(10, None).unwrap();
        let prompts: Vec<_> = all.iter().map(|r| r.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["third", "second", "first"]);

        assert_eq!(log.recent(1, None).unwrap().len(), 1);

        let only_a = log.recent(10, Some("a")).unwrap();
        assert_eq!(only_a.len(), 2);
        assert!(only_a.iter().all(|r| r.model == "a"));
    }

    #[test]
    fn test_count_and_summary() {
        let log = InteractionLog::in_memory().unwrap();
        assert_eq!(log.summary().unwrap(), InteractionSummary::default());

        log.record(&interaction("a", "p1", 1.0)).unwrap();
        log.record(&interaction("b", "p2", 2.0)).unwrap();
        log.record(&interaction("a", "p3", 3.0)).unwrap();

        assert_eq!(log.count().unwrap(), 3);
        let summary = log.summary().unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(
            summary.per_model,
            vec![("a".to_string(), 2), ("b".to_string(), 1)]
        );
        assert!((summary.mean_execution_time.unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("llm_logs.db");
        {
            let log = InteractionLog::open(&path).unwrap();
            log.record(&interaction("a", "p", 0.5)).unwrap();
            assert_eq!(log.path(), Some(path.as_path()));
        }
        let reopened = InteractionLog::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }
}
