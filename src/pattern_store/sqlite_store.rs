//! SQLite-backed [`super::PatternStore`] (§4.10), following the teacher's
//! `db::sqlite`/`db::repository` convention: a single connection behind a
//! `Mutex`, one `CREATE TABLE IF NOT EXISTS` run at open, plain `rusqlite`
//! row mapping rather than an ORM.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::PatternStoreError;
use crate::model::enums::PathologyType;
use crate::model::pattern::{LearnedPattern, PatternExport, PatternVersion, PATTERN_EXPORT_VERSION};

use super::{NewLearnedPattern, PatternStore};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS learned_patterns (
        id              INTEGER PRIMARY KEY,
        field           TEXT NOT NULL,
        pathology       TEXT,
        pattern         TEXT NOT NULL,
        value_template  TEXT NOT NULL,
        enabled         INTEGER NOT NULL DEFAULT 1,
        confidence      REAL NOT NULL,
        created_at      TEXT NOT NULL,
        last_updated    TEXT NOT NULL,
        version_history TEXT NOT NULL DEFAULT '[]'
    );
    CREATE INDEX IF NOT EXISTS idx_patterns_field ON learned_patterns(field);
    CREATE INDEX IF NOT EXISTS idx_patterns_pathology ON learned_patterns(pathology);
    CREATE INDEX IF NOT EXISTS idx_patterns_confidence ON learned_patterns(confidence);
    CREATE INDEX IF NOT EXISTS idx_patterns_created_at ON learned_patterns(created_at);
";

pub struct SqlitePatternStore {
    conn: Mutex<Connection>,
}

impl SqlitePatternStore {
    pub fn open(path: &Path) -> Result<Self, PatternStoreError> {
        let conn = Connection::open(path).map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, PatternStoreError> {
        let conn = Connection::open_in_memory().map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, PatternStoreError> {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        conn.execute_batch(SCHEMA).map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

fn row_to_pattern(row: &rusqlite::Row) -> rusqlite::Result<LearnedPattern> {
    let pathology_str: Option<String> = row.get(2)?;
    let created_at: String = row.get(7)?;
    let last_updated: String = row.get(8)?;
    let version_history_json: String = row.get(9)?;

    Ok(LearnedPattern {
        id: row.get::<_, i64>(0)? as u64,
        field: row.get(1)?,
        pathology: pathology_str.and_then(|s| PathologyType::parse(&s)),
        pattern: row.get(3)?,
        value_template: row.get(4)?,
        enabled: row.get::<_, i64>(5)? != 0,
        confidence: row.get(6)?,
        created_at: created_at.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now()),
        last_updated: last_updated.parse::<DateTime<Utc>>().unwrap_or_else(|_| Utc::now()),
        version_history: serde_json::from_str::<Vec<PatternVersion>>(&version_history_json).unwrap_or_default(),
    })
}

const SELECT_COLUMNS: &str = "id, field, pathology, pattern, value_template, enabled, confidence, created_at, last_updated, version_history";

impl PatternStore for SqlitePatternStore {
    fn list_all(&self) -> Result<Vec<LearnedPattern>, PatternStoreError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(&format!("SELECT {SELECT_COLUMNS} FROM learned_patterns ORDER BY id"))
            .map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        let rows = stmt
            .query_map([], row_to_pattern)
            .map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(|e| PatternStoreError::Backend(e.to_string()))
    }

    fn filter_by_field(&self, field: &str) -> Result<Vec<LearnedPattern>, PatternStoreError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(&format!("SELECT {SELECT_COLUMNS} FROM learned_patterns WHERE field = ?1 ORDER BY id"))
            .map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        let rows = stmt
            .query_map(params![field], row_to_pattern)
            .map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(|e| PatternStoreError::Backend(e.to_string()))
    }

    fn filter_by_pathology(&self, pathology: PathologyType) -> Result<Vec<LearnedPattern>, PatternStoreError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(&format!("SELECT {SELECT_COLUMNS} FROM learned_patterns WHERE pathology = ?1 ORDER BY id"))
            .map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        let rows = stmt
            .query_map(params![pathology.as_str()], row_to_pattern)
            .map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(|e| PatternStoreError::Backend(e.to_string()))
    }

    fn insert(&self, pattern: NewLearnedPattern) -> Result<u64, PatternStoreError> {
        super::scan_for_phi_pub(&pattern);
        let now = Utc::now().to_rfc3339();
        let conn = self.lock();
        conn.execute(
            "INSERT INTO learned_patterns
             (field, pathology, pattern, value_template, enabled, confidence, created_at, last_updated, version_history)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6, ?6, '[]')",
            params![
                pattern.field,
                pattern.pathology.map(|p| p.as_str().to_string()),
                pattern.pattern,
                pattern.value_template,
                pattern.confidence,
                now,
            ],
        )
        .map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        Ok(conn.last_insert_rowid() as u64)
    }

    fn update_confidence(&self, id: u64, confidence: f32) -> Result<(), PatternStoreError> {
        let conn = self.lock();
        let existing: Option<(String, String, f32, String)> = conn
            .query_row(
                "SELECT pattern, value_template, confidence, version_history FROM learned_patterns WHERE id = ?1",
                params![id as i64],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .map_err(|e| PatternStoreError::Backend(e.to_string()))?;

        let Some((pattern, value_template, old_confidence, history_json)) = existing else {
            return Err(PatternStoreError::NotFound(id));
        };

        let mut history: Vec<PatternVersion> = serde_json::from_str(&history_json).unwrap_or_default();
        history.push(PatternVersion {
            pattern,
            value_template,
            confidence: old_confidence,
            recorded_at: Utc::now(),
        });
        let history_json = serde_json::to_string(&history).unwrap_or_else(|_| "[]".to_string());

        conn.execute(
            "UPDATE learned_patterns SET confidence = ?1, last_updated = ?2, version_history = ?3 WHERE id = ?4",
            params![confidence, Utc::now().to_rfc3339(), history_json, id as i64],
        )
        .map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        Ok(())
    }

    fn delete(&self, id: u64) -> Result<(), PatternStoreError> {
        let conn = self.lock();
        let affected = conn
            .execute("DELETE FROM learned_patterns WHERE id = ?1", params![id as i64])
            .map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        if affected == 0 {
            return Err(PatternStoreError::NotFound(id));
        }
        Ok(())
    }

    fn export(&self) -> Result<PatternExport, PatternStoreError> {
        Ok(PatternExport {
            exported_at: Utc::now(),
            version: PATTERN_EXPORT_VERSION,
            patterns: self.list_all()?,
            corrections: Vec::new(),
            metrics: Vec::new(),
        })
    }

    fn import(&self, export: PatternExport) -> Result<(), PatternStoreError> {
        if export.version != PATTERN_EXPORT_VERSION {
            tracing::warn!(
                expected = PATTERN_EXPORT_VERSION,
                found = export.version,
                "pattern export version mismatch, attempting best-effort import"
            );
        }
        let mut conn = self.lock();
        let tx = conn.transaction().map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        for pattern in export.patterns {
            let history_json = serde_json::to_string(&pattern.version_history).unwrap_or_else(|_| "[]".to_string());
            tx.execute(
                "INSERT INTO learned_patterns
                 (id, field, pathology, pattern, value_template, enabled, confidence, created_at, last_updated, version_history)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(id) DO UPDATE SET
                    field = excluded.field, pathology = excluded.pathology, pattern = excluded.pattern,
                    value_template = excluded.value_template, enabled = excluded.enabled,
                    confidence = excluded.confidence, last_updated = excluded.last_updated,
                    version_history = excluded.version_history",
                params![
                    pattern.id as i64,
                    pattern.field,
                    pattern.pathology.map(|p| p.as_str().to_string()),
                    pattern.pattern,
                    pattern.value_template,
                    pattern.enabled as i64,
                    pattern.confidence,
                    pattern.created_at.to_rfc3339(),
                    pattern.last_updated.to_rfc3339(),
                    history_json,
                ],
            )
            .map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        }
        tx.commit().map_err(|e| PatternStoreError::Backend(e.to_string()))?;
        Ok(())
    }
}
