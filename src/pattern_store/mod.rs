//! Pattern store (C10, §4.10, §6). The core depends only on a narrow set of
//! operations against an opaque `patternId -> LearnedPattern` mapping: list,
//! filter-by-field, filter-by-pathology, insert, update confidence, delete,
//! snapshot/rollback by version. The durable backing (here: SQLite, via the
//! teacher's `rusqlite`/`db::sqlite` convention) is an implementation detail
//! behind the [`PatternStore`] trait — callers may substitute their own.

pub mod sqlite_store;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex};

use chrono::Utc;
use regex::Regex;

use crate::errors::PatternStoreError;
use crate::model::enums::PathologyType;
use crate::model::pattern::{LearnedPattern, PatternExport, PatternVersion, PATTERN_EXPORT_VERSION};

pub use sqlite_store::SqlitePatternStore;

/// Fields for a pattern not yet assigned an id (§4.10).
#[derive(Debug, Clone)]
pub struct NewLearnedPattern {
    pub field: String,
    pub pathology: Option<PathologyType>,
    pub pattern: String,
    pub value_template: String,
    pub confidence: f32,
}

/// The narrow contract the extraction core depends on against the pattern
/// store (§4.10, §6). Implementors MUST support concurrent readers and
/// serialized writers with transactional insert/update (§5); a request's
/// reads see a consistent snapshot unaffected by concurrent writers.
pub trait PatternStore: Send + Sync {
    fn list_all(&self) -> Result<Vec<LearnedPattern>, PatternStoreError>;
    fn filter_by_field(&self, field: &str) -> Result<Vec<LearnedPattern>, PatternStoreError>;
    fn filter_by_pathology(&self, pathology: PathologyType) -> Result<Vec<LearnedPattern>, PatternStoreError>;
    fn insert(&self, pattern: NewLearnedPattern) -> Result<u64, PatternStoreError>;
    fn update_confidence(&self, id: u64, confidence: f32) -> Result<(), PatternStoreError>;
    fn delete(&self, id: u64) -> Result<(), PatternStoreError>;
    fn export(&self) -> Result<PatternExport, PatternStoreError>;
    /// Import an export bundle. A version mismatch MUST be logged as a
    /// warning and the import attempted best-effort rather than rejected (§6).
    fn import(&self, export: PatternExport) -> Result<(), PatternStoreError>;
}

static RE_SSN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());
static RE_PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{10}\b").unwrap());
static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\w.+-]+@[\w-]+\.[\w.-]+").unwrap());
static RE_FULL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b").unwrap());

/// Heuristic PHI scan run on insert (§4.10): the store's consumer is
/// expected to keep learned patterns anonymized, but the store itself also
/// scans for SSNs, 10-digit phone numbers, emails, and generic
/// "FirstName LastName" shapes, logging a warning (never rejecting) on a hit.
fn scan_for_phi(pattern: &NewLearnedPattern) {
    let haystack = format!("{} {}", pattern.pattern, pattern.value_template);
    let hits: Vec<&str> = [
        RE_SSN.is_match(&haystack).then_some("ssn-like"),
        RE_PHONE.is_match(&haystack).then_some("phone-like"),
        RE_EMAIL.is_match(&haystack).then_some("email-like"),
        RE_FULL_NAME.is_match(&haystack).then_some("name-like"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if !hits.is_empty() {
        tracing::warn!(field = %pattern.field, hits = ?hits, "learned pattern insert looks like it may contain PHI");
    }
}

/// In-process pattern store for tests and embedders that don't need
/// durability across runs. Backed by a single `Mutex` — adequate for the
/// single-process, cooperative-pipeline model in §5; a durable deployment
/// uses [`SqlitePatternStore`] instead.
#[derive(Default)]
pub struct InMemoryPatternStore {
    patterns: Mutex<HashMap<u64, LearnedPattern>>,
    next_id: AtomicU64,
}

impl InMemoryPatternStore {
    pub fn new() -> Self {
        Self { patterns: Mutex::new(HashMap::new()), next_id: AtomicU64::new(1) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, LearnedPattern>> {
        self.patterns.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

impl PatternStore for InMemoryPatternStore {
    fn list_all(&self) -> Result<Vec<LearnedPattern>, PatternStoreError> {
        let mut out: Vec<LearnedPattern> = self.lock().values().cloned().collect();
        out.sort_by_key(|p| p.id);
        Ok(out)
    }

    fn filter_by_field(&self, field: &str) -> Result<Vec<LearnedPattern>, PatternStoreError> {
        Ok(self.list_all()?.into_iter().filter(|p| p.field == field).collect())
    }

    fn filter_by_pathology(&self, pathology: PathologyType) -> Result<Vec<LearnedPattern>, PatternStoreError> {
        Ok(self.list_all()?.into_iter().filter(|p| p.pathology == Some(pathology)).collect())
    }

    fn insert(&self, new_pattern: NewLearnedPattern) -> Result<u64, PatternStoreError> {
        scan_for_phi(&new_pattern);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let record = LearnedPattern {
            id,
            field: new_pattern.field,
            pathology: new_pattern.pathology,
            pattern: new_pattern.pattern,
            value_template: new_pattern.value_template,
            enabled: true,
            confidence: new_pattern.confidence,
            created_at: now,
            last_updated: now,
            version_history: Vec::new(),
        };
        self.lock().insert(id, record);
        Ok(id)
    }

    fn update_confidence(&self, id: u64, confidence: f32) -> Result<(), PatternStoreError> {
        let mut guard = self.lock();
        let record = guard.get_mut(&id).ok_or(PatternStoreError::NotFound(id))?;
        record.version_history.push(PatternVersion {
            pattern: record.pattern.clone(),
            value_template: record.value_template.clone(),
            confidence: record.confidence,
            recorded_at: record.last_updated,
        });
        record.confidence = confidence;
        record.last_updated = Utc::now();
        Ok(())
    }

    fn delete(&self, id: u64) -> Result<(), PatternStoreError> {
        self.lock().remove(&id).ok_or(PatternStoreError::NotFound(id))?;
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
        let mut guard = self.lock();
        let mut max_id = 0;
        for pattern in export.patterns {
            max_id = max_id.max(pattern.id);
            guard.insert(pattern.id, pattern);
        }
        drop(guard);
        let current = self.next_id.load(Ordering::SeqCst);
        if max_id + 1 > current {
            self.next_id.store(max_id + 1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(field: &str) -> NewLearnedPattern {
        NewLearnedPattern {
            field: field.to_string(),
            pathology: Some(PathologyType::Sah),
            pattern: r"(?i)vasospasm".to_string(),
            value_template: "vasospasm".to_string(),
            confidence: 0.6,
        }
    }

    #[test]
    fn insert_then_list_round_trips() {
        let store = InMemoryPatternStore::new();
        let id = store.insert(pattern("complications")).unwrap();
        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
    }

    #[test]
    fn filter_by_field_and_pathology() {
        let store = InMemoryPatternStore::new();
        store.insert(pattern("complications")).unwrap();
        store.insert(pattern("procedures")).unwrap();
        assert_eq!(store.filter_by_field("complications").unwrap().len(), 1);
        assert_eq!(store.filter_by_pathology(PathologyType::Sah).unwrap().len(), 2);
        assert_eq!(store.filter_by_pathology(PathologyType::Spine).unwrap().len(), 0);
    }

    #[test]
    fn update_confidence_records_version_history() {
        let store = InMemoryPatternStore::new();
        let id = store.insert(pattern("complications")).unwrap();
        store.update_confidence(id, 0.9).unwrap();
        let all = store.list_all().unwrap();
        assert_eq!(all[0].confidence, 0.9);
        assert_eq!(all[0].version_history.len(), 1);
        assert_eq!(all[0].version_history[0].confidence, 0.6);
    }

    #[test]
    fn delete_unknown_id_errors() {
        let store = InMemoryPatternStore::new();
        assert!(matches!(store.delete(999), Err(PatternStoreError::NotFound(999))));
    }

    #[test]
    fn export_import_round_trips() {
        let store = InMemoryPatternStore::new();
        store.insert(pattern("complications")).unwrap();
        let bundle = store.export().unwrap();

        let store2 = InMemoryPatternStore::new();
        store2.import(bundle).unwrap();
        assert_eq!(store2.list_all().unwrap().len(), 1);
    }

    #[test]
    fn version_mismatch_on_import_is_best_effort() {
        let store = InMemoryPatternStore::new();
        let mut bundle = store.export().unwrap();
        bundle.version = 999;
        let store2 = InMemoryPatternStore::new();
        assert!(store2.import(bundle).is_ok());
    }
}
