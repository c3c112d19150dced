use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{DateSource, ReferenceType};

/// Anchor set used to resolve relative dates (§3, §4.3). Computed once per
/// extraction call and threaded read-only into every later extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceDates {
    pub ictus: Option<NaiveDate>,
    pub admission: Option<NaiveDate>,
    pub discharge: Option<NaiveDate>,
    pub first_procedure: Option<NaiveDate>,
    pub surgery_dates: Vec<NaiveDate>,
}

impl ReferenceDates {
    /// Resolve a POD offset against `firstProcedure`, falling back to `admission` (§4.3).
    pub fn resolve_pod(&self, pod: i64) -> Option<NaiveDate> {
        self.first_procedure
            .or(self.admission)
            .map(|anchor| anchor + chrono::Duration::days(pod))
    }
}

/// Per-mention temporal classification (§3, §4.3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TemporalContext {
    pub is_reference: bool,
    pub pod: Option<i64>,
    pub reference_type: ReferenceType,
    pub confidence: f32,
}

/// An intermediate, pre-deduplication mention of a clinical entity (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMention {
    pub name: String,
    pub position: usize,
    pub date: Option<NaiveDate>,
    pub date_source: DateSource,
    pub temporal_context: TemporalContext,
    pub confidence: f32,
    /// The exact substring matched in source text — used by the validator's
    /// no-extrapolation check without re-scanning the note.
    pub source_excerpt: String,
}

/// A deduplication cluster's representative (§3, §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalEntity {
    pub id: Uuid,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub date_history: Vec<NaiveDate>,
    pub merged_from: usize,
    pub confidence: f32,
    pub linked_references: Vec<Uuid>,
    pub severity: Option<super::enums::ComplicationSeverity>,
    pub status: Option<super::enums::MedicationStatus>,
}

impl CanonicalEntity {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            date: None,
            date_history: Vec::new(),
            merged_from: 1,
            confidence: 0.0,
            linked_references: Vec::new(),
            severity: None,
            status: None,
        }
    }
}
