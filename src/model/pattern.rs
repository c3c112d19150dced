use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::PathologyType;

/// One historical version of a `LearnedPattern`'s pattern/value-template (§3, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternVersion {
    pub pattern: String,
    pub value_template: String,
    pub confidence: f32,
    pub recorded_at: DateTime<Utc>,
}

/// A persisted, learned extraction pattern (§3, §4.10, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedPattern {
    pub id: u64,
    pub field: String,
    pub pathology: Option<PathologyType>,
    pub pattern: String,
    pub value_template: String,
    pub enabled: bool,
    pub confidence: f32,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub version_history: Vec<PatternVersion>,
}

/// Privacy-safe export/import representation (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternExport {
    pub exported_at: DateTime<Utc>,
    pub version: u32,
    pub patterns: Vec<LearnedPattern>,
    pub corrections: Vec<PatternCorrection>,
    pub metrics: Vec<PatternMetric>,
}

/// A validator-feedback-driven correction applied to a learned pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternCorrection {
    pub pattern_id: u64,
    pub field: String,
    pub note: String,
    pub recorded_at: DateTime<Utc>,
}

/// A usage metric snapshot for a learned pattern (hit count, etc.).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternMetric {
    pub pattern_id: u64,
    pub hits: u64,
    pub misses: u64,
    pub recorded_at: DateTime<Utc>,
}

/// Current export format version. Bumped on breaking schema changes (§6).
pub const PATTERN_EXPORT_VERSION: u32 = 1;
