//! Orchestrator (C9, §4.9, §6) — the external entry point. Sequences the
//! coordinator (C7), the validator (C8), six-dimension quality scoring, the
//! clinical-intelligence layer, and an optional refinement loop, under a
//! single overall deadline. Never propagates an internal error to the
//! caller: every failure mode collapses to `OrchestratorOutcome::failure`.

pub mod intelligence;
pub mod quality_score;
pub mod refine;

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::coordinator::{self, CoordinatorOptions};
use crate::config::{DEFAULT_MAX_REFINEMENT_ITERATIONS, DEFAULT_ORCHESTRATOR_DEADLINE, DEFAULT_QUALITY_THRESHOLD};
use crate::errors::OrchestratorError;
use crate::model::pattern::LearnedPattern;
use crate::model::quality::QualityReport;
use crate::model::record::{ExtractedRecord, PerformanceMetrics};
use crate::pattern_store::PatternStore;
use crate::validator::{self, ValidationOutcome};

use intelligence::IntelligenceReport;

/// Either a single note or a list of notes — the orchestrator's public
/// input shape mirrors the "string or list of strings" contract (§6).
#[derive(Debug, Clone)]
pub enum NotesInput {
    Single(String),
    Many(Vec<String>),
}

impl From<String> for NotesInput {
    fn from(note: String) -> Self {
        NotesInput::Single(note)
    }
}

impl From<Vec<String>> for NotesInput {
    fn from(notes: Vec<String>) -> Self {
        NotesInput::Many(notes)
    }
}

impl NotesInput {
    fn into_vec(self) -> Vec<String> {
        match self {
            NotesInput::Single(note) => vec![note],
            NotesInput::Many(notes) => notes,
        }
    }
}

/// Recognized orchestrator options (§6).
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Tri-state: `Some(true)` forces an LLM path, `Some(false)` forces the
    /// pattern path, `None` is auto. No LLM backend is wired into this core,
    /// so `Some(true)` degrades to the pattern path with a logged warning —
    /// see the corresponding note in DESIGN.md.
    pub use_llm: Option<bool>,
    pub use_patterns: bool,
    pub enable_deduplication: bool,
    pub enable_preprocessing: bool,
    pub include_confidence: bool,
    pub targets: Option<Vec<String>>,
    pub learned_patterns: Option<Vec<LearnedPattern>>,
    pub enable_learning: bool,
    pub enable_feedback_loops: bool,
    pub max_refinement_iterations: u32,
    pub quality_threshold: f32,
    pub deadline: Option<Duration>,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            use_llm: None,
            use_patterns: true,
            enable_deduplication: true,
            enable_preprocessing: true,
            include_confidence: true,
            targets: None,
            learned_patterns: None,
            enable_learning: false,
            enable_feedback_loops: false,
            max_refinement_iterations: DEFAULT_MAX_REFINEMENT_ITERATIONS,
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
            deadline: None,
        }
    }
}

impl OrchestratorOptions {
    fn coordinator_options(&self) -> CoordinatorOptions {
        CoordinatorOptions {
            enable_preprocessing: self.enable_preprocessing,
            enable_deduplication: self.enable_deduplication,
            targets: self.targets.clone(),
            learned_patterns: self.learned_patterns.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorMetadata {
    pub start_time: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub performance: PerformanceMetrics,
}

#[derive(Debug, Clone)]
pub struct OrchestratorOutcome {
    pub success: bool,
    pub summary: Option<String>,
    pub extracted_data: Option<ExtractedRecord>,
    pub validation: Option<ValidationOutcome>,
    pub intelligence: Option<IntelligenceReport>,
    pub quality_metrics: Option<QualityReport>,
    pub refinement_iterations: u32,
    pub metadata: OrchestratorMetadata,
    pub error: Option<String>,
}

impl OrchestratorOutcome {
    fn failure(message: impl Into<String>, start_time: DateTime<Utc>, elapsed: Duration) -> Self {
        Self {
            success: false,
            summary: None,
            extracted_data: None,
            validation: None,
            intelligence: None,
            quality_metrics: None,
            refinement_iterations: 0,
            metadata: OrchestratorMetadata {
                start_time,
                processing_time_ms: elapsed.as_millis() as u64,
                performance: PerformanceMetrics { overall: elapsed.as_millis() as u64, ..Default::default() },
            },
            error: Some(message.into()),
        }
    }
}

/// Synchronous convenience wrapper (§6) for callers without their own
/// tokio runtime already running.
pub fn run_extraction_blocking(
    notes: NotesInput,
    pre_extracted: Option<ExtractedRecord>,
    options: OrchestratorOptions,
    pattern_store: &dyn PatternStore,
) -> OrchestratorOutcome {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(error) => {
            return OrchestratorOutcome::failure(format!("failed to start runtime: {error}"), Utc::now(), Duration::ZERO);
        }
    };
    runtime.block_on(run_extraction(notes, pre_extracted, options, pattern_store))
}

/// The orchestrator entry point (§4.9, §6): sequences C7 -> C8 -> quality
/// scoring -> intelligence gathering -> optional refinement, under an
/// overall deadline. Every internal failure degrades to `success=false`
/// rather than propagating.
pub async fn run_extraction(
    notes: NotesInput,
    pre_extracted: Option<ExtractedRecord>,
    options: OrchestratorOptions,
    pattern_store: &dyn PatternStore,
) -> OrchestratorOutcome {
    let start = Instant::now();
    let start_time = Utc::now();
    let deadline = options.deadline.unwrap_or(DEFAULT_ORCHESTRATOR_DEADLINE);

    if matches!(options.use_llm, Some(true)) {
        tracing::warn!("useLLM=true requested but no LLM backend is configured; falling back to the pattern path");
    }

    let raw_notes: Vec<String> = notes.into_vec();
    if raw_notes.is_empty() || raw_notes.iter().all(|n| n.trim().is_empty()) {
        return OrchestratorOutcome::failure(OrchestratorError::InvalidInput.to_string(), start_time, start.elapsed());
    }

    let remaining = |deadline: Duration| deadline.saturating_sub(start.elapsed());
    let coordinator_options = options.coordinator_options();

    let context_start = Instant::now();
    let prepared = match tokio::time::timeout(remaining(deadline), coordinator::prepare_notes(raw_notes, &coordinator_options)).await {
        Ok(prepared) => prepared,
        Err(_) => return OrchestratorOutcome::failure(OrchestratorError::DeadlineExceeded.to_string(), start_time, start.elapsed()),
    };
    let combined_text = prepared.join("\n\n");
    let context_building_ms = context_start.elapsed().as_millis() as u64;

    let extraction_start = Instant::now();
    let record = match pre_extracted {
        Some(record) => record,
        None => match tokio::time::timeout(remaining(deadline), coordinator::run_extraction(&prepared, &coordinator_options, pattern_store)).await {
            Ok(record) => record,
            Err(_) => return OrchestratorOutcome::failure(OrchestratorError::DeadlineExceeded.to_string(), start_time, start.elapsed()),
        },
    };
    let extraction_ms = extraction_start.elapsed().as_millis() as u64;

    let validation_start = Instant::now();
    let validation = match validator::validate(record, &combined_text) {
        Ok(outcome) => outcome,
        Err(error) => return OrchestratorOutcome::failure(error.to_string(), start_time, start.elapsed()),
    };
    let validation_ms = validation_start.elapsed().as_millis() as u64;

    let quality_start = Instant::now();
    let mut quality = quality_score::compute_quality_report(&validation.validated_data, &validation);
    let quality_ms = quality_start.elapsed().as_millis() as u64;

    let intelligence_start = Instant::now();
    let intelligence_report = match tokio::time::timeout(
        remaining(deadline),
        intelligence::gather_intelligence(&validation.validated_data, &validation, pattern_store),
    )
    .await
    {
        Ok(report) => report,
        Err(_) => IntelligenceReport::default(),
    };
    let intelligence_ms = intelligence_start.elapsed().as_millis() as u64;

    let mut record = validation.validated_data.clone();
    let mut validation = validation;
    let mut refinement_iterations = 0;

    if options.enable_feedback_loops && quality.overall < options.quality_threshold {
        let refined = refine::refine(
            record.clone(),
            validation.clone(),
            quality.clone(),
            &intelligence_report,
            &combined_text,
            options.max_refinement_iterations,
        );
        record = refined.record;
        validation = refined.validation;
        quality = refined.quality;
        refinement_iterations = refined.iterations;
    }

    if options.enable_learning {
        apply_learning_feedback(&record, &validation, pattern_store);
    }

    let overall_ms = start.elapsed().as_millis() as u64;

    OrchestratorOutcome {
        success: true,
        summary: None,
        extracted_data: Some(record),
        validation: Some(validation),
        intelligence: Some(intelligence_report),
        quality_metrics: Some(quality),
        refinement_iterations,
        metadata: OrchestratorMetadata {
            start_time,
            processing_time_ms: overall_ms,
            performance: PerformanceMetrics {
                context_building: context_building_ms,
                extraction: extraction_ms,
                intelligence: intelligence_ms,
                validation: validation_ms,
                narrative: 0,
                quality_metrics: quality_ms,
                overall: overall_ms,
            },
        },
        error: None,
    }
}

/// `enableLearning` (§6): nudge learned-pattern confidence toward this
/// request's overall validation confidence via exponential smoothing, a
/// lightweight stand-in for a full correction-authoring pipeline. Read
/// failures degrade to a no-op and are logged, matching `PatternStoreUnavailable`.
fn apply_learning_feedback(record: &ExtractedRecord, validation: &ValidationOutcome, pattern_store: &dyn PatternStore) {
    let pathology_types: std::collections::HashSet<_> = record.pathology.iter().map(|p| p.pathology_type).collect();

    for pathology_type in pathology_types {
        match pattern_store.filter_by_pathology(pathology_type) {
            Ok(patterns) => {
                for pattern in patterns {
                    let smoothed = (pattern.confidence * 0.7 + validation.overall_confidence * 0.3).clamp(0.0, 1.0);
                    if let Err(error) = pattern_store.update_confidence(pattern.id, smoothed) {
                        tracing::warn!(%error, pattern_id = pattern.id, "failed to apply learning feedback");
                    }
                }
            }
            Err(error) => {
                tracing::warn!(%error, pathology = pathology_type.as_str(), "pattern store unavailable for learning feedback");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::enums::PathologyType;
    use crate::pattern_store::InMemoryPatternStore;

    fn sah_note() -> String {
        "55M, MRN: 12345678\nAdmission Date: October 10, 2025\nPatient underwent pterional craniotomy for MCA aneurysm clipping on October 11, 2025.\nNimodipine 60mg PO q4h for vasospasm prophylaxis.\nMild vasospasm on POD#5.\nDischarge Date: October 18, 2025.".to_string()
    }

    #[tokio::test]
    async fn empty_input_fails_fast_with_no_extracted_fields() {
        let store = InMemoryPatternStore::new();
        let outcome = run_extraction(NotesInput::Single(String::new()), None, OrchestratorOptions::default(), &store).await;
        assert!(!outcome.success);
        assert!(outcome.extracted_data.is_none());
        assert_eq!(outcome.error.as_deref(), Some("No valid input provided"));
    }

    #[tokio::test]
    async fn basic_sah_note_succeeds_end_to_end() {
        let store = InMemoryPatternStore::new();
        let outcome = run_extraction(NotesInput::Single(sah_note()), None, OrchestratorOptions::default(), &store).await;

        assert!(outcome.success);
        let record = outcome.extracted_data.expect("extracted data");
        assert!(record.pathology.iter().any(|p| p.pathology_type == PathologyType::Sah));
        assert!(outcome.validation.is_some());
        assert!(outcome.quality_metrics.is_some());
        assert!(outcome.intelligence.is_some());
    }

    #[tokio::test]
    async fn pre_extracted_record_is_trusted_but_still_validated() {
        let store = InMemoryPatternStore::new();
        let prepared = coordinator::prepare_notes(vec![sah_note()], &CoordinatorOptions::default()).await;
        let record = coordinator::run_extraction(&prepared, &CoordinatorOptions::default(), &store).await;

        let outcome = run_extraction(NotesInput::Single(sah_note()), Some(record), OrchestratorOptions::default(), &store).await;
        assert!(outcome.success);
        assert!(outcome.validation.is_some());
    }

    #[tokio::test]
    async fn deadline_of_zero_fails_with_deadline_exceeded() {
        let store = InMemoryPatternStore::new();
        let mut options = OrchestratorOptions::default();
        options.deadline = Some(Duration::from_nanos(1));
        let outcome = run_extraction(NotesInput::Single(sah_note()), None, options, &store).await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("deadline exceeded"));
    }
}
