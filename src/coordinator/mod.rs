//! Extraction coordinator (C7, §4.7): normalizes input, runs pre-processing
//! and cross-note deduplication, detects pathologies, loads learned patterns,
//! and dispatches the thirteen category extractors in dependency order.

pub mod dedup_notes;
pub mod patterns;
pub mod preprocess;

use std::collections::HashMap;

use crate::config::confidence_levels;
use crate::extractors;
use crate::model::enums::PathologyType;
use crate::model::pattern::LearnedPattern;
use crate::model::quality::SourceQualityReport;
use crate::model::record::{ExtractedRecord, ExtractionMetadata, PerformanceMetrics};
use crate::ontology::detect_pathology;
use crate::pattern_store::PatternStore;
use crate::quality::{assess_source_quality, calibrate_confidence};

/// Options the coordinator itself consumes — a narrow subset of
/// `orchestrator::OrchestratorOptions`, threaded down by the orchestrator
/// (§4.7, §6).
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    pub enable_preprocessing: bool,
    pub enable_deduplication: bool,
    pub targets: Option<Vec<String>>,
    pub learned_patterns: Option<Vec<LearnedPattern>>,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            enable_preprocessing: true,
            enable_deduplication: true,
            targets: None,
            learned_patterns: None,
        }
    }
}

fn wants(options: &CoordinatorOptions, category: &str) -> bool {
    match &options.targets {
        Some(targets) => targets.iter().any(|t| t == category),
        None => true,
    }
}

/// Step 1-3 of §4.7: normalize, optionally pre-process, and (for multi-note
/// input) deduplicate across notes. Returns the prepared note list; the
/// caller joins it with "\n\n" to get the combined text used both for
/// extraction and, later, for validation against the same text.
pub async fn prepare_notes(raw_notes: Vec<String>, options: &CoordinatorOptions) -> Vec<String> {
    let notes: Vec<String> = if options.enable_preprocessing {
        raw_notes.iter().map(|n| preprocess::normalize_institution_artifacts(n)).collect()
    } else {
        raw_notes
    };

    if options.enable_deduplication && notes.len() > 1 {
        dedup_notes::deduplicate_notes(notes).await
    } else {
        notes
    }
}

/// Steps 4-10 of §4.7, given already-prepared notes (see [`prepare_notes`]).
/// Infallible: every category extractor degrades to an empty/default value on
/// no match rather than erroring, so this function always returns a record.
pub async fn run_extraction(
    prepared_notes: &[String],
    options: &CoordinatorOptions,
    pattern_store: &dyn PatternStore,
) -> ExtractedRecord {
    let combined = prepared_notes.join("\n\n");

    // step 4: detect pathologies, cache the type list.
    let detections = detect_pathology(&combined);
    let pathology_types: Vec<PathologyType> = detections.iter().map(|d| d.pathology_type).collect();

    // step 5: assess source quality, cache the report.
    let quality_report = assess_source_quality(&combined);

    // step 6: load learned patterns filtered by detected pathologies, unless
    // the caller supplied an explicit override.
    let learned = load_learned_patterns(options, &pathology_types, pattern_store);

    // step 7: dispatch extractors in dependency order.
    let demographics =
        if wants(options, "demographics") { extractors::extract_demographics(&combined) } else { Default::default() };
    let reference_dates = extractors::extract_reference_dates(&combined);
    let pathology = if wants(options, "pathology") { extractors::extract_pathology(&combined) } else { Vec::new() };

    let (symptoms, symptoms_conf) = if wants(options, "symptoms") {
        extractors::extract_symptoms(&combined, &pathology_types, &reference_dates)
    } else {
        (Vec::new(), 0.0)
    };
    let (procedures, procedures_conf) = if wants(options, "procedures") {
        extractors::extract_procedures(&combined, &pathology_types, &reference_dates)
    } else {
        (Vec::new(), 0.0)
    };
    let (complications, complications_conf) = if wants(options, "complications") {
        extractors::extract_complications(&combined, &pathology_types, &reference_dates)
    } else {
        (Vec::new(), 0.0)
    };
    let (medications, medications_conf) = if wants(options, "medications") {
        extractors::extract_medications(&combined, &pathology_types, &reference_dates)
    } else {
        (Vec::new(), 0.0)
    };
    let (imaging, imaging_conf) = if wants(options, "imaging") {
        extractors::extract_imaging(&combined, &reference_dates)
    } else {
        (Vec::new(), 0.0)
    };
    let functional_scores =
        if wants(options, "functional_scores") { extractors::extract_functional_scores(&combined) } else { Default::default() };
    let (follow_up, follow_up_conf) = if wants(options, "follow_up") {
        extractors::extract_follow_up(&combined, &reference_dates)
    } else {
        (Vec::new(), 0.0)
    };
    let discharge_destination =
        if wants(options, "discharge_destination") { extractors::extract_discharge_destination(&combined) } else { None };
    let (anticoagulation, anticoagulation_conf) = if wants(options, "anticoagulation") {
        extractors::extract_anticoagulation(&combined, &reference_dates)
    } else {
        (Vec::new(), 0.0)
    };
    let (oncology_markers, oncology_conf) = if wants(options, "oncology_markers") {
        extractors::extract_oncology_markers(&combined, &pathology_types, &reference_dates)
    } else {
        (Vec::new(), 0.0)
    };
    let late_recovery = extractors::detect_late_recovery(&combined, &reference_dates);

    // step 8: apply learned patterns against the categories they target.
    let (procedures, complications, medications) =
        patterns::apply_learned_patterns(&combined, &reference_dates, &learned, procedures, complications, medications);

    // step 9: calibrate every confidence via the source-quality report.
    let pathology_conf = pathology.iter().map(|p| p.confidence).fold(0.0_f32, f32::max);
    let dates_conf = dates_confidence(&reference_dates);

    let mut confidence: HashMap<String, f32> = HashMap::new();
    confidence.insert("demographics".into(), calibrate_confidence(demographics.confidence, &quality_report));
    confidence.insert("dates".into(), calibrate_confidence(dates_conf, &quality_report));
    confidence.insert("pathology".into(), calibrate_confidence(pathology_conf, &quality_report));
    confidence.insert("symptoms".into(), calibrate_confidence(symptoms_conf, &quality_report));
    confidence.insert("procedures".into(), calibrate_confidence(procedures_conf, &quality_report));
    confidence.insert("complications".into(), calibrate_confidence(complications_conf, &quality_report));
    confidence.insert("medications".into(), calibrate_confidence(medications_conf, &quality_report));
    confidence.insert("imaging".into(), calibrate_confidence(imaging_conf, &quality_report));
    confidence.insert(
        "functional_scores".into(),
        calibrate_confidence(functional_scores.confidence, &quality_report),
    );
    confidence.insert("follow_up".into(), calibrate_confidence(follow_up_conf, &quality_report));
    confidence.insert(
        "discharge_destination".into(),
        calibrate_confidence(discharge_destination.as_ref().map(|d| d.confidence).unwrap_or(0.0), &quality_report),
    );
    confidence.insert("anticoagulation".into(), calibrate_confidence(anticoagulation_conf, &quality_report));
    confidence.insert("oncology_markers".into(), calibrate_confidence(oncology_conf, &quality_report));

    // step 10: assemble metadata and the final record.
    let metadata = ExtractionMetadata {
        method: "pattern".to_string(),
        note_count: prepared_notes.len(),
        total_length: combined.len(),
        source_quality: Some(quality_report),
        performance: PerformanceMetrics::default(),
    };

    ExtractedRecord {
        demographics,
        reference_dates,
        pathology,
        symptoms,
        procedures,
        complications,
        medications,
        imaging,
        functional_scores,
        follow_up,
        discharge_destination,
        anticoagulation,
        oncology_markers,
        late_recovery,
        confidence,
        metadata,
    }
}

/// The dates category has no single extractor-emitted confidence — derive
/// one from how many of the anchor set's fields resolved, since §8
/// invariant 2 requires every populated category to carry a confidence.
fn dates_confidence(reference_dates: &crate::model::entity::ReferenceDates) -> f32 {
    let populated = [
        reference_dates.ictus.is_some(),
        reference_dates.admission.is_some(),
        reference_dates.discharge.is_some(),
        reference_dates.first_procedure.is_some(),
    ]
    .into_iter()
    .filter(|p| *p)
    .count();

    match populated {
        0 => 0.0,
        1 => confidence_levels::LOW,
        2 => confidence_levels::MEDIUM,
        _ => confidence_levels::HIGH,
    }
}

fn load_learned_patterns(
    options: &CoordinatorOptions,
    pathology_types: &[PathologyType],
    pattern_store: &dyn PatternStore,
) -> Vec<LearnedPattern> {
    if let Some(explicit) = &options.learned_patterns {
        return explicit.clone();
    }

    let mut learned = Vec::new();
    for pathology_type in pathology_types {
        match pattern_store.filter_by_pathology(*pathology_type) {
            Ok(mut matched) => learned.append(&mut matched),
            Err(error) => {
                tracing::warn!(%error, pathology = pathology_type.as_str(), "pattern store unavailable, proceeding with empty learned set");
            }
        }
    }
    learned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern_store::InMemoryPatternStore;

    #[tokio::test]
    async fn basic_sah_note_populates_expected_categories() {
        let text = "55M, MRN: 12345678\nAdmission Date: October 10, 2025\nPatient underwent pterional craniotomy for MCA aneurysm clipping on October 11, 2025.\nNimodipine 60mg PO q4h for vasospasm prophylaxis.\nMild vasospasm on POD#5.\nDischarge Date: October 18, 2025.";
        let store = InMemoryPatternStore::new();
        let options = CoordinatorOptions::default();
        let prepared = prepare_notes(vec![text.to_string()], &options).await;
        let record = run_extraction(&prepared, &options, &store).await;

        assert_eq!(record.demographics.age, Some(55));
        assert!(record.pathology.iter().any(|p| p.pathology_type == PathologyType::Sah));
        assert!(record.procedures.iter().any(|p| p.name.to_lowercase().contains("craniotomy")));
        assert!(record.complications.iter().any(|c| c.name.to_lowercase().contains("vasospasm")));
        assert!(record.medications.iter().any(|m| m.name.to_lowercase().contains("nimodipine")));
    }

    #[tokio::test]
    async fn targets_option_restricts_which_extractors_run() {
        let text = "Patient had surgery. Nimodipine started.";
        let store = InMemoryPatternStore::new();
        let mut options = CoordinatorOptions::default();
        options.targets = Some(vec!["demographics".to_string()]);
        let prepared = prepare_notes(vec![text.to_string()], &options).await;
        let record = run_extraction(&prepared, &options, &store).await;

        assert!(record.medications.is_empty());
        assert!(record.procedures.is_empty());
    }

    #[tokio::test]
    async fn empty_note_yields_empty_categories_without_panicking() {
        let store = InMemoryPatternStore::new();
        let options = CoordinatorOptions::default();
        let prepared = prepare_notes(vec![String::new()], &options).await;
        let record = run_extraction(&prepared, &options, &store).await;
        assert!(record.procedures.is_empty());
        assert!(record.pathology.is_empty());
    }
}
