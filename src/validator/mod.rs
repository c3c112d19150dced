//! Validator (C8, §4.8): checks an `ExtractedRecord` against the source
//! text it was built from, in two independent passes — a per-literal
//! no-extrapolation check ([`no_extrapolation`]) and a set of cross-field
//! logical consistency checks ([`logical`]) — then folds both into a
//! single `ValidationOutcome` the orchestrator can act on.

pub mod abbreviations;
pub mod logical;
pub mod no_extrapolation;

use crate::config::confidence_levels;
use crate::errors::ValidationError;
use crate::model::enums::FlagSeverity;
use crate::model::record::ExtractedRecord;

/// A literal that failed the no-extrapolation check (§4.8). Flags never
/// abort validation; they prune data only for the categories that allow it.
#[derive(Debug, Clone)]
pub struct ValidationFlag {
    pub category: String,
    pub field: String,
    pub value: String,
    pub severity: FlagSeverity,
    pub reason: String,
}

/// A non-fatal cross-field observation (§4.8) — informational, never prunes.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub message: String,
}

/// A cross-field inconsistency severe enough to prune the offending value
/// and to make `ValidationOutcome::is_valid` false (§4.8).
#[derive(Debug, Clone)]
pub struct ValidationErrorEntry {
    pub message: String,
}

/// Full result of validating one `ExtractedRecord` (§4.8, §6).
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub overall_confidence: f32,
    pub warnings: Vec<ValidationWarning>,
    pub errors: Vec<ValidationErrorEntry>,
    pub flags: Vec<ValidationFlag>,
    pub validated_data: ExtractedRecord,
    pub invalid_fields: Vec<String>,
}

pub(crate) fn category_is_populated(record: &ExtractedRecord, category: &str) -> bool {
    match category {
        "demographics" => {
            let d = &record.demographics;
            d.name.is_some() || d.mrn.is_some() || d.dob.is_some() || d.age.is_some() || d.sex.is_some()
        }
        "dates" => {
            let r = &record.reference_dates;
            r.ictus.is_some() || r.admission.is_some() || r.discharge.is_some() || r.first_procedure.is_some()
        }
        "pathology" => !record.pathology.is_empty(),
        "symptoms" => !record.symptoms.is_empty(),
        "procedures" => !record.procedures.is_empty(),
        "complications" => !record.complications.is_empty(),
        "medications" => !record.medications.is_empty(),
        "imaging" => !record.imaging.is_empty(),
        "functional_scores" => {
            let f = &record.functional_scores;
            f.kps.is_some() || f.ecog.is_some() || f.mrs.is_some() || f.hunt_hess.is_some() || f.fisher.is_some()
        }
        "follow_up" => !record.follow_up.is_empty(),
        "discharge_destination" => record.discharge_destination.is_some(),
        "anticoagulation" => !record.anticoagulation.is_empty(),
        "oncology_markers" => !record.oncology_markers.is_empty(),
        _ => false,
    }
}

/// Product of per-category confidences, restricted to categories that
/// actually produced data (§4.8, §9 Open Question: an empty category has
/// no opinion to multiply into the record's overall confidence).
fn compute_overall_confidence(record: &ExtractedRecord) -> f32 {
    let mut product: f32 = 1.0;
    let mut any_populated = false;

    for category in ExtractedRecord::category_names() {
        if !crate::validator::category_is_populated(record, category) {
            continue;
        }
        any_populated = true;
        if let Some(confidence) = record.confidence.get(*category) {
            product *= confidence.clamp(0.0, 1.0);
        }
    }

    if !any_populated {
        return 0.0;
    }

    product.clamp(0.0, 1.0)
}

/// Validate `record` against the exact text it was extracted from. Mutates
/// a copy of the record in place: unsupported literals in prunable
/// categories are removed, out-of-range scores are nulled, and
/// surgery-before-admission drops the surgery anchor, all before the
/// confidence product and `isValid` verdict are computed.
pub fn validate(record: ExtractedRecord, source_text: &str) -> Result<ValidationOutcome, ValidationError> {
    if source_text.trim().is_empty() {
        return Err(ValidationError::MissingSource("source text is empty".to_string()));
    }

    let mut record = record;
    let flags = no_extrapolation::check_no_extrapolation(&mut record, source_text);

    let mut warnings = Vec::new();
    let mut errors = Vec::new();
    let mut invalid_fields = Vec::new();
    logical::run_logical_checks(&mut record, &mut warnings, &mut errors, &mut invalid_fields);

    let overall_confidence = compute_overall_confidence(&record);
    let is_valid = errors.is_empty() && overall_confidence >= confidence_levels::MEDIUM;

    Ok(ValidationOutcome {
        is_valid,
        overall_confidence,
        warnings,
        errors,
        flags,
        validated_data: record,
        invalid_fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::{CanonicalEntity, ReferenceDates};
    use crate::model::record::{Demographics, ExtractionMetadata, FunctionalScores, LateRecoveryFlag, PerformanceMetrics};
    use std::collections::HashMap;

    fn minimal_record() -> ExtractedRecord {
        let mut confidence = HashMap::new();
        confidence.insert("procedures".to_string(), 0.8);

        ExtractedRecord {
            demographics: Demographics::default(),
            reference_dates: ReferenceDates::default(),
            pathology: Vec::new(),
            symptoms: Vec::new(),
            procedures: vec![CanonicalEntity::new("craniotomy".to_string())],
            complications: Vec::new(),
            medications: Vec::new(),
            imaging: Vec::new(),
            functional_scores: FunctionalScores::default(),
            follow_up: Vec::new(),
            discharge_destination: None,
            anticoagulation: Vec::new(),
            oncology_markers: Vec::new(),
            late_recovery: LateRecoveryFlag::default(),
            confidence,
            metadata: ExtractionMetadata {
                method: "pattern".to_string(),
                note_count: 1,
                total_length: 0,
                source_quality: None,
                performance: PerformanceMetrics::default(),
            },
        }
    }

    #[test]
    fn rejects_empty_source_text() {
        let result = validate(minimal_record(), "   ");
        assert!(matches!(result, Err(ValidationError::MissingSource(_))));
    }

    #[test]
    fn valid_record_with_supported_literal_and_high_confidence() {
        let outcome = validate(minimal_record(), "Patient underwent craniotomy for evacuation.").unwrap();
        assert!(outcome.is_valid);
        assert!((outcome.overall_confidence - 0.8).abs() < 1e-6);
        assert!(outcome.flags.is_empty());
    }

    #[test]
    fn unsupported_literal_prunes_and_lowers_confidence_to_zero() {
        let outcome = validate(minimal_record(), "Patient was observed with no intervention.").unwrap();
        assert!(outcome.validated_data.procedures.is_empty());
        assert!(!outcome.flags.is_empty());
        assert!(!outcome.is_valid);
    }

    #[test]
    fn empty_record_has_zero_confidence_and_is_invalid() {
        let mut record = minimal_record();
        record.procedures.clear();
        record.confidence.clear();
        let outcome = validate(record, "Patient doing well today.").unwrap();
        assert_eq!(outcome.overall_confidence, 0.0);
        assert!(!outcome.is_valid);
    }
}
