//! Refinement loop (§4.9): when enabled and quality falls below threshold,
//! apply the intelligence layer's improvement suggestions to patch missing
//! fields, then re-validate and re-score. A patched record is kept only if
//! it scored strictly higher than what came before it.

use crate::model::record::ExtractedRecord;
use crate::validator::{self, ValidationOutcome};

use super::intelligence::IntelligenceReport;
use super::quality_score::compute_quality_report;
use crate::model::quality::QualityReport;

/// Best-effort patch pass: re-derives the `dates` anchors from the
/// canonical entities already on the record when the coordinator could not
/// anchor them directly. This is the one category the intelligence
/// "no admission date found" suggestion can act on without re-scanning text.
fn apply_suggestions(mut record: ExtractedRecord, report: &IntelligenceReport) -> ExtractedRecord {
    let missing_admission = report.improvement_suggestions.iter().any(|s| s.contains("no admission date found"));

    if missing_admission && record.reference_dates.admission.is_none() {
        record.reference_dates.admission = record.procedures.iter().filter_map(|p| p.date).min();
    }

    if record.reference_dates.first_procedure.is_none() {
        record.reference_dates.first_procedure = record.procedures.iter().filter_map(|p| p.date).min();
    }

    record
}

pub struct RefinementResult {
    pub record: ExtractedRecord,
    pub validation: ValidationOutcome,
    pub quality: QualityReport,
    pub iterations: u32,
}

/// Run up to `max_iterations` refinement passes. Each iteration patches the
/// record, re-validates against `source_text`, and re-scores; the loop
/// stops as soon as an iteration fails to improve `overall` quality.
pub fn refine(
    mut record: ExtractedRecord,
    mut validation: ValidationOutcome,
    mut quality: QualityReport,
    intelligence_report: &IntelligenceReport,
    source_text: &str,
    max_iterations: u32,
) -> RefinementResult {
    let mut iterations = 0;

    while iterations < max_iterations {
        let candidate_record = apply_suggestions(record.clone(), intelligence_report);
        let candidate_validation = match validator::validate(candidate_record.clone(), source_text) {
            Ok(outcome) => outcome,
            Err(_) => break,
        };
        let candidate_quality = compute_quality_report(&candidate_validation.validated_data, &candidate_validation);

        iterations += 1;

        if candidate_quality.overall > quality.overall {
            record = candidate_validation.validated_data.clone();
            validation = candidate_validation;
            quality = candidate_quality;
        } else {
            break;
        }
    }

    RefinementResult { record, validation, quality, iterations }
}
