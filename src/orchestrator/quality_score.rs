//! Six-dimension quality scoring (§4.9): weighted blend of completeness,
//! accuracy, consistency, narrative quality, specificity, and timeliness,
//! each in [0,1], combined via the weights in [`crate::config::quality_weights`].

use std::collections::HashMap;

use crate::config::quality_weights;
use crate::model::enums::FlagSeverity;
use crate::model::quality::QualityReport;
use crate::model::record::ExtractedRecord;
use crate::validator::ValidationOutcome;

fn flag_penalty(severity: FlagSeverity) -> f32 {
    match severity {
        FlagSeverity::Critical => 1.0,
        FlagSeverity::High => 0.6,
        FlagSeverity::Medium => 0.3,
        FlagSeverity::Low => 0.1,
    }
}

/// Fraction of the thirteen categories that produced at least one value.
fn completeness(record: &ExtractedRecord) -> f32 {
    let populated = ExtractedRecord::category_names()
        .iter()
        .filter(|c| crate::validator::category_is_populated(record, c))
        .count();
    populated as f32 / ExtractedRecord::category_names().len() as f32
}

/// 1.0 minus the weighted no-extrapolation flag penalty, normalized by how
/// many literal-bearing entities were checked in the first place.
fn accuracy(record: &ExtractedRecord, validation: &ValidationOutcome) -> f32 {
    let checked = record.pathology.len()
        + record.procedures.len()
        + record.complications.len()
        + record.medications.len()
        + record.symptoms.len()
        + record.anticoagulation.len()
        + record.follow_up.len()
        + validation.flags.len() // unsupported literals already pruned still count against the denominator
        + usize::from(record.discharge_destination.is_some());

    if checked == 0 {
        return 1.0;
    }

    let penalty: f32 = validation.flags.iter().map(|f| flag_penalty(f.severity)).sum();
    (1.0 - penalty / checked as f32).clamp(0.0, 1.0)
}

/// 1.0 minus a penalty for each cross-field logical warning/error.
fn consistency(validation: &ValidationOutcome) -> f32 {
    let penalty = 0.3 * validation.errors.len() as f32 + 0.1 * validation.warnings.len() as f32;
    (1.0 - penalty).clamp(0.0, 1.0)
}

/// Borrows the source-quality assessor's sentence-structure factor as a
/// proxy for narrative quality, since both describe prose well-formedness.
fn narrative_quality(record: &ExtractedRecord) -> f32 {
    record
        .metadata
        .source_quality
        .as_ref()
        .and_then(|report| report.factors.get("sentence_structure"))
        .map(|v| *v as f32)
        .unwrap_or(0.5)
}

/// Fraction of dated categories (procedures/complications/medications) whose
/// canonical entities actually carry a resolved date rather than `null`.
fn specificity(record: &ExtractedRecord) -> f32 {
    let entities: Vec<bool> = record
        .procedures
        .iter()
        .chain(record.complications.iter())
        .chain(record.medications.iter())
        .map(|e| e.date.is_some())
        .collect();

    if entities.is_empty() {
        return 0.5;
    }

    entities.iter().filter(|d| **d).count() as f32 / entities.len() as f32
}

/// Fraction of the reference-date anchor set that resolved.
fn timeliness(record: &ExtractedRecord) -> f32 {
    let anchors = [
        record.reference_dates.ictus.is_some(),
        record.reference_dates.admission.is_some(),
        record.reference_dates.discharge.is_some(),
        record.reference_dates.first_procedure.is_some(),
    ];
    anchors.iter().filter(|a| **a).count() as f32 / anchors.len() as f32
}

pub fn compute_quality_report(record: &ExtractedRecord, validation: &ValidationOutcome) -> QualityReport {
    let completeness = completeness(record);
    let accuracy = accuracy(record, validation);
    let consistency = consistency(validation);
    let narrative_quality = narrative_quality(record);
    let specificity = specificity(record);
    let timeliness = timeliness(record);

    let overall = completeness * quality_weights::COMPLETENESS
        + accuracy * quality_weights::ACCURACY
        + consistency * quality_weights::CONSISTENCY
        + narrative_quality * quality_weights::NARRATIVE
        + specificity * quality_weights::SPECIFICITY
        + timeliness * quality_weights::TIMELINESS;

    let mut issues: HashMap<String, Vec<String>> = HashMap::new();
    if !validation.errors.is_empty() {
        issues.insert(
            "consistency".to_string(),
            validation.errors.iter().map(|e| e.message.clone()).collect(),
        );
    }
    if !validation.flags.is_empty() {
        issues.insert(
            "accuracy".to_string(),
            validation.flags.iter().map(|f| format!("{}.{}: {}", f.category, f.field, f.reason)).collect(),
        );
    }

    QualityReport {
        completeness,
        accuracy,
        consistency,
        narrative_quality,
        specificity,
        timeliness,
        overall,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::{CanonicalEntity, ReferenceDates};
    use crate::model::record::{Demographics, ExtractionMetadata, FunctionalScores, LateRecoveryFlag, PerformanceMetrics};
    use std::collections::HashMap as StdHashMap;

    fn record_with_one_procedure() -> ExtractedRecord {
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
            confidence: StdHashMap::new(),
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
    fn overall_score_is_within_unit_interval() {
        let record = record_with_one_procedure();
        let validation = crate::validator::validate(record.clone(), "Patient underwent craniotomy.").unwrap();
        let report = compute_quality_report(&record, &validation);
        assert!(report.overall >= 0.0 && report.overall <= 1.0);
    }

    #[test]
    fn logical_errors_reduce_consistency() {
        let record = record_with_one_procedure();
        let mut validation = crate::validator::validate(record.clone(), "Patient underwent craniotomy.").unwrap();
        validation.errors.push(crate::validator::ValidationErrorEntry { message: "test error".to_string() });
        let report = compute_quality_report(&record, &validation);
        assert!(report.consistency < 1.0);
    }
}
