//! Cross-field logical checks (§4.8): consistency rules over dates,
//! anticoagulation-versus-pathology, and functional-score ranges. These are
//! warnings/errors, distinct from the per-literal flags in
//! [`super::no_extrapolation`] — they reason about relationships between
//! already-extracted values rather than whether a single value traces to
//! the source text.

use crate::model::enums::AnticoagulationStatus;
use crate::model::record::ExtractedRecord;

use super::{ValidationErrorEntry, ValidationWarning};

fn score_out_of_range(record: &mut ExtractedRecord, errors: &mut Vec<ValidationErrorEntry>, invalid_fields: &mut Vec<String>) {
    let scores = &mut record.functional_scores;

    if let Some(kps) = scores.kps {
        if kps > 100 {
            errors.push(ValidationErrorEntry { message: format!("functional_scores.kps out of range: {kps}") });
            invalid_fields.push("functional_scores.kps".to_string());
            scores.kps = None;
        }
    }
    if let Some(ecog) = scores.ecog {
        if ecog > 5 {
            errors.push(ValidationErrorEntry { message: format!("functional_scores.ecog out of range: {ecog}") });
            invalid_fields.push("functional_scores.ecog".to_string());
            scores.ecog = None;
        }
    }
    if let Some(mrs) = scores.mrs {
        if mrs > 6 {
            errors.push(ValidationErrorEntry { message: format!("functional_scores.mrs out of range: {mrs}") });
            invalid_fields.push("functional_scores.mrs".to_string());
            scores.mrs = None;
        }
    }
    if let Some(hunt_hess) = scores.hunt_hess {
        if !(1..=5).contains(&hunt_hess) {
            errors.push(ValidationErrorEntry { message: format!("functional_scores.hunt_hess out of range: {hunt_hess}") });
            invalid_fields.push("functional_scores.hunt_hess".to_string());
            scores.hunt_hess = None;
        }
    }
    if let Some(fisher) = scores.fisher {
        if !(1..=4).contains(&fisher) {
            errors.push(ValidationErrorEntry { message: format!("functional_scores.fisher out of range: {fisher}") });
            invalid_fields.push("functional_scores.fisher".to_string());
            scores.fisher = None;
        }
    }
}

fn date_consistency(record: &mut ExtractedRecord, warnings: &mut Vec<ValidationWarning>, errors: &mut Vec<ValidationErrorEntry>, invalid_fields: &mut Vec<String>) {
    let dates = &mut record.reference_dates;

    if let (Some(ictus), Some(admission)) = (dates.ictus, dates.admission) {
        if ictus > admission {
            warnings.push(ValidationWarning {
                message: "unusual: ictus date is after admission date".to_string(),
            });
        }
    }

    if let (Some(surgery), Some(admission)) = (dates.first_procedure, dates.admission) {
        if surgery < admission {
            errors.push(ValidationErrorEntry { message: "surgery date precedes admission date".to_string() });
            invalid_fields.push("reference_dates.first_procedure".to_string());
            dates.first_procedure = None;
        }
    }

    if let (Some(discharge), Some(admission)) = (dates.discharge, dates.admission) {
        if discharge < admission {
            errors.push(ValidationErrorEntry { message: "discharge date precedes admission date".to_string() });
            invalid_fields.push("reference_dates.discharge".to_string());
        }
    }

    if let Some(admission) = dates.admission {
        let before_admission: Vec<_> = record.procedures.iter_mut().filter(|p| p.date.is_some_and(|d| d < admission)).collect();
        for procedure in before_admission {
            procedure.date = None;
        }
    }
}

fn anticoagulation_without_reversal(record: &ExtractedRecord, warnings: &mut Vec<ValidationWarning>) {
    let hemorrhagic_present = record.pathology.iter().any(|p| p.pathology_type.is_hemorrhagic());
    if !hemorrhagic_present {
        return;
    }

    let has_unreversed_active_anticoagulant = record
        .anticoagulation
        .iter()
        .any(|entry| matches!(entry.status, AnticoagulationStatus::On));
    let has_reversal = record.anticoagulation.iter().any(|entry| matches!(entry.status, AnticoagulationStatus::Reversed));

    if has_unreversed_active_anticoagulant && !has_reversal {
        warnings.push(ValidationWarning {
            message: "critical: patient on anticoagulation with hemorrhagic pathology and no documented reversal".to_string(),
        });
    }
}

pub fn run_logical_checks(
    record: &mut ExtractedRecord,
    warnings: &mut Vec<ValidationWarning>,
    errors: &mut Vec<ValidationErrorEntry>,
    invalid_fields: &mut Vec<String>,
) {
    date_consistency(record, warnings, errors, invalid_fields);
    anticoagulation_without_reversal(record, warnings);
    score_out_of_range(record, errors, invalid_fields);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::ReferenceDates;
    use crate::model::record::{AnticoagulationEntry, Demographics, ExtractionMetadata, FunctionalScores, LateRecoveryFlag, PathologyFinding, PerformanceMetrics};
    use crate::model::enums::PathologyType;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn base_record() -> ExtractedRecord {
        ExtractedRecord {
            demographics: Demographics::default(),
            reference_dates: ReferenceDates::default(),
            pathology: Vec::new(),
            symptoms: Vec::new(),
            procedures: Vec::new(),
            complications: Vec::new(),
            medications: Vec::new(),
            imaging: Vec::new(),
            functional_scores: FunctionalScores::default(),
            follow_up: Vec::new(),
            discharge_destination: None,
            anticoagulation: Vec::new(),
            oncology_markers: Vec::new(),
            late_recovery: LateRecoveryFlag::default(),
            confidence: HashMap::new(),
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
    fn surgery_before_admission_is_dropped_as_error() {
        let mut record = base_record();
        record.reference_dates.admission = NaiveDate::from_ymd_opt(2026, 1, 10);
        record.reference_dates.first_procedure = NaiveDate::from_ymd_opt(2026, 1, 5);
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        let mut invalid_fields = Vec::new();
        run_logical_checks(&mut record, &mut warnings, &mut errors, &mut invalid_fields);

        assert_eq!(errors.len(), 1);
        assert!(record.reference_dates.first_procedure.is_none());
    }

    #[test]
    fn ictus_after_admission_is_a_warning_only() {
        let mut record = base_record();
        record.reference_dates.admission = NaiveDate::from_ymd_opt(2026, 1, 10);
        record.reference_dates.ictus = NaiveDate::from_ymd_opt(2026, 1, 12);
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        let mut invalid_fields = Vec::new();
        run_logical_checks(&mut record, &mut warnings, &mut errors, &mut invalid_fields);

        assert_eq!(warnings.len(), 1);
        assert!(errors.is_empty());
    }

    #[test]
    fn anticoagulation_without_reversal_in_hemorrhagic_pathology_warns() {
        let mut record = base_record();
        record.pathology.push(PathologyFinding {
            pathology_type: PathologyType::Sah,
            name: "subarachnoid hemorrhage".to_string(),
            confidence: 0.8,
            grades: Vec::new(),
            location: None,
            subtype: None,
        });
        record.anticoagulation.push(AnticoagulationEntry {
            drug_name: "warfarin".to_string(),
            status: AnticoagulationStatus::On,
            indication: None,
            last_dose_date: None,
            confidence: 0.8,
        });
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        let mut invalid_fields = Vec::new();
        run_logical_checks(&mut record, &mut warnings, &mut errors, &mut invalid_fields);

        assert!(warnings.iter().any(|w| w.message.contains("anticoagulation")));
    }

    #[test]
    fn functional_score_out_of_range_is_nulled() {
        let mut record = base_record();
        record.functional_scores.mrs = Some(9);
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        let mut invalid_fields = Vec::new();
        run_logical_checks(&mut record, &mut warnings, &mut errors, &mut invalid_fields);

        assert_eq!(errors.len(), 1);
        assert!(record.functional_scores.mrs.is_none());
    }
}
