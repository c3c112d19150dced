//! No-extrapolation check (§4.8, §8 invariant 1): every emitted string
//! literal must trace back to the source text through one of three paths —
//! a direct case-insensitive substring match, an abbreviation-expanded
//! match, or combined-similarity above threshold against some
//! same-length window of the source. A literal that matches none of the
//! three produces a flag at a severity fixed by its category; only the
//! four categories the pattern store is allowed to prune from (symptoms,
//! complications, procedures, medications) actually lose the entry.

use crate::config::NO_EXTRAPOLATION_SIMILARITY;
use crate::lexical::{calculate_combined_similarity, normalize_text};
use crate::model::entity::CanonicalEntity;
use crate::model::enums::FlagSeverity;
use crate::model::record::ExtractedRecord;

use super::abbreviations::expand_abbreviations;
use super::ValidationFlag;

fn literal_supported(literal: &str, source_normalized: &str, expanded_source: &str) -> bool {
    let norm_literal = normalize_text(literal);
    if norm_literal.is_empty() {
        return true;
    }
    if source_normalized.contains(&norm_literal) {
        return true;
    }

    // Abbreviation-expanded path, tried both directions: the literal may
    // have spelled out what the source abbreviated, or vice versa.
    let expanded_literal = expand_abbreviations(&norm_literal);
    if expanded_literal != norm_literal && source_normalized.contains(&expanded_literal) {
        return true;
    }
    if expanded_source.contains(&norm_literal) {
        return true;
    }

    let window_len = norm_literal.split_whitespace().count().max(1);
    let source_tokens: Vec<&str> = source_normalized.split_whitespace().collect();
    if source_tokens.len() >= window_len {
        for start in 0..=(source_tokens.len() - window_len) {
            let window = source_tokens[start..start + window_len].join(" ");
            if calculate_combined_similarity(&norm_literal, &window) > NO_EXTRAPOLATION_SIMILARITY {
                return true;
            }
        }
    }

    false
}

fn flag(category: &str, field: &str, value: &str, severity: FlagSeverity) -> ValidationFlag {
    ValidationFlag {
        category: category.to_string(),
        field: field.to_string(),
        value: value.to_string(),
        severity,
        reason: "literal does not trace to source text".to_string(),
    }
}

/// Check and, where the category permits, prune a list of canonical
/// entities whose `name` is the literal under test.
#[allow(clippy::too_many_arguments)]
fn check_canonical_category(
    entities: &mut Vec<CanonicalEntity>,
    category: &str,
    severity: FlagSeverity,
    prunable: bool,
    source_normalized: &str,
    expanded_source: &str,
    flags: &mut Vec<ValidationFlag>,
) {
    let drained: Vec<CanonicalEntity> = entities.drain(..).collect();
    for entity in drained {
        if literal_supported(&entity.name, source_normalized, expanded_source) {
            entities.push(entity);
        } else {
            flags.push(flag(category, "name", &entity.name, severity));
            if !prunable {
                entities.push(entity);
            }
        }
    }
}

pub fn check_no_extrapolation(record: &mut ExtractedRecord, source_text: &str) -> Vec<ValidationFlag> {
    let source_normalized = normalize_text(source_text);
    let expanded_source = expand_abbreviations(&source_normalized);
    let mut flags = Vec::new();

    // diagnosis: critical, not prunable (pathology is never in the pruning list).
    for finding in &record.pathology {
        if !literal_supported(&finding.name, &source_normalized, &expanded_source) {
            flags.push(flag("pathology", "name", &finding.name, FlagSeverity::Critical));
        }
    }

    check_canonical_category(
        &mut record.procedures,
        "procedures",
        FlagSeverity::Critical,
        true,
        &source_normalized,
        &expanded_source,
        &mut flags,
    );
    check_canonical_category(
        &mut record.complications,
        "complications",
        FlagSeverity::Critical,
        true,
        &source_normalized,
        &expanded_source,
        &mut flags,
    );
    check_canonical_category(
        &mut record.medications,
        "medications",
        FlagSeverity::Critical,
        true,
        &source_normalized,
        &expanded_source,
        &mut flags,
    );
    check_canonical_category(
        &mut record.symptoms,
        "symptoms",
        FlagSeverity::Medium,
        true,
        &source_normalized,
        &expanded_source,
        &mut flags,
    );

    // anticoagulant: critical, not prunable.
    for entry in &record.anticoagulation {
        if !literal_supported(&entry.drug_name, &source_normalized, &expanded_source) {
            flags.push(flag("anticoagulation", "drug_name", &entry.drug_name, FlagSeverity::Critical));
        }
    }

    // discharge destination: high, not prunable.
    if let Some(destination) = &record.discharge_destination {
        if !literal_supported(&destination.destination, &source_normalized, &expanded_source) {
            flags.push(flag("discharge_destination", "destination", &destination.destination, FlagSeverity::High));
        }
    }

    // follow-up instructions: low, not prunable (follow_up is not in the pruning list).
    for item in &record.follow_up {
        if !literal_supported(&item.instructions, &source_normalized, &expanded_source) {
            flags.push(flag("follow_up", "instructions", &item.instructions, FlagSeverity::Low));
        }
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::ReferenceDates;
    use crate::model::record::{Demographics, ExtractionMetadata, FunctionalScores, LateRecoveryFlag, PerformanceMetrics};
    use std::collections::HashMap;

    fn empty_record() -> ExtractedRecord {
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
    fn supported_literal_is_not_flagged_and_not_pruned() {
        let mut record = empty_record();
        record.procedures.push(CanonicalEntity::new("craniotomy".to_string()));
        let flags = check_no_extrapolation(&mut record, "Patient underwent craniotomy for evacuation.");
        assert!(flags.is_empty());
        assert_eq!(record.procedures.len(), 1);
    }

    #[test]
    fn unsupported_prunable_literal_is_flagged_and_removed() {
        let mut record = empty_record();
        record.procedures.push(CanonicalEntity::new("transsphenoidal hypophysectomy".to_string()));
        let flags = check_no_extrapolation(&mut record, "Patient was observed overnight with no intervention.");
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].severity, FlagSeverity::Critical);
        assert!(record.procedures.is_empty());
    }

    #[test]
    fn unsupported_non_prunable_literal_is_flagged_but_kept() {
        let mut record = empty_record();
        record.follow_up.push(crate::model::record::FollowUpItem {
            instructions: "return to clinic in six weeks".to_string(),
            date: None,
            confidence: 0.5,
        });
        let flags = check_no_extrapolation(&mut record, "Patient discharged home in stable condition.");
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].severity, FlagSeverity::Low);
        assert_eq!(record.follow_up.len(), 1);
    }

    #[test]
    fn abbreviation_expanded_match_is_supported() {
        let mut record = empty_record();
        record.procedures.push(CanonicalEntity::new("status post craniotomy".to_string()));
        let flags = check_no_extrapolation(&mut record, "Patient s/p craniotomy for tumor resection.");
        assert!(flags.is_empty());
    }
}
