use regex::Regex;

use crate::extractors::common::{dedup_and_link, scan_mentions};
use crate::model::entity::{CanonicalEntity, ReferenceDates};
use crate::model::enums::PathologyType;
use crate::ontology::profile_for;

/// Comprehensive keyword list shared across pathologies, supplementing each
/// profile's own `procedurePatterns` (§4.6 step 1).
const SHARED_PROCEDURE_PATTERNS: &[&str] = &[
    r"(?i)craniotom(?:y|ies)",
    r"(?i)craniectomy",
    r"(?i)\bevd\b",
    r"(?i)external\s+ventricular\s+drain",
    r"(?i)lumbar\s+puncture",
    r"(?i)biopsy",
];

fn compile(patterns: impl Iterator<Item = &'static &'static str>) -> Vec<Regex> {
    patterns.filter_map(|p| Regex::new(p).ok()).collect()
}

/// Extract procedure mentions and collapse them to canonical, date-sorted
/// events (§4.6 procedures). Runs the shared five-step pipeline: collect,
/// classify + date, partition reference vs. new-event, dedup, link.
pub fn extract_procedures(
    text: &str,
    pathology_types: &[PathologyType],
    reference_dates: &ReferenceDates,
) -> (Vec<CanonicalEntity>, f32) {
    let mut patterns = compile(SHARED_PROCEDURE_PATTERNS.iter());
    for pathology_type in pathology_types {
        patterns.extend(compile(profile_for(*pathology_type).procedure_patterns.iter()));
    }

    let mentions = scan_mentions(text, &patterns, reference_dates);
    if mentions.is_empty() {
        return (Vec::new(), 0.0);
    }

    let confidence = mentions.iter().map(|m| m.confidence).fold(0.0_f32, f32::max);
    let mut canonicals = dedup_and_link(mentions, true);
    canonicals.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    (canonicals, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_sah_procedure_extracted_with_resolved_date() {
        let text = "Admission Date: 10/10/2025. Procedure: pterional craniotomy for MCA aneurysm clipping on 10/11/2025.";
        let rd = crate::extractors::dates::extract_reference_dates(text);
        let (procedures, _conf) = extract_procedures(text, &[PathologyType::Sah], &rd);
        assert!(procedures.iter().any(|p| p.name.to_lowercase().contains("craniotomy")));
        let cranio = procedures.iter().find(|p| p.name.to_lowercase().contains("craniotomy")).unwrap();
        assert_eq!(cranio.date.map(|d| d.to_string()), Some("2025-10-11".to_string()));
    }

    #[test]
    fn no_mentions_when_absent() {
        let text = "Patient had surgery.";
        let rd = ReferenceDates::default();
        let (procedures, _conf) = extract_procedures(text, &[PathologyType::Sah], &rd);
        assert!(procedures.is_empty());
    }

    #[test]
    fn sorted_by_date_ascending_nulls_last() {
        let text = "Admission Date: 09/01/2025. Underwent craniotomy on 09/05/2025. Later, EVD placement was needed.";
        let rd = crate::extractors::dates::extract_reference_dates(text);
        let (procedures, _conf) = extract_procedures(text, &[PathologyType::Sah], &rd);
        for w in procedures.windows(2) {
            match (w[0].date, w[1].date) {
                (Some(a), Some(b)) => assert!(a <= b),
                (Some(_), None) => {}
                (None, Some(_)) => panic!("null date must sort after a concrete date"),
                (None, None) => {}
            }
        }
    }
}
