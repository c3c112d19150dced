use regex::Regex;

use crate::extractors::common::{dedup_and_link, scan_mentions};
use crate::model::entity::{CanonicalEntity, ReferenceDates};
use crate::model::enums::PathologyType;
use crate::ontology::profile_for;

/// Symptoms common enough to cross pathology boundaries, supplementing each
/// profile's own `symptomPatterns` (§4.6 step 1).
const SHARED_SYMPTOM_PATTERNS: &[&str] = &[
    r"(?i)\bheadache\b",
    r"(?i)\bnausea\b",
    r"(?i)\bvomiting\b",
    r"(?i)\bweakness\b",
    r"(?i)\bnumbness\b",
    r"(?i)\bdizziness\b",
    r"(?i)\bconfusion\b",
];

fn compile(patterns: impl Iterator<Item = &'static &'static str>) -> Vec<Regex> {
    patterns.filter_map(|p| Regex::new(p).ok()).collect()
}

/// Extract presenting/ongoing symptom mentions via the shared five-step
/// pipeline (§4.6). Symptoms are not negation-filtered in the base spec —
/// that refinement is reserved for complications, whose presence or absence
/// materially changes the clinical picture.
pub fn extract_symptoms(
    text: &str,
    pathology_types: &[PathologyType],
    reference_dates: &ReferenceDates,
) -> (Vec<CanonicalEntity>, f32) {
    let mut patterns = compile(SHARED_SYMPTOM_PATTERNS.iter());
    for pathology_type in pathology_types {
        patterns.extend(compile(profile_for(*pathology_type).symptom_patterns.iter()));
    }

    let mentions = scan_mentions(text, &patterns, reference_dates);
    if mentions.is_empty() {
        return (Vec::new(), 0.0);
    }

    let confidence = mentions.iter().map(|m| m.confidence).fold(0.0_f32, f32::max);
    let mut canonicals = dedup_and_link(mentions, false);
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
    fn extracts_shared_and_pathology_specific_symptoms() {
        let text = "Patient presented with thunderclap headache and nuchal rigidity, no vomiting.";
        let rd = ReferenceDates::default();
        let (symptoms, _conf) = extract_symptoms(text, &[PathologyType::Sah], &rd);
        assert!(symptoms.iter().any(|s| s.name.to_lowercase().contains("headache")));
        assert!(symptoms.iter().any(|s| s.name.to_lowercase().contains("nuchal rigidity")));
    }

    #[test]
    fn no_mentions_when_absent() {
        let (symptoms, _conf) = extract_symptoms("Patient feels great.", &[PathologyType::Sah], &ReferenceDates::default());
        assert!(symptoms.is_empty());
    }
}
