use std::sync::LazyLock;

use regex::Regex;

use crate::config::confidence_levels;
use crate::lexical::parse_flexible_date;
use crate::model::record::ImagingFinding;
use crate::temporal::associate_date_with_entity;

/// Modality header followed by a finding clause on the same line, e.g.
/// "CT head: no acute intracranial hemorrhage" or "MRI brain showed stable
/// post-surgical changes." (§4.6 imaging).
static RE_STUDY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*((?:CT|CTA|MRI|MRA|X-?ray|angiogram)\s+[A-Za-z/ ]{0,20})\s*(?:showed|shows|demonstrated|demonstrates|revealed|reveals|:)\s*([^\n.]{3,160})").unwrap()
});

/// Extract imaging study findings (§4.6). Each finding's date is resolved
/// via the same ±80-character association window used by other extractors.
pub fn extract_imaging(text: &str, reference_dates: &crate::model::entity::ReferenceDates) -> (Vec<ImagingFinding>, f32) {
    let mut findings = Vec::new();

    for caps in RE_STUDY.captures_iter(text) {
        let full = caps.get(0).unwrap();
        let modality = caps[1].trim().to_string();
        let finding = caps[2].trim().to_string();
        let (date, _source) = associate_date_with_entity(text, full.start(), full.len(), reference_dates);
        // An explicit date token embedded directly in the matched clause
        // takes precedence over the windowed association.
        let date = date.or_else(|| parse_flexible_date(&finding).ok().flatten());

        findings.push(ImagingFinding {
            modality,
            finding,
            date,
            confidence: confidence_levels::MEDIUM,
        });
    }

    let confidence = if findings.is_empty() { 0.0 } else { confidence_levels::MEDIUM };
    (findings, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::ReferenceDates;

    #[test]
    fn extracts_modality_and_finding() {
        let text = "CT head: no acute intracranial hemorrhage.\nMRI brain showed stable post-surgical changes.";
        let (findings, _conf) = extract_imaging(text, &ReferenceDates::default());
        assert_eq!(findings.len(), 2);
        assert!(findings[0].modality.to_uppercase().contains("CT"));
        assert!(findings[0].finding.to_lowercase().contains("hemorrhage"));
    }

    #[test]
    fn no_imaging_section_yields_empty() {
        let (findings, conf) = extract_imaging("Patient recovering well.", &ReferenceDates::default());
        assert!(findings.is_empty());
        assert_eq!(conf, 0.0);
    }
}
