use std::sync::LazyLock;

use regex::Regex;

use crate::config::confidence_levels;
use crate::model::entity::ReferenceDates;
use crate::model::enums::PathologyType;
use crate::model::record::OncologyMarker;
use crate::temporal::associate_date_with_entity;

static RE_MARKER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(Ki-?67|MGMT|IDH1?|EGFR|PSA|CEA|CA[\s-]?125|AFP)\b").unwrap());

/// Value clause within a short right window of a marker name: a numeric
/// reading with optional unit, or a qualitative call (§4.6 `[ADD]`,
/// SPEC_FULL.md §4).
static RE_MARKER_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)([0-9]+(?:\.[0-9]+)?\s*%)|\b(methylated|unmethylated|mutant|wild[\s-]?type|positive|negative)\b",
    )
    .unwrap()
});

fn right_window(text: &str, end: usize, max_len: usize) -> &str {
    let end = end.min(text.len());
    let stop = (end + max_len).min(text.len());
    let stop = (end..=stop).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(end);
    &text[end..stop]
}

/// Extract oncology tumor-marker mentions (§4.6 `[ADD]`), scoped to
/// oncologic pathologies (TUMORS, METASTASES) per the ontology's own
/// classification.
pub fn extract_oncology_markers(
    text: &str,
    pathology_types: &[PathologyType],
    reference_dates: &ReferenceDates,
) -> (Vec<OncologyMarker>, f32) {
    if !pathology_types.iter().any(|p| p.is_oncologic()) {
        return (Vec::new(), 0.0);
    }

    let mut markers = Vec::new();
    for name_match in RE_MARKER_NAME.find_iter(text) {
        let right = right_window(text, name_match.end(), 30);
        let raw_value = RE_MARKER_VALUE
            .captures(right)
            .map(|c| c.get(1).or_else(|| c.get(2)).unwrap().as_str().trim().to_string());
        let unit = raw_value.as_ref().filter(|v| v.ends_with('%')).map(|_| "%".to_string());
        let (date, _source) =
            associate_date_with_entity(text, name_match.start(), name_match.len(), reference_dates);

        markers.push(OncologyMarker {
            marker_name: name_match.as_str().to_string(),
            value: raw_value,
            unit,
            date,
            confidence: confidence_levels::MEDIUM,
        });
    }

    let confidence = if markers.is_empty() { 0.0 } else { confidence_levels::MEDIUM };
    (markers, confidence)
}
