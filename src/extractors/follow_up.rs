use std::sync::LazyLock;

use regex::Regex;

use crate::config::confidence_levels;
use crate::model::entity::ReferenceDates;
use crate::model::record::FollowUpItem;
use crate::temporal::associate_date_with_entity;

static RE_FOLLOW_UP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:follow[\s-]?up|f/u)\s*(?:with|in)?\s*:?\s*([^\n]{3,160})").unwrap()
});

/// Extract discharge follow-up instructions (§4.6). Each item's date, when
/// present, is resolved via the standard ±80-character association window.
pub fn extract_follow_up(text: &str, reference_dates: &ReferenceDates) -> (Vec<FollowUpItem>, f32) {
    let mut items = Vec::new();

    for caps in RE_FOLLOW_UP_LINE.captures_iter(text) {
        let full = caps.get(0).unwrap();
        let instructions = caps[1].trim().trim_end_matches('.').to_string();
        let (date, _source) = associate_date_with_entity(text, full.start(), full.len(), reference_dates);
        items.push(FollowUpItem { instructions, date, confidence: confidence_levels::MEDIUM });
    }

    let confidence = if items.is_empty() { 0.0 } else { confidence_levels::MEDIUM };
    (items, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_follow_up_instruction() {
        let text = "Follow-up with Neurosurgery in 2 weeks for staple removal.";
        let (items, _conf) = extract_follow_up(text, &ReferenceDates::default());
        assert_eq!(items.len(), 1);
        assert!(items[0].instructions.to_lowercase().contains("neurosurgery"));
    }

    #[test]
    fn no_follow_up_section_yields_empty() {
        let (items, conf) = extract_follow_up("Patient discharged in stable condition.", &ReferenceDates::default());
        assert!(items.is_empty());
        assert_eq!(conf, 0.0);
    }
}
