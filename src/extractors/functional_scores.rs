use std::sync::LazyLock;

use regex::Regex;

use crate::config::confidence_levels;
use crate::model::record::FunctionalScores;

static RE_KPS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bkps\s*#?\s*:?\s*(\d{1,3})\b").unwrap());
static RE_ECOG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\becog\s*#?\s*:?\s*(\d)\b").unwrap());
static RE_MRS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bmrs\s*#?\s*:?\s*(\d)\b").unwrap());
static RE_HUNT_HESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)hunt[\s-]?hess\s*(?:grade|score)?\s*#?\s*:?\s*(\d)\b").unwrap());
static RE_FISHER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:modified\s+)?fisher\s*(?:grade|score)?\s*#?\s*:?\s*(\d)\b").unwrap());

// PT/OT assist-level language mapped to an estimated KPS band (§4.6). Only
// consulted when no explicit KPS is present in the note.
const ASSIST_LEVEL_TO_KPS: &[(&str, u8)] = &[
    ("independent", 90),
    ("minimal assist", 80),
    ("moderate assist", 60),
    ("maximal assist", 40),
    ("total assist", 20),
    ("dependent", 20),
];

fn estimate_kps_from_pt_ot(text: &str) -> Option<u8> {
    let lower = text.to_lowercase();
    ASSIST_LEVEL_TO_KPS
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|(_, kps)| *kps)
}

fn round_to_step_10(raw: u32) -> u8 {
    let rounded = ((raw + 5) / 10) * 10;
    rounded.min(100) as u8
}

/// Extract explicit functional-status scale values, falling back to a
/// PT/OT-derived KPS estimate only when no explicit KPS is documented
/// (§4.6). Estimated values are capped at MEDIUM confidence.
pub fn extract_functional_scores(text: &str) -> FunctionalScores {
    let mut confidences: Vec<f32> = Vec::new();

    let mut kps = RE_KPS
        .captures(text)
        .and_then(|c| c[1].parse::<u32>().ok())
        .filter(|v| *v <= 100)
        .map(round_to_step_10);
    if kps.is_some() {
        confidences.push(confidence_levels::HIGH);
    } else if let Some(estimated) = estimate_kps_from_pt_ot(text) {
        kps = Some(estimated);
        confidences.push(confidence_levels::MEDIUM);
    }

    let ecog = RE_ECOG.captures(text).and_then(|c| c[1].parse::<u8>().ok()).filter(|v| *v <= 5);
    if ecog.is_some() {
        confidences.push(confidence_levels::HIGH);
    }

    let mrs = RE_MRS.captures(text).and_then(|c| c[1].parse::<u8>().ok()).filter(|v| *v <= 6);
    if mrs.is_some() {
        confidences.push(confidence_levels::HIGH);
    }

    let hunt_hess = RE_HUNT_HESS
        .captures(text)
        .and_then(|c| c[1].parse::<u8>().ok())
        .filter(|v| (1..=5).contains(v));
    if hunt_hess.is_some() {
        confidences.push(confidence_levels::HIGH);
    }

    let fisher = RE_FISHER
        .captures(text)
        .and_then(|c| c[1].parse::<u8>().ok())
        .filter(|v| (1..=4).contains(v));
    if fisher.is_some() {
        confidences.push(confidence_levels::HIGH);
    }

    let confidence = confidences.iter().cloned().fold(f32::INFINITY, f32::min);
    let confidence = if confidence.is_finite() { confidence } else { 0.0 };

    FunctionalScores { kps, ecog, mrs, hunt_hess, fisher, confidence }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_explicit_scores() {
        let text = "KPS: 70. ECOG 1. mRS 2. Hunt-Hess grade 2. Fisher grade 3.";
        let scores = extract_functional_scores(text);
        assert_eq!(scores.kps, Some(70));
        assert_eq!(scores.ecog, Some(1));
        assert_eq!(scores.mrs, Some(2));
        assert_eq!(scores.hunt_hess, Some(2));
        assert_eq!(scores.fisher, Some(3));
    }

    #[test]
    fn estimates_kps_from_pt_ot_language_when_no_explicit_score() {
        let text = "PT notes patient requires moderate assist with transfers.";
        let scores = extract_functional_scores(text);
        assert_eq!(scores.kps, Some(60));
        assert!(scores.confidence <= confidence_levels::MEDIUM);
    }

    #[test]
    fn explicit_score_takes_precedence_over_estimate() {
        let text = "KPS: 80. PT notes patient requires moderate assist.";
        let scores = extract_functional_scores(text);
        assert_eq!(scores.kps, Some(80));
    }

    #[test]
    fn out_of_range_values_rejected() {
        let text = "ECOG 9. mRS 10.";
        let scores = extract_functional_scores(text);
        assert!(scores.ecog.is_none());
        assert!(scores.mrs.is_none());
    }
}
