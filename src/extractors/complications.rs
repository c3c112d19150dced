use std::sync::LazyLock;

use regex::Regex;

use crate::extractors::common::{dedup_and_link, is_negated, scan_mentions};
use crate::model::entity::{CanonicalEntity, EntityMention, ReferenceDates};
use crate::model::enums::{ComplicationSeverity, PathologyType};
use crate::ontology::profile_for;

const SHARED_COMPLICATION_PATTERNS: &[&str] = &[
    r"(?i)\binfection\b",
    r"(?i)\bhemorrhage\b",
    r"(?i)\bseizure\b",
    r"(?i)deep\s+vein\s+thrombosis",
    r"(?i)pulmonary\s+embol(?:ism|us)",
];

/// Curated severity keyword map (§4.6 complications): base severity per
/// keyword, further adjusted by adjacent modifiers below.
const SEVERITY_KEYWORDS: &[(&str, ComplicationSeverity)] = &[
    ("rebleed", ComplicationSeverity::Critical),
    ("hematoma expansion", ComplicationSeverity::Critical),
    ("pulmonary embol", ComplicationSeverity::Critical),
    ("herniation", ComplicationSeverity::Critical),
    ("vasospasm", ComplicationSeverity::High),
    ("delayed cerebral ischemia", ComplicationSeverity::High),
    ("hemorrhage", ComplicationSeverity::High),
    ("deep vein thrombosis", ComplicationSeverity::Moderate),
    ("infection", ComplicationSeverity::Moderate),
    ("seizure", ComplicationSeverity::Moderate),
    ("hyponatremia", ComplicationSeverity::Moderate),
    ("wound dehiscence", ComplicationSeverity::Low),
    ("re-accumulation", ComplicationSeverity::Low),
];

static RE_SEVERE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bsevere\b").unwrap());
static RE_MILD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(mild|transient)\b").unwrap());

fn base_severity(name: &str) -> ComplicationSeverity {
    let lower = name.to_lowercase();
    SEVERITY_KEYWORDS
        .iter()
        .find(|(kw, _)| lower.contains(kw))
        .map(|(_, sev)| *sev)
        .unwrap_or(ComplicationSeverity::Moderate)
}

/// Apply adjacent-modifier adjustment (§4.6): "severe" upgrades one level;
/// "mild"/"transient" downgrades one level but never downgrades `critical`.
fn adjust_severity(base: ComplicationSeverity, context: &str) -> ComplicationSeverity {
    if RE_SEVERE.is_match(context) {
        return match base {
            ComplicationSeverity::Low => ComplicationSeverity::Moderate,
            ComplicationSeverity::Moderate => ComplicationSeverity::High,
            ComplicationSeverity::High | ComplicationSeverity::Critical => ComplicationSeverity::Critical,
        };
    }
    if RE_MILD.is_match(context) {
        return match base {
            ComplicationSeverity::Critical => ComplicationSeverity::Critical,
            ComplicationSeverity::High => ComplicationSeverity::Moderate,
            ComplicationSeverity::Moderate => ComplicationSeverity::Low,
            ComplicationSeverity::Low => ComplicationSeverity::Low,
        };
    }
    base
}

fn local_context<'a>(text: &'a str, position: usize, len: usize) -> &'a str {
    let start = position.saturating_sub(20);
    let start = (start..=position).find(|&i| text.is_char_boundary(i)).unwrap_or(position);
    let stop = (position + len + 20).min(text.len());
    let stop = (position..=stop).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(position + len);
    &text[start..stop]
}

fn compile(patterns: impl Iterator<Item = &'static &'static str>) -> Vec<Regex> {
    patterns.filter_map(|p| Regex::new(p).ok()).collect()
}

/// Extract complication mentions, dropping negated ones and attaching a
/// severity grade to each canonical (§4.6 complications).
pub fn extract_complications(
    text: &str,
    pathology_types: &[PathologyType],
    reference_dates: &ReferenceDates,
) -> (Vec<CanonicalEntity>, f32) {
    let mut patterns = compile(SHARED_COMPLICATION_PATTERNS.iter());
    for pathology_type in pathology_types {
        patterns.extend(compile(profile_for(*pathology_type).complication_patterns.iter()));
    }

    let all_mentions = scan_mentions(text, &patterns, reference_dates);
    let mentions: Vec<EntityMention> = all_mentions
        .into_iter()
        .filter(|m| !is_negated(text, m.position))
        .collect();

    if mentions.is_empty() {
        return (Vec::new(), 0.0);
    }

    let confidence = mentions.iter().map(|m| m.confidence).fold(0.0_f32, f32::max);
    let mut canonicals = dedup_and_link(mentions, true);

    for canonical in canonicals.iter_mut() {
        let position = text.to_lowercase().find(&canonical.name.to_lowercase()).unwrap_or(0);
        let context = local_context(text, position, canonical.name.len());
        canonical.severity = Some(adjust_severity(base_severity(&canonical.name), context));
    }

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
    fn negated_complication_dropped() {
        let text = "No evidence of rebleeding. Course complicated by vasospasm on POD#3.";
        let rd = ReferenceDates { admission: chrono::NaiveDate::from_ymd_opt(2025, 10, 1), ..Default::default() };
        let (complications, _conf) = extract_complications(text, &[PathologyType::Sah], &rd);
        assert!(complications.iter().any(|c| c.name.to_lowercase().contains("vasospasm")));
        assert!(!complications.iter().any(|c| c.name.to_lowercase().contains("rebleed")));
    }

    #[test]
    fn severity_upgraded_by_severe_modifier() {
        let text = "Patient developed severe wound dehiscence requiring reoperation.";
        let rd = ReferenceDates::default();
        let (complications, _conf) = extract_complications(text, &[PathologyType::Spine], &rd);
        let c = complications.iter().find(|c| c.name.to_lowercase().contains("dehiscence")).unwrap();
        assert_eq!(c.severity, Some(ComplicationSeverity::Moderate));
    }

    #[test]
    fn severity_never_downgrades_critical() {
        let text = "Mild rebleeding was noted on imaging.";
        let rd = ReferenceDates::default();
        let (complications, _conf) = extract_complications(text, &[PathologyType::Sah], &rd);
        let c = complications.iter().find(|c| c.name.to_lowercase().contains("rebleed")).unwrap();
        assert_eq!(c.severity, Some(ComplicationSeverity::Critical));
    }
}
