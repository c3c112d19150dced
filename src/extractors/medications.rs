use std::sync::LazyLock;

use regex::Regex;

use crate::extractors::common::{dedup_and_link, scan_mentions};
use crate::lexical::calculate_combined_similarity;
use crate::model::entity::{CanonicalEntity, ReferenceDates};
use crate::model::enums::{MedicationStatus, PathologyType};

const SHARED_MEDICATION_PATTERNS: &[&str] = &[
    r"(?i)nimodipine(?:\s+\d+\s*mg[^.\n]*)?",
    r"(?i)levetiracetam(?:\s+\d+\s*mg[^.\n]*)?",
    r"(?i)dexamethasone(?:\s+\d+\s*mg[^.\n]*)?",
    r"(?i)(?:coumadin|warfarin|apixaban|rivaroxaban|heparin)(?:\s+\d+\s*mg[^.\n]*)?",
];

static RE_DISCHARGE_MEDS_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)discharge\s+medications\s*:?\s*\n(.+?)(?:\n\s*\n|\z)").unwrap()
});
static RE_DISCHARGE_MEDS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:[-*]|\d+[.)])?\s*([A-Za-z][A-Za-z0-9 /-]{2,60})").unwrap());

static RE_STARTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(started|initiated|begun)\b").unwrap());
static RE_DISCONTINUED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(discontinued|stopped|d/c'?e?d?)\b").unwrap());
static RE_CHANGED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(changed|switched|adjusted|titrated)\b").unwrap());
static RE_CONTINUED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(continued|maintained)\b").unwrap());

/// Status from the left 50-char verb context (§4.6 medications, §4.10).
/// Defaults to `active` when no status verb is present.
fn status_from_context(left: &str) -> MedicationStatus {
    if RE_DISCONTINUED.is_match(left) {
        MedicationStatus::Discontinued
    } else if RE_STARTED.is_match(left) {
        MedicationStatus::Started
    } else if RE_CHANGED.is_match(left) {
        MedicationStatus::Changed
    } else if RE_CONTINUED.is_match(left) {
        MedicationStatus::Continued
    } else {
        MedicationStatus::Active
    }
}

fn left_window(text: &str, offset: usize, max_len: usize) -> &str {
    let start = offset.saturating_sub(max_len);
    let start = (start..=offset).find(|&i| text.is_char_boundary(i)).unwrap_or(offset);
    &text[start..offset.min(text.len())]
}

fn compile(patterns: impl Iterator<Item = &'static &'static str>) -> Vec<Regex> {
    patterns.filter_map(|p| Regex::new(p).ok()).collect()
}

/// Parse a "DISCHARGE MEDICATIONS" section into bare drug-name lines, when
/// present (§4.6 medications). These take precedence over the general
/// extraction and are deduped against it by name.
fn discharge_section_names(text: &str) -> Vec<String> {
    let Some(section) = RE_DISCHARGE_MEDS_SECTION.captures(text) else {
        return Vec::new();
    };
    let block = section.get(1).unwrap().as_str();
    RE_DISCHARGE_MEDS_LINE
        .captures_iter(block)
        .map(|c| c[1].trim().to_string())
        .collect()
}

/// Extract medication mentions with a status state machine (§4.6, §4.10):
/// `active` initially, transitioning on verb context. Reinitiation after
/// `discontinued` is captured naturally by the shared deduplicator's
/// date-history union rather than overwriting the prior date.
pub fn extract_medications(
    text: &str,
    _pathology_types: &[PathologyType],
    reference_dates: &ReferenceDates,
) -> (Vec<CanonicalEntity>, f32) {
    let patterns = compile(SHARED_MEDICATION_PATTERNS.iter());
    let mentions = scan_mentions(text, &patterns, reference_dates);

    let discharge_names = discharge_section_names(text);
    if mentions.is_empty() && discharge_names.is_empty() {
        return (Vec::new(), 0.0);
    }

    // Status is a per-mention property derived from context, paired up by
    // index since `EntityMention` carries no status field of its own.
    let statuses: Vec<MedicationStatus> = mentions
        .iter()
        .map(|m| status_from_context(left_window(text, m.position, 50)))
        .collect();

    let confidence = mentions.iter().map(|m| m.confidence).fold(0.0_f32, f32::max).max(0.6);
    let mut canonicals = dedup_and_link(mentions.clone(), true);

    // Attach the most specific (non-Active) status observed among the
    // mentions that merged into each canonical.
    for canonical in canonicals.iter_mut() {
        let best_status = mentions
            .iter()
            .zip(statuses.iter())
            .filter(|(m, _)| calculate_combined_similarity(&m.name, &canonical.name) >= 0.75)
            .map(|(_, s)| *s)
            .max_by_key(|s| *s != MedicationStatus::Active)
            .unwrap_or(MedicationStatus::Active);
        canonical.status = Some(best_status);
    }

    // Drugs named in the discharge-medications section but not already
    // captured by the general extraction are added as `active`; overlapping
    // names are left alone since the general extraction already carries
    // their temporal detail.
    for name in discharge_names {
        let already_present = canonicals
            .iter()
            .any(|c| calculate_combined_similarity(&c.name, &name) >= 0.75);
        if !already_present {
            let mut entity = CanonicalEntity::new(name);
            entity.confidence = 0.6;
            entity.status = Some(MedicationStatus::Active);
            canonicals.push(entity);
        }
    }

    canonicals.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    (canonicals, confidence)
}
