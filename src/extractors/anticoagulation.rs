use std::sync::LazyLock;

use regex::Regex;

use crate::config::confidence_levels;
use crate::model::entity::ReferenceDates;
use crate::model::enums::AnticoagulationStatus;
use crate::model::record::AnticoagulationEntry;
use crate::temporal::associate_date_with_entity;

const ANTICOAGULANTS: &[&str] = &[
    "warfarin", "coumadin", "apixaban", "eliquis", "rivaroxaban", "xarelto", "dabigatran",
    "pradaxa", "heparin", "enoxaparin", "lovenox", "clopidogrel", "plavix", "aspirin",
];

static RE_HELD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(held|holding)\b").unwrap());
static RE_REVERSED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(reversed|reversal)\b").unwrap());
static RE_DISCONTINUED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(discontinued|stopped|d/c'?e?d?)\b").unwrap());
static RE_INDICATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfor\s+([A-Za-z][A-Za-z ]{2,40})").unwrap());

fn left_window(text: &str, offset: usize, max_len: usize) -> &str {
    let start = offset.saturating_sub(max_len);
    let start = (start..=offset).find(|&i| text.is_char_boundary(i)).unwrap_or(offset);
    &text[start..offset.min(text.len())]
}

fn right_window(text: &str, end: usize, max_len: usize) -> &str {
    let end = end.min(text.len());
    let stop = (end + max_len).min(text.len());
    let stop = (end..=stop).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(end);
    &text[end..stop]
}

fn status_from_context(left: &str) -> AnticoagulationStatus {
    if RE_REVERSED.is_match(left) {
        AnticoagulationStatus::Reversed
    } else if RE_HELD.is_match(left) {
        AnticoagulationStatus::Held
    } else if RE_DISCONTINUED.is_match(left) {
        AnticoagulationStatus::Discontinued
    } else {
        AnticoagulationStatus::On
    }
}

/// Extract anticoagulation mentions with their state and last dose/event
/// date (§4.6 `[ADD]`, SPEC_FULL.md §4). Feeds the validator's
/// anticoagulation-vs-hemorrhagic-pathology cross-field check (§4.8).
pub fn extract_anticoagulation(text: &str, reference_dates: &ReferenceDates) -> (Vec<AnticoagulationEntry>, f32) {
    let lower = text.to_lowercase();
    let mut entries = Vec::new();

    for drug in ANTICOAGULANTS {
        let Some(pos) = lower.find(drug) else { continue };
        let left_50 = left_window(text, pos, 50);
        let right_40 = right_window(text, pos + drug.len(), 40);

        let status = status_from_context(left_50);
        let indication = RE_INDICATION.captures(right_40).map(|c| c[1].trim().to_string());
        let (last_dose_date, _source) = associate_date_with_entity(text, pos, drug.len(), reference_dates);

        entries.push(AnticoagulationEntry {
            drug_name: drug.to_string(),
            status,
            indication,
            last_dose_date,
            confidence: confidence_levels::HIGH,
        });
    }

    let confidence = if entries.is_empty() { 0.0 } else { confidence_levels::HIGH };
    (entries, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_status_is_default() {
        let (entries, _conf) = extract_anticoagulation("Patient on warfarin for atrial fibrillation.", &ReferenceDates::default());
        let e = entries.iter().find(|e| e.drug_name == "warfarin").unwrap();
        assert_eq!(e.status, AnticoagulationStatus::On);
        assert!(e.indication.as_deref().unwrap_or("").contains("atrial fibrillation"));
    }

    #[test]
    fn held_status_detected() {
        let (entries, _conf) = extract_anticoagulation("Apixaban held given hemorrhage on admission.", &ReferenceDates::default());
        let e = entries.iter().find(|e| e.drug_name == "apixaban").unwrap();
        assert_eq!(e.status, AnticoagulationStatus::Held);
    }

    #[test]
    fn reversed_status_detected() {
        let (entries, _conf) = extract_anticoagulation("Warfarin was reversed with vitamin K and FFP.", &ReferenceDates::default());
        let e = entries.iter().find(|e| e.drug_name == "warfarin").unwrap();
        assert_eq!(e.status, AnticoagulationStatus::Reversed);
    }
}
