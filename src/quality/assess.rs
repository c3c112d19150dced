use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{source_quality_weights, NOTE_LENGTH_MAX, NOTE_LENGTH_MIN};
use crate::model::enums::SourceQualityGrade;
use crate::model::quality::SourceQualityReport;

static RE_SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*[A-Z][A-Za-z /]{2,30}:\s*$|^\s*[A-Z][A-Za-z /]{2,30}:\s").unwrap());
static RE_DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[/-]\d{1,2}[/-]\d{2,4}").unwrap()
});
static RE_SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+[A-Z]").unwrap());

const TERMINOLOGY: &[&str] = &[
    "craniotomy", "hemorrhage", "aneurysm", "hematoma", "hydrocephalus", "vasospasm",
    "gcs", "kps", "ecog", "mrs", "fisher", "hunt-hess", "hunt hess", "shunt", "ventriculostomy",
    "laminectomy", "discectomy", "meningioma", "glioblastoma", "metastasis", "metastases",
    "neurological", "neurologic", "postoperative", "preoperative", "intracranial", "csf",
    "anticoagulation", "coumadin", "warfarin", "heparin", "apixaban",
];

fn structure_score(text: &str) -> f64 {
    let headers = RE_SECTION_HEADER.find_iter(text).count();
    (headers as f64 / 4.0).min(1.0)
}

fn length_score(text: &str) -> f64 {
    let len = text.chars().count();
    if len >= NOTE_LENGTH_MIN && len <= NOTE_LENGTH_MAX {
        1.0
    } else if len < NOTE_LENGTH_MIN {
        (len as f64 / NOTE_LENGTH_MIN as f64).clamp(0.0, 1.0)
    } else {
        (NOTE_LENGTH_MAX as f64 / len as f64).clamp(0.0, 1.0)
    }
}

fn terminology_density_score(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let hits = TERMINOLOGY.iter().filter(|t| lower.contains(*t)).count();
    // A handful of hits in a note-length document is already dense; this
    // is a density signal, not a raw fraction of words.
    (hits as f64 / 8.0).min(1.0)
}

fn has_date_score(text: &str) -> f64 {
    if RE_DATE_TOKEN.is_match(text) {
        1.0
    } else {
        0.0
    }
}

fn sentence_structure_score(text: &str) -> f64 {
    let boundaries = RE_SENTENCE_END.find_iter(text).count();
    let words = text.split_whitespace().count();
    if words == 0 {
        return 0.0;
    }
    let sentences = (boundaries + 1) as f64;
    let avg_len = words as f64 / sentences;
    // Reasonable clinical sentences run roughly 6-35 words; degrade outside that band.
    if (6.0..=35.0).contains(&avg_len) {
        1.0
    } else if avg_len < 6.0 {
        (avg_len / 6.0).clamp(0.0, 1.0)
    } else {
        (35.0 / avg_len).clamp(0.0, 1.0)
    }
}

/// Assess note quality along five weighted factors (§4.5).
pub fn assess_source_quality(text: &str) -> SourceQualityReport {
    let mut factors = HashMap::new();
    let mut issues = Vec::new();

    let structure = structure_score(text);
    let length = length_score(text);
    let terminology = terminology_density_score(text);
    let has_date = has_date_score(text);
    let sentence_structure = sentence_structure_score(text);

    factors.insert("structure".to_string(), structure);
    factors.insert("length".to_string(), length);
    factors.insert("terminologyDensity".to_string(), terminology);
    factors.insert("hasDate".to_string(), has_date);
    factors.insert("sentenceStructure".to_string(), sentence_structure);

    if structure < 0.3 {
        issues.push("no recognizable section headers".to_string());
    }
    if length < 0.5 {
        issues.push("note length falls outside the expected range".to_string());
    }
    if terminology < 0.2 {
        issues.push("low density of recognized clinical terminology".to_string());
    }
    if has_date == 0.0 {
        issues.push("no parseable date found in the note".to_string());
    }

    let overall_score = structure * source_quality_weights::STRUCTURE
        + length * source_quality_weights::LENGTH
        + terminology * source_quality_weights::TERMINOLOGY_DENSITY
        + has_date * source_quality_weights::HAS_DATE
        + sentence_structure * source_quality_weights::SENTENCE_STRUCTURE;

    SourceQualityReport {
        grade: SourceQualityGrade::from_score(overall_score),
        overall_score,
        factors,
        issues,
    }
}
