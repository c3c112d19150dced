use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;

use crate::config::confidence_levels;
use crate::lexical::parse_flexible_date;
use crate::model::record::Demographics;

static RE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)patient\s+name\s*:\s*([A-Za-z ,.'-]{2,60})").unwrap());
static RE_MRN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:MRN|ID)\s*#?\s*:?\s*(\d{6,10})\b").unwrap());
static RE_DOB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdob\s*:?\s*([0-9A-Za-z/ ,-]{6,24})").unwrap());
// "55-year-old", "55 yo", "55y/o"
static RE_AGE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,3})[\s-]?(?:year[\s-]old|yo\b|y/o)").unwrap());
// "55M" / "55F" immediately after a comma, at the end of a line — the
// demographics-line shorthand common at the top of a neurosurgical note.
static RE_AGE_SEX_SHORTHAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im),\s*(\d{1,3})\s*([MF])\s*$").unwrap());
static RE_SEX_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(male|female|man|woman)\b").unwrap());
static RE_ATTENDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)attending\s+(?:physician|surgeon)?\s*:?\s*(?:dr\.?\s*)?([A-Za-z ,.'-]{2,60})").unwrap()
});

const NAME_NOISE_TOKENS: &[&str] = &["Patient", "Unknown", "Name", "Not", "Available", "None"];

/// A 2-4 word name with every word capitalized, no digits, and no bare
/// placeholder token (§4.6).
fn is_plausible_name(candidate: &str) -> bool {
    let words: Vec<&str> = candidate.split_whitespace().collect();
    if !(2..=4).contains(&words.len()) {
        return false;
    }
    if candidate.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    words.iter().all(|w| {
        let first = w.chars().next().unwrap_or(' ');
        first.is_uppercase() && !NAME_NOISE_TOKENS.contains(w)
    })
}

/// Reject MRNs that are equally plausible as a date lexeme (e.g. `01152024`
/// reads as MMDDYYYY) (§4.6).
fn is_plausible_mrn(candidate: &str) -> bool {
    if !(6..=10).contains(&candidate.len()) {
        return false;
    }
    if candidate.len() == 8 {
        let month: u32 = candidate[0..2].parse().unwrap_or(0);
        let day: u32 = candidate[2..4].parse().unwrap_or(0);
        if (1..=12).contains(&month) && (1..=31).contains(&day) {
            return false;
        }
    }
    true
}

fn age_from_dob(dob: NaiveDate) -> Option<u8> {
    let today = Local::now().date_naive();
    if dob >= today {
        return None;
    }
    u8::try_from(today.years_since(dob)?).ok()
}

/// Extract patient-level demographics (§4.6). Each field is validated
/// independently; confidence is the min over all populated fields' per-field
/// confidences — a record is only as trustworthy as its weakest signal.
pub fn extract_demographics(text: &str) -> Demographics {
    let mut confidences: Vec<f32> = Vec::new();

    let name = RE_NAME
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|n| is_plausible_name(n));
    if name.is_some() {
        confidences.push(confidence_levels::HIGH);
    }

    let mrn = RE_MRN
        .captures(text)
        .map(|c| c[1].to_string())
        .filter(|m| is_plausible_mrn(m));
    if mrn.is_some() {
        confidences.push(confidence_levels::HIGH);
    }

    let dob = RE_DOB
        .captures(text)
        .and_then(|c| parse_flexible_date(c[1].trim()).ok().flatten())
        .filter(|d| age_from_dob(*d).is_some());
    if dob.is_some() {
        confidences.push(confidence_levels::MEDIUM);
    }

    let shorthand = RE_AGE_SEX_SHORTHAND.captures(text);
    let mut age = RE_AGE_WORD
        .captures(text)
        .and_then(|c| c[1].parse::<u8>().ok())
        .filter(|a| *a <= 120)
        .or_else(|| shorthand.as_ref().and_then(|c| c[1].parse::<u8>().ok()).filter(|a| *a <= 120));
    // An explicit DOB is more authoritative than a textual age mention.
    if let Some(d) = dob {
        if let Some(derived) = age_from_dob(d) {
            age = Some(derived);
        }
    }
    if age.is_some() {
        confidences.push(confidence_levels::HIGH);
    }

    let mut sex = shorthand.as_ref().map(|c| c[2].to_string());
    if sex.is_none() {
        sex = RE_SEX_WORD.captures(text).map(|c| {
            let raw = c[1].to_lowercase();
            match raw.as_str() {
                "man" => "male".to_string(),
                "woman" => "female".to_string(),
                other => other.to_string(),
            }
        });
    }
    if sex.is_some() {
        confidences.push(confidence_levels::MEDIUM);
    }

    let attending_physician = RE_ATTENDING.captures(text).map(|c| c[1].trim().to_string());
    if attending_physician.is_some() {
        confidences.push(confidence_levels::MEDIUM);
    }

    let confidence = confidences.iter().cloned().fold(f32::INFINITY, f32::min);
    let confidence = if confidence.is_finite() { confidence } else { 0.0 };

    Demographics {
        name,
        mrn,
        dob,
        age,
        sex,
        attending_physician,
        confidence,
    }
}
