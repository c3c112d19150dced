use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::lexical::parse_flexible_date;
use crate::model::entity::ReferenceDates;

const DATE_TOKEN: &str = r"[A-Za-z0-9/,-]{6,24}";

static RE_ICTUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?:date\s+of\s+onset|ictus|symptom\s+onset)\s*:?\s*({DATE_TOKEN})")).unwrap()
});
static RE_ADMISSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?:date\s+of\s+admission|admission\s+date|admitted\s+on)\s*:?\s*({DATE_TOKEN})")).unwrap()
});
static RE_DISCHARGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?:date\s+of\s+discharge|discharge\s+date|discharged\s+on)\s*:?\s*({DATE_TOKEN})")).unwrap()
});
static RE_FIRST_PROCEDURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?:date\s+of\s+(?:surgery|procedure)|procedure\s+date)\s*:?\s*({DATE_TOKEN})")).unwrap()
});
static RE_SURGERY_ANY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?:surger(?:y|ies)|operat(?:ion|ive))\s+(?:on|date)\s*:?\s*({DATE_TOKEN})")).unwrap()
});
// Generic operative-verb cue: "underwent/performed X ... on <date>" or
// "<procedure noun> ... on <date>", independent of pathology (§4.6: "Surgery
// extractor collects ALL dates (global regex, deduped)").
static RE_PROCEDURE_ON_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:underwent|performed|completed|craniotomy|craniectomy|clipping|coil(?:ing)?|embolization|shunt|laminectomy|discectomy|resection|biopsy|ventriculostomy|evacuation)[^.\n]{{0,60}}?\bon\s+({DATE_TOKEN})"
    ))
    .unwrap()
});

fn first_date(re: &Regex, text: &str) -> Option<NaiveDate> {
    re.captures(text)
        .and_then(|c| parse_flexible_date(c[1].trim()).ok().flatten())
}

/// Build the note's reference-date anchor set (§4.3, §4.6). This extractor
/// runs before every other category extractor; its output is threaded
/// read-only into the rest of the pipeline.
pub fn extract_reference_dates(text: &str) -> ReferenceDates {
    let mut surgery_dates: Vec<NaiveDate> = RE_SURGERY_ANY
        .captures_iter(text)
        .chain(RE_PROCEDURE_ON_DATE.captures_iter(text))
        .filter_map(|c| parse_flexible_date(c[1].trim()).ok().flatten())
        .collect();

    let first_procedure = first_date(&RE_FIRST_PROCEDURE, text).or_else(|| {
        surgery_dates.sort();
        surgery_dates.first().copied()
    });

    if let Some(d) = first_procedure {
        if !surgery_dates.contains(&d) {
            surgery_dates.push(d);
        }
    }
    surgery_dates.sort();
    surgery_dates.dedup();

    ReferenceDates {
        ictus: first_date(&RE_ICTUS, text),
        admission: first_date(&RE_ADMISSION, text),
        discharge: first_date(&RE_DISCHARGE, text),
        first_procedure,
        surgery_dates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_anchors() {
        let text = "Date of onset: 09/28/2025. Date of admission: 09/29/2025. Date of surgery: 10/01/2025. Date of discharge: 10/10/2025.";
        let rd = extract_reference_dates(text);
        assert_eq!(rd.ictus, Some(NaiveDate::from_ymd_opt(2025, 9, 28).unwrap()));
        assert_eq!(rd.admission, Some(NaiveDate::from_ymd_opt(2025, 9, 29).unwrap()));
        assert_eq!(rd.first_procedure, Some(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()));
        assert_eq!(rd.discharge, Some(NaiveDate::from_ymd_opt(2025, 10, 10).unwrap()));
    }

    #[test]
    fn infers_surgery_date_from_procedure_verb_without_explicit_surgery_label() {
        let text = "Admission Date: October 10, 2025. Patient underwent pterional craniotomy for MCA aneurysm clipping on October 11, 2025. Discharge Date: October 18, 2025.";
        let rd = extract_reference_dates(text);
        assert_eq!(rd.first_procedure, Some(NaiveDate::from_ymd_opt(2025, 10, 11).unwrap()));
        assert!(rd.surgery_dates.contains(&NaiveDate::from_ymd_opt(2025, 10, 11).unwrap()));
    }

    #[test]
    fn missing_anchors_are_none() {
        let rd = extract_reference_dates("Patient doing well, no dates mentioned.");
        assert!(rd.admission.is_none());
        assert!(rd.surgery_dates.is_empty());
    }
}
