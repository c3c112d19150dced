use std::sync::LazyLock;

use regex::Regex;

use crate::lexical::calculate_days_between;
use crate::model::entity::ReferenceDates;
use crate::model::enums::ComplicationSeverity;
use crate::model::record::{LateRecoveryFlag, LateRecoveryIndicator};

/// (keyword, label, severity) — curated cues for a prolonged or complicated
/// recovery course (§4.6 late-recovery detector).
const INDICATORS: &[(&str, &str, ComplicationSeverity)] = &[
    ("tracheostomy", "tracheostomy placed", ComplicationSeverity::High),
    ("prolonged icu", "prolonged ICU course", ComplicationSeverity::High),
    ("failure to progress", "failure to progress", ComplicationSeverity::Moderate),
    ("failure to thrive", "failure to thrive", ComplicationSeverity::Moderate),
    ("peg tube", "PEG tube placed", ComplicationSeverity::Moderate),
    ("percutaneous endoscopic gastrostomy", "PEG tube placed", ComplicationSeverity::Moderate),
    ("ventilator dependent", "ventilator-dependent", ComplicationSeverity::Critical),
];

/// LOS threshold (days) above which a prolonged stay alone is flagged even
/// absent any curated-keyword indicator (§4.6).
const PROLONGED_LOS_DAYS: i64 = 14;

static RE_INSTITUTIONAL_DESTINATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)discharged?\s+to\s+(?:a\s+)?(?:skilled\s+nursing|long[\s-]?term\s+acute\s+care|\bltac\b|\bsnf\b|subacute)").unwrap()
});

/// Detect signals of a prolonged or complicated recovery course (§4.6):
/// LOS computed from admission/discharge, plus scans for ICU, tracheostomy,
/// failure-to-progress, and institutional-discharge tokens.
pub fn detect_late_recovery(text: &str, reference_dates: &ReferenceDates) -> LateRecoveryFlag {
    let los_days = match (reference_dates.admission, reference_dates.discharge) {
        (Some(a), Some(d)) => Some(calculate_days_between(a, d)),
        _ => None,
    };

    let lower = text.to_lowercase();
    let mut indicators: Vec<LateRecoveryIndicator> = INDICATORS
        .iter()
        .filter(|(kw, _, _)| lower.contains(kw))
        .map(|(_, label, severity)| LateRecoveryIndicator { label: label.to_string(), severity: *severity })
        .collect();

    if RE_INSTITUTIONAL_DESTINATION.is_match(text) {
        indicators.push(LateRecoveryIndicator {
            label: "institutional discharge destination".to_string(),
            severity: ComplicationSeverity::Moderate,
        });
    }

    let prolonged_los = los_days.is_some_and(|d| d >= PROLONGED_LOS_DAYS);
    if prolonged_los {
        indicators.push(LateRecoveryIndicator {
            label: format!("length of stay {} days", los_days.unwrap()),
            severity: ComplicationSeverity::Moderate,
        });
    }

    LateRecoveryFlag { flagged: !indicators.is_empty(), los_days, indicators }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn flags_tracheostomy_and_computes_los() {
        let rd = ReferenceDates {
            admission: NaiveDate::from_ymd_opt(2025, 10, 1),
            discharge: NaiveDate::from_ymd_opt(2025, 10, 5),
            ..Default::default()
        };
        let flag = detect_late_recovery("Course complicated by respiratory failure; tracheostomy was placed.", &rd);
        assert!(flag.flagged);
        assert_eq!(flag.los_days, Some(4));
        assert!(flag.indicators.iter().any(|i| i.label.contains("tracheostomy")));
    }

    #[test]
    fn prolonged_los_alone_flags_without_keywords() {
        let rd = ReferenceDates {
            admission: NaiveDate::from_ymd_opt(2025, 9, 1),
            discharge: NaiveDate::from_ymd_opt(2025, 9, 20),
            ..Default::default()
        };
        let flag = detect_late_recovery("Uncomplicated course, tolerated diet, ambulating independently.", &rd);
        assert!(flag.flagged);
        assert_eq!(flag.los_days, Some(19));
    }

    #[test]
    fn short_uncomplicated_stay_not_flagged() {
        let rd = ReferenceDates {
            admission: NaiveDate::from_ymd_opt(2025, 9, 1),
            discharge: NaiveDate::from_ymd_opt(2025, 9, 5),
            ..Default::default()
        };
        let flag = detect_late_recovery("Uncomplicated course, discharged home.", &rd);
        assert!(!flag.flagged);
    }
}
