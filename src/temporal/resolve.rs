use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::lexical::parse_flexible_date;
use crate::model::entity::ReferenceDates;
use crate::model::enums::DateSource;

const ASSOCIATION_WINDOW: usize = 80;

/// Unanchored date-token finder: candidate substrings are handed to
/// `parse_flexible_date`, which is the sole authority on validity.
static RE_DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s+\d{4}",
    )
    .unwrap()
});

fn char_boundary_window(text: &str, center: usize, radius: usize) -> (usize, usize) {
    let start = center.saturating_sub(radius);
    let start = (start..=center).find(|&i| text.is_char_boundary(i)).unwrap_or(center);
    let stop = (center + radius).min(text.len());
    let stop = (center..=stop).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(center);
    (start, stop)
}

/// Find the nearest parseable date within ±80 chars of a mention and report
/// where it came from (§4.3): a date inside the window is EXPLICIT; none
/// found falls back to the note's admission date (INHERITED) or NOT_FOUND.
pub fn associate_date_with_entity(
    text: &str,
    mention_offset: usize,
    mention_len: usize,
    reference_dates: &ReferenceDates,
) -> (Option<NaiveDate>, DateSource) {
    let mention_offset = mention_offset.min(text.len());
    let mention_end = (mention_offset + mention_len).min(text.len());
    let (left_start, _) = char_boundary_window(text, mention_offset, ASSOCIATION_WINDOW);
    let (_, right_stop) = char_boundary_window(text, mention_end, ASSOCIATION_WINDOW);

    let left = &text[left_start..mention_offset];
    let right = &text[mention_end..right_stop];

    // Closest match on the left: the one ending nearest the mention start.
    let left_best = RE_DATE_TOKEN
        .find_iter(left)
        .filter_map(|m| parse_flexible_date(m.as_str()).ok().flatten().map(|d| (left.len() - m.end(), d)))
        .min_by_key(|(dist, _)| *dist);

    // Closest match on the right: the one starting nearest the mention end.
    let right_best = RE_DATE_TOKEN
        .find_iter(right)
        .filter_map(|m| parse_flexible_date(m.as_str()).ok().flatten().map(|d| (m.start(), d)))
        .min_by_key(|(dist, _)| *dist);

    let best = match (left_best, right_best) {
        (Some(l), Some(r)) => Some(if l.0 <= r.0 { l } else { r }),
        (Some(l), None) => Some(l),
        (None, Some(r)) => Some(r),
        (None, None) => None,
    };

    if let Some((_, date)) = best {
        return (Some(date), DateSource::Explicit);
    }

    if let Some(admission) = reference_dates.admission {
        return (Some(admission), DateSource::Inherited);
    }

    (None, DateSource::NotFound)
}

/// Resolve a POD (post-operative day) offset to a calendar date against the
/// note's reference anchors (§4.3): anchored on `firstProcedure`, falling
/// back to `admission` when no procedure date is known.
pub fn resolve_relative_date(pod: i64, reference_dates: &ReferenceDates) -> Option<NaiveDate> {
    reference_dates.resolve_pod(pod)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(ictus: &str) -> ReferenceDates {
        ReferenceDates {
            admission: Some(NaiveDate::parse_from_str(ictus, "%Y-%m-%d").unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn finds_explicit_date_in_left_window() {
        let text = "Coiling performed on 2025-10-10 without complication.";
        let mention_offset = text.find("Coiling").unwrap();
        let (date, source) = associate_date_with_entity(text, mention_offset, "Coiling".len(), &ReferenceDates::default());
        assert_eq!(date, Some(NaiveDate::from_ymd_opt(2025, 10, 10).unwrap()));
        assert!(matches!(source, DateSource::Explicit));
    }

    #[test]
    fn falls_back_to_admission_when_no_nearby_date() {
        let text = "Patient tolerated the craniotomy well with no complications noted anywhere nearby.";
        let mention_offset = text.find("craniotomy").unwrap();
        let rd = dates("2025-09-01");
        let (date, source) = associate_date_with_entity(text, mention_offset, "craniotomy".len(), &rd);
        assert_eq!(date, rd.admission);
        assert!(matches!(source, DateSource::Inherited));
    }

    #[test]
    fn not_found_when_no_date_and_no_admission() {
        let text = "Patient tolerated the craniotomy well with no complications noted anywhere nearby.";
        let mention_offset = text.find("craniotomy").unwrap();
        let (date, source) = associate_date_with_entity(text, mention_offset, "craniotomy".len(), &ReferenceDates::default());
        assert_eq!(date, None);
        assert!(matches!(source, DateSource::NotFound));
    }

    #[test]
    fn pod_resolves_against_first_procedure() {
        let rd = ReferenceDates {
            first_procedure: Some(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()),
            admission: Some(NaiveDate::from_ymd_opt(2025, 9, 28).unwrap()),
            ..Default::default()
        };
        let resolved = resolve_relative_date(5, &rd);
        assert_eq!(resolved, Some(NaiveDate::from_ymd_opt(2025, 10, 6).unwrap()));
    }

    #[test]
    fn pod_falls_back_to_admission_without_procedure_date() {
        let rd = ReferenceDates {
            admission: Some(NaiveDate::from_ymd_opt(2025, 9, 28).unwrap()),
            ..Default::default()
        };
        let resolved = resolve_relative_date(3, &rd);
        assert_eq!(resolved, Some(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()));
    }
}
