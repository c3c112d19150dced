//! Applying learned patterns (§4.7 step 8): learned regexes extend the
//! static per-category extractors rather than replacing them — matches they
//! surface are merged into the same canonical-entity sets the ordinary
//! extractors produced, via the same similarity-based merge rule used
//! throughout C4.

use regex::Regex;

use crate::config::DEDUP_SIMILARITY_THRESHOLD;
use crate::extractors::common::{dedup_and_link, scan_mentions};
use crate::lexical::calculate_combined_similarity;
use crate::model::entity::{CanonicalEntity, ReferenceDates};
use crate::model::pattern::LearnedPattern;

fn compiled_patterns_for<'a>(learned: &'a [LearnedPattern], field: &str) -> Vec<Regex> {
    learned
        .iter()
        .filter(|p| p.enabled && p.field == field)
        .filter_map(|p| match Regex::new(&p.pattern) {
            Ok(re) => Some(re),
            Err(error) => {
                tracing::warn!(pattern = %p.pattern, %error, "learned pattern failed to compile, skipped");
                None
            }
        })
        .collect()
}

fn merge_into(existing: &mut Vec<CanonicalEntity>, learned_canonicals: Vec<CanonicalEntity>) {
    for candidate in learned_canonicals {
        let existing_match = existing
            .iter_mut()
            .find(|e| calculate_combined_similarity(&e.name, &candidate.name) >= DEDUP_SIMILARITY_THRESHOLD);

        match existing_match {
            Some(matched) => {
                matched.date_history.extend(candidate.date_history);
                matched.date_history.sort();
                matched.date_history.dedup();
                matched.merged_from += candidate.merged_from;
                matched.linked_references.extend(candidate.linked_references);
            }
            None => existing.push(candidate),
        }
    }

    existing.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Run every enabled learned pattern against its declared field and merge
/// the resulting mentions into the matching category's canonical set.
pub fn apply_learned_patterns(
    text: &str,
    reference_dates: &ReferenceDates,
    learned: &[LearnedPattern],
    mut procedures: Vec<CanonicalEntity>,
    mut complications: Vec<CanonicalEntity>,
    mut medications: Vec<CanonicalEntity>,
) -> (Vec<CanonicalEntity>, Vec<CanonicalEntity>, Vec<CanonicalEntity>) {
    for (field, target) in [
        ("procedures", &mut procedures),
        ("complications", &mut complications),
        ("medications", &mut medications),
    ] {
        let patterns = compiled_patterns_for(learned, field);
        if patterns.is_empty() {
            continue;
        }
        let mentions = scan_mentions(text, &patterns, reference_dates);
        if mentions.is_empty() {
            continue;
        }
        let learned_canonicals = dedup_and_link(mentions, true);
        merge_into(target, learned_canonicals);
    }

    (procedures, complications, medications)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn pattern(field: &str, regex: &str) -> LearnedPattern {
        LearnedPattern {
            id: 1,
            field: field.to_string(),
            pathology: None,
            pattern: regex.to_string(),
            value_template: String::new(),
            enabled: true,
            confidence: 0.7,
            created_at: Utc::now(),
            last_updated: Utc::now(),
            version_history: Vec::new(),
        }
    }

    #[test]
    fn learned_pattern_adds_new_canonical_when_unmatched() {
        let text = "Patient underwent a novel endoscopic third ventriculostomy procedure.";
        let learned = vec![pattern("procedures", r"(?i)endoscopic third ventriculostomy")];
        let (procedures, _, _) =
            apply_learned_patterns(text, &ReferenceDates::default(), &learned, Vec::new(), Vec::new(), Vec::new());
        assert!(procedures.iter().any(|p| p.name.to_lowercase().contains("ventriculostomy")));
    }

    #[test]
    fn learned_pattern_merges_into_existing_similar_canonical() {
        let mut existing = CanonicalEntity::new("craniotomy".to_string());
        existing.id = Uuid::new_v4();
        existing.merged_from = 1;

        let text = "Patient underwent craniotomy for tumor resection.";
        let learned = vec![pattern("procedures", r"(?i)craniotomy")];
        let (procedures, _, _) = apply_learned_patterns(
            text,
            &ReferenceDates::default(),
            &learned,
            vec![existing],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(procedures.len(), 1);
        assert!(procedures[0].merged_from >= 2);
    }

    #[test]
    fn disabled_pattern_is_ignored() {
        let mut p = pattern("complications", r"(?i)exotic complication");
        p.enabled = false;
        let text = "Patient developed an exotic complication overnight.";
        let (_, complications, _) =
            apply_learned_patterns(text, &ReferenceDates::default(), &[p], Vec::new(), Vec::new(), Vec::new());
        assert!(complications.is_empty());
    }
}
