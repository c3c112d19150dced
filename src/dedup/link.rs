use crate::config::REFERENCE_LINK_THRESHOLD;
use crate::lexical::calculate_combined_similarity;
use crate::model::entity::CanonicalEntity;

/// Score a candidate reference-to-event link (§4.4): a shared explicit date
/// plus moderate name similarity is treated as near-certain (0.95); strong
/// name similarity with differing dates is discounted; otherwise the raw
/// name similarity stands.
fn link_score(reference: &CanonicalEntity, event: &CanonicalEntity) -> f64 {
    let name_sim = calculate_combined_similarity(&reference.name, &event.name);
    let dates_match = reference.date.is_some() && reference.date == event.date;

    if dates_match && name_sim > 0.6 {
        0.95
    } else if name_sim > 0.8 {
        name_sim * 0.9
    } else {
        name_sim
    }
}

/// Link reference-context canonical entities (e.g. "s/p craniotomy", "h/o
/// EVD placement") back to the new-event canonical entity they most likely
/// refer to (§4.4). Each matched event gains the reference's id in its own
/// `linked_references` (§3: "references whose canonical target this is") —
/// the reference itself is not mutated and is expected to be dropped by the
/// caller once linked; unmatched references are left for the caller to
/// return separately (§4.4 "Unmatched references are returned as unlinked").
/// Returns the number linked.
pub fn link_references_to_events(events: &mut [CanonicalEntity], references: &[CanonicalEntity]) -> usize {
    let mut linked = 0;

    for reference in references {
        let best = events
            .iter_mut()
            .map(|event| {
                let score = link_score(reference, event);
                (event, score)
            })
            .filter(|(_, score)| *score >= REFERENCE_LINK_THRESHOLD)
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap());

        if let Some((event, _)) = best {
            event.linked_references.push(reference.id);
            linked += 1;
        }
    }

    linked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(name: &str, date: Option<NaiveDate>) -> CanonicalEntity {
        let mut e = CanonicalEntity::new(name.to_string());
        e.date = date;
        e
    }

    #[test]
    fn links_when_dates_match_and_names_related() {
        let d = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let mut events = vec![event("craniotomy with aneurysm clipping", Some(d))];
        let refs = vec![event("craniotomy aneurysm clipping", Some(d))];
        let ref_id = refs[0].id;
        let n = link_references_to_events(&mut events, &refs);
        assert_eq!(n, 1);
        assert_eq!(events[0].linked_references, vec![ref_id]);
    }

    #[test]
    fn no_link_below_threshold() {
        let mut events = vec![event("craniotomy for tumor resection", None)];
        let refs = vec![event("unrelated symptom entirely", None)];
        let n = link_references_to_events(&mut events, &refs);
        assert_eq!(n, 0);
        assert!(events[0].linked_references.is_empty());
    }

    #[test]
    fn multiple_references_accumulate_on_one_event() {
        let d = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let mut events = vec![event("endovascular coiling", Some(d))];
        let refs = vec![event("s/p endovascular coiling", Some(d)), event("repeat endovascular coiling", Some(d))];
        let n = link_references_to_events(&mut events, &refs);
        assert_eq!(n, 2);
        assert_eq!(events[0].linked_references.len(), 2);
    }
}
