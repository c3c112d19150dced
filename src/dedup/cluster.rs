use chrono::NaiveDate;

use crate::config::DEDUP_SIMILARITY_THRESHOLD;
use crate::lexical::calculate_combined_similarity;
use crate::model::entity::{CanonicalEntity, EntityMention};

/// Minimal union-find for single-linkage clustering.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Two mentions belong to the same event if their names are similar enough,
/// or — when `merge_same_date` is set — if they share an explicit date. A
/// shared date is strong independent evidence two textually-dissimilar
/// mentions ("craniotomy" / "re-exploration of the wound") describe one
/// operative event (§4.4).
fn should_link(a: &EntityMention, b: &EntityMention, merge_same_date: bool) -> bool {
    let name_sim = calculate_combined_similarity(&a.name, &b.name);
    if name_sim >= DEDUP_SIMILARITY_THRESHOLD {
        return true;
    }
    if merge_same_date {
        if let (Some(da), Some(db)) = (a.date, b.date) {
            return da == db;
        }
    }
    false
}

/// Single-linkage clustering of entity mentions into canonical events
/// (§4.4). `mentions` should already be restricted to non-reference
/// (NEW_EVENT / PROCEDURE_HEADER) mentions — reference mentions are
/// attached afterward via [`crate::dedup::link_references_to_events`].
pub fn cluster_mentions(mentions: &[EntityMention], merge_same_date: bool) -> Vec<CanonicalEntity> {
    if mentions.is_empty() {
        return Vec::new();
    }

    let mut dsu = DisjointSet::new(mentions.len());
    for i in 0..mentions.len() {
        for j in (i + 1)..mentions.len() {
            if should_link(&mentions[i], &mentions[j], merge_same_date) {
                dsu.union(i, j);
            }
        }
    }

    let mut groups: std::collections::HashMap<usize, Vec<usize>> = std::collections::HashMap::new();
    for i in 0..mentions.len() {
        let root = dsu.find(i);
        groups.entry(root).or_default().push(i);
    }

    let mut result: Vec<CanonicalEntity> = groups
        .into_values()
        .map(|indices| build_canonical(&indices, mentions))
        .collect();

    // Deterministic order: earliest-occurring member first.
    result.sort_by_key(|e| {
        mentions
            .iter()
            .position(|m| m.name == e.name)
            .unwrap_or(usize::MAX)
    });
    result
}

fn build_canonical(indices: &[usize], mentions: &[EntityMention]) -> CanonicalEntity {
    // Representative name: longest text; ties broken by earliest position.
    let rep = indices
        .iter()
        .map(|&i| &mentions[i])
        .max_by(|a, b| {
            a.name
                .len()
                .cmp(&b.name.len())
                .then_with(|| b.position.cmp(&a.position))
        })
        .expect("indices is non-empty");

    let mut date_history: Vec<NaiveDate> = indices.iter().filter_map(|&i| mentions[i].date).collect();
    date_history.sort();
    date_history.dedup();

    let confidence = indices
        .iter()
        .map(|&i| mentions[i].confidence)
        .fold(0.0_f32, f32::max);

    let mut entity = CanonicalEntity::new(rep.name.clone());
    entity.date = rep.date.or_else(|| date_history.first().copied());
    entity.date_history = date_history;
    entity.merged_from = indices.len();
    entity.confidence = confidence;
    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::enums::{DateSource, ReferenceType};

    fn mention(name: &str, position: usize, date: Option<NaiveDate>, confidence: f32) -> EntityMention {
        EntityMention {
            name: name.to_string(),
            position,
            date,
            date_source: if date.is_some() { DateSource::Explicit } else { DateSource::NotFound },
            temporal_context: crate::model::entity::TemporalContext {
                is_reference: false,
                pod: None,
                reference_type: ReferenceType::NewEvent,
                confidence: 0.85,
            },
            confidence,
            source_excerpt: name.to_string(),
        }
    }

    #[test]
    fn near_duplicate_names_cluster_together() {
        let mentions = vec![
            mention("craniotomy for aneurysm clipping", 10, None, 0.8),
            mention("craniotomy for aneurysm clippings", 200, None, 0.7),
            mention("external ventricular drain", 400, None, 0.9),
        ];
        let clusters = cluster_mentions(&mentions, false);
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn same_date_merges_when_enabled() {
        let d = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let mentions = vec![mention("craniotomy", 0, Some(d), 0.8), mention("surgery", 50, Some(d), 0.7)];
        let clusters = cluster_mentions(&mentions, true);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].merged_from, 2);

        let clusters_off = cluster_mentions(&mentions, false);
        assert_eq!(clusters_off.len(), 2);
    }

    #[test]
    fn canonical_takes_longest_name_and_max_confidence() {
        let mentions = vec![
            mention("external ventricular drain", 0, None, 0.5),
            mention("external ventricular drains", 5, None, 0.9),
        ];
        let clusters = cluster_mentions(&mentions, false);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].name, "external ventricular drains");
        assert!((clusters[0].confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn date_history_is_unique_and_sorted() {
        let d1 = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 10, 3).unwrap();
        let mentions = vec![
            mention("coiling procedure", 0, Some(d2), 0.8),
            mention("coiling procedure", 50, Some(d1), 0.8),
            mention("coiling procedure", 100, Some(d1), 0.8),
        ];
        let clusters = cluster_mentions(&mentions, false);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].date_history, vec![d1, d2]);
    }
}
