use regex::Regex;

use crate::config::DEDUP_SIMILARITY_THRESHOLD;
use crate::dedup::{cluster_mentions, link_references_to_events};
use crate::model::entity::{CanonicalEntity, EntityMention, ReferenceDates};
use crate::temporal::{associate_date_with_entity, classify_temporal_context};

/// Scan `text` for every match of any pattern in `patterns`, turning each
/// match into an [`EntityMention`] with its temporal context and associated
/// date already resolved (§4.3, §4.6 shared extractor pipeline step 1-2).
pub fn scan_mentions(text: &str, patterns: &[Regex], reference_dates: &ReferenceDates) -> Vec<EntityMention> {
    let mut mentions = Vec::new();

    for pattern in patterns {
        for m in pattern.find_iter(text) {
            let temporal_context = classify_temporal_context(text, m.start(), m.len());
            let (date, date_source) = if let Some(pod) = temporal_context.pod {
                (
                    crate::temporal::resolve_relative_date(pod, reference_dates),
                    crate::model::enums::DateSource::PodResolved,
                )
            } else {
                associate_date_with_entity(text, m.start(), m.len(), reference_dates)
            };

            mentions.push(EntityMention {
                name: m.as_str().to_string(),
                position: m.start(),
                date,
                date_source,
                temporal_context,
                confidence: temporal_context.confidence,
                source_excerpt: m.as_str().to_string(),
            });
        }
    }

    mentions
}

/// Run the shared extractor pipeline (steps 3-5 of §4.6): partition mentions
/// into primary events vs. reference-context mentions, single-linkage
/// cluster each group independently, then link references back to the
/// events they describe. A linked reference is folded into its event's
/// `linked_references` and does not survive as its own canonical (§3, §4.4);
/// only event canonicals and any *unlinked* references are returned.
pub fn dedup_and_link(mentions: Vec<EntityMention>, merge_same_date: bool) -> Vec<CanonicalEntity> {
    let (references, primary): (Vec<_>, Vec<_>) =
        mentions.into_iter().partition(|m| m.temporal_context.is_reference);

    let mut events = cluster_mentions(&primary, merge_same_date);
    let reference_entities = cluster_mentions(&references, merge_same_date);
    link_references_to_events(&mut events, &reference_entities);

    let linked_ids: std::collections::HashSet<_> =
        events.iter().flat_map(|e| e.linked_references.iter().copied()).collect();
    let unlinked = reference_entities.into_iter().filter(|r| !linked_ids.contains(&r.id));

    let mut combined = events;
    combined.extend(unlinked);
    combined
}

/// Negation cues checked immediately before a mention; a hit suppresses it
/// from the extractor's output entirely (§4.6 complications).
pub fn is_negated(text: &str, mention_offset: usize) -> bool {
    const WINDOW: usize = 25;
    let start = mention_offset.saturating_sub(WINDOW);
    let start = (start..=mention_offset).find(|&i| text.is_char_boundary(i)).unwrap_or(mention_offset);
    let left = &text[start..mention_offset.min(text.len())];
    let lower = left.to_lowercase();
    ["no evidence of", "without", "denies", "negative for", "ruled out", "no signs of", "no "]
        .iter()
        .any(|cue| lower.contains(cue))
}

/// Shared clustering threshold used outside the cluster-mentions call path
/// (e.g. single-field extractors comparing a new candidate to ones already
/// collected for the same note).
pub const SIMILARITY_THRESHOLD: f64 = DEDUP_SIMILARITY_THRESHOLD;
