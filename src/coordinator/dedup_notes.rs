//! Cross-note deduplication (§4.7 step 3, §5): when the input is a list of
//! more than one note, drop the shorter of any pair at or above a
//! cosine-style similarity threshold over token multisets. Offloaded to a
//! worker task with a hard timeout; on timeout or task failure, the
//! coordinator proceeds with the original list unchanged (§5).

use std::collections::HashMap;

use crate::config::{CROSS_NOTE_DEDUP_THRESHOLD, CROSS_NOTE_DEDUP_TIMEOUT};
use crate::lexical::tokenize;

fn token_multiset(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

/// Cosine similarity over token-count vectors — distinct from the
/// token-set Jaccard used for entity-name similarity: two notes that
/// repeat the same clinical terms many times should read as more similar
/// than two notes that merely share a vocabulary once each.
fn multiset_cosine_similarity(a: &str, b: &str) -> f64 {
    let ca = token_multiset(a);
    let cb = token_multiset(b);

    if ca.is_empty() && cb.is_empty() {
        return 1.0;
    }

    let dot: f64 = ca.iter().map(|(token, &count)| count as f64 * *cb.get(token).unwrap_or(&0) as f64).sum();
    let norm_a: f64 = ca.values().map(|&c| (c as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = cb.values().map(|&c| (c as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Pairwise comparison preserving input order: a later note that duplicates
/// an earlier, shorter one replaces it in place rather than being appended,
/// so chronology (input order) is preserved (§4.7 step 3).
fn dedup_sync(notes: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();

    'outer: for note in notes {
        for existing in kept.iter_mut() {
            if multiset_cosine_similarity(existing, &note) >= CROSS_NOTE_DEDUP_THRESHOLD {
                if note.len() > existing.len() {
                    *existing = note;
                }
                continue 'outer;
            }
        }
        kept.push(note);
    }

    kept
}

/// Offload cross-note dedup to a worker task under a five-minute hard
/// timeout (§5). On timeout or a panicked worker, falls back to the
/// original note list so correctness degrades to "no dedup performed"
/// rather than data loss.
pub async fn deduplicate_notes(notes: Vec<String>) -> Vec<String> {
    let original = notes.clone();
    let handle = tokio::spawn(async move { dedup_sync(notes) });

    match tokio::time::timeout(CROSS_NOTE_DEDUP_TIMEOUT, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(error)) => {
            tracing::warn!(%error, "cross-note dedup worker panicked, proceeding with original notes");
            original
        }
        Err(_) => {
            tracing::warn!("cross-note dedup timed out, proceeding with original notes");
            original
        }
    }
}
