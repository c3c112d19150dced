use std::collections::HashSet;

use super::text::{normalize_text, tokenize};

/// Jaccard similarity over normalized token sets.
fn token_set_jaccard(a: &str, b: &str) -> f64 {
    let ta: HashSet<String> = tokenize(a).into_iter().collect();
    let tb: HashSet<String> = tokenize(b).into_iter().collect();

    if ta.is_empty() && tb.is_empty() {
        return 1.0;
    }

    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Classic Levenshtein edit distance.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());

    if n == 0 {
        return m;
    }
    if m == 0 {
        return n;
    }

    let mut prev: Vec<usize> = (0..=m).collect();
    let mut curr = vec![0usize; m + 1];

    for i in 1..=n {
        curr[0] = i;
        for j in 1..=m {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (curr[j - 1] + 1)
                .min(prev[j] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[m]
}

/// Edit-distance similarity normalized to [0,1] by the longer string's length.
fn edit_distance_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - (levenshtein(a, b) as f64 / max_len as f64)
}

/// Combined string+semantic similarity used for deduplication and reference
/// linking (§4.1): 0.4 × token-set Jaccard + 0.6 × normalized edit distance.
/// Identical strings return 1.0; disjoint tokens of equal length return 0.0.
pub fn calculate_combined_similarity(a: &str, b: &str) -> f64 {
    let na = normalize_text(a);
    let nb = normalize_text(b);

    if na == nb {
        return 1.0;
    }

    let jaccard = token_set_jaccard(&na, &nb);
    let edit = edit_distance_similarity(&na, &nb);

    (0.4 * jaccard + 0.6 * edit).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_are_one() {
        assert_eq!(calculate_combined_similarity("craniotomy", "Craniotomy"), 1.0);
    }

    #[test]
    fn disjoint_equal_length_tokens_are_zero() {
        // "abcd" vs "wxyz": no shared tokens, no shared characters at all
        // positions -> Jaccard 0, edit distance 4/4 -> similarity 1-1=0.
        let sim = calculate_combined_similarity("abcd", "wxyz");
        assert!(sim < 1e-9, "expected ~0.0, got {sim}");
    }

    #[test]
    fn near_miss_spelling_is_high() {
        let sim = calculate_combined_similarity("craniotomy", "craniotomy for MCA aneurysm");
        assert!(sim > 0.3, "expected meaningful overlap, got {sim}");
    }

    #[test]
    fn coiling_variants_are_similar() {
        let sim = calculate_combined_similarity("endovascular coiling", "coil embolization");
        assert!(sim > 0.1, "expected some similarity, got {sim}");
    }

    #[test]
    fn similarity_is_symmetric() {
        let a = calculate_combined_similarity("vasospasm", "cerebral vasospasm");
        let b = calculate_combined_similarity("cerebral vasospasm", "vasospasm");
        assert!((a - b).abs() < 1e-9);
    }
}
