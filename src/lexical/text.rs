/// Lowercase, collapse whitespace, and strip punctuation — keeping internal
/// dashes and slashes (e.g. "s/p", "POD#3", "MCA-M1") intact (§4.1).
pub fn normalize_text(s: &str) -> String {
    let lowered = s.to_lowercase();
    let mut cleaned = String::with_capacity(lowered.len());

    for c in lowered.chars() {
        if c.is_alphanumeric() || c == '-' || c == '/' || c.is_whitespace() {
            cleaned.push(c);
        } else {
            cleaned.push(' ');
        }
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split normalized text into a token set for similarity comparisons.
pub fn tokenize(s: &str) -> Vec<String> {
    normalize_text(s)
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}
