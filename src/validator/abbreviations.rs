//! Clinical abbreviation expansion for the validator's no-extrapolation
//! check (§4.8): a second matching path alongside direct substring and
//! sliding-window similarity, so an extractor that resolved "s/p" to
//! "status post" (or vice versa) is not penalized for paraphrasing the
//! source rather than quoting it.

use std::collections::HashMap;
use std::sync::LazyLock;

static ABBREVIATIONS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("s/p", "status post"),
        ("h/o", "history of"),
        ("w/", "with"),
        ("w/o", "without"),
        ("c/o", "complains of"),
        ("pt", "patient"),
        ("dx", "diagnosis"),
        ("tx", "treatment"),
        ("sx", "symptoms"),
        ("hx", "history"),
        ("evd", "external ventricular drain"),
        ("ich", "intracerebral hemorrhage"),
        ("sah", "subarachnoid hemorrhage"),
        ("tbi", "traumatic brain injury"),
        ("sdh", "subdural hematoma"),
        ("csdh", "chronic subdural hematoma"),
        ("icp", "intracranial pressure"),
        ("gcs", "glasgow coma scale"),
        ("pod", "postoperative day"),
        ("wnl", "within normal limits"),
        ("vp", "ventriculoperitoneal"),
        ("etoh", "alcohol"),
    ])
});

/// Expand every whole-token abbreviation in an already-normalized string.
/// Tokens with no entry pass through unchanged.
pub fn expand_abbreviations(normalized: &str) -> String {
    normalized
        .split_whitespace()
        .map(|token| *ABBREVIATIONS.get(token).unwrap_or(&token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_abbreviation() {
        assert_eq!(expand_abbreviations("s/p craniotomy"), "status post craniotomy");
    }

    #[test]
    fn leaves_unknown_tokens_untouched() {
        assert_eq!(expand_abbreviations("pterional craniotomy"), "pterional craniotomy");
    }

    #[test]
    fn expands_multiple_tokens_in_one_phrase() {
        assert_eq!(expand_abbreviations("h/o sah pod 5"), "history of subarachnoid hemorrhage postoperative day 5");
    }
}
