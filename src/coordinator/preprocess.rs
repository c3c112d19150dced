//! Pre-processing (§4.7 step 2): normalize institution-specific formatting
//! artifacts. Abbreviation expansion is deliberately NOT performed here —
//! the default is off because expansion interacts poorly with the
//! pathology-specific patterns that fire downstream (§4.7, §9).

use std::sync::LazyLock;

use regex::Regex;

static RE_PAGE_FOOTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*page\s+\d+\s+of\s+\d+\s*$").unwrap());
static RE_FAX_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*\*{0,3}\s*(?:confidential\s+)?fax\s+transmission.*$").unwrap());
static RE_BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Strip page-number footers and fax-transmission banners, normalize
/// line endings, and collapse runs of blank lines (§4.7 step 2). Does not
/// touch clinical content, so every later extractor still sees verbatim
/// source text for the no-extrapolation check.
pub fn normalize_institution_artifacts(note: &str) -> String {
    let unified = note.replace("\r\n", "\n").replace('\r', "\n");
    let without_footers = RE_PAGE_FOOTER.replace_all(&unified, "");
    let without_fax_headers = RE_FAX_HEADER.replace_all(&without_footers, "");
    let collapsed = RE_BLANK_RUN.replace_all(&without_fax_headers, "\n\n");

    collapsed
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_page_footer() {
        let note = "History of present illness.\nPage 1 of 3\nPatient is stable.";
        let cleaned = normalize_institution_artifacts(note);
        assert!(!cleaned.to_lowercase().contains("page 1 of 3"));
        assert!(cleaned.contains("History of present illness."));
    }

    #[test]
    fn collapses_blank_line_runs() {
        let note = "Line one.\n\n\n\n\nLine two.";
        let cleaned = normalize_institution_artifacts(note);
        assert!(!cleaned.contains("\n\n\n"));
    }

    #[test]
    fn preserves_clinical_abbreviations_unexpanded() {
        let note = "Patient s/p craniotomy, POD#3, EVD in place.";
        let cleaned = normalize_institution_artifacts(note);
        assert_eq!(cleaned, note);
    }
}
