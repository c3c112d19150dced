use std::sync::LazyLock;

use regex::Regex;

use crate::config::confidence_levels;
use crate::model::record::{GradeFinding, PathologyFinding};
use crate::ontology::{detect_pathology, profile_for};

static RE_DIAGNOSIS_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*(?:primary\s+)?diagnos[ei]s\s*:\s*(.+)$").unwrap());
static RE_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(left|right|bilateral)\s+(frontal|temporal|parietal|occipital|cerebellar|thalamic|pontine|basal ganglia)\b",
    )
    .unwrap()
});

/// Per-pathology subtype detectors (§4.6 `[ADD]`): each returns
/// `(subtype, risk_level, prognosis)` when the note documents enough detail
/// to classify a subtype, not merely the pathology's presence.
fn detect_subtype(text: &str, pathology_type: crate::model::enums::PathologyType) -> Option<(String, String, String)> {
    use crate::model::enums::PathologyType;
    match pathology_type {
        PathologyType::Tumors => {
            static RE_GBM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)glioblastoma").unwrap());
            static RE_MEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)meningioma").unwrap());
            if RE_GBM.is_match(text) {
                Some(("glioblastoma".to_string(), "high".to_string(), "poor".to_string()))
            } else if RE_MEN.is_match(text) {
                Some(("meningioma".to_string(), "low".to_string(), "favorable".to_string()))
            } else {
                None
            }
        }
        PathologyType::TbiCsdh => {
            static RE_CHRONIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)chronic\s+subdural").unwrap());
            static RE_ACUTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)acute\s+subdural").unwrap());
            if RE_ACUTE.is_match(text) {
                Some(("acute subdural hematoma".to_string(), "high".to_string(), "guarded".to_string()))
            } else if RE_CHRONIC.is_match(text) {
                Some(("chronic subdural hematoma".to_string(), "low".to_string(), "favorable".to_string()))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Extract pathology findings with attached grading-scale values, location,
/// and subtype (§4.2, §4.6). An explicit `Diagnosis:` section, when present,
/// is preferred over the name inferred from ontology detection; a detected
/// subtype with both risk-level and prognosis promotes confidence to HIGH.
pub fn extract_pathology(text: &str) -> Vec<PathologyFinding> {
    let explicit_diagnosis = RE_DIAGNOSIS_SECTION.captures(text).map(|c| c[1].trim().to_string());
    let location = RE_LOCATION.captures(text).map(|c| format!("{} {}", &c[1], &c[2]));

    detect_pathology(text)
        .into_iter()
        .map(|detection| {
            let profile = profile_for(detection.pathology_type);
            let grades: Vec<GradeFinding> = profile
                .grading_scales
                .iter()
                .filter_map(|scale| {
                    let re = Regex::new(scale.pattern).ok()?;
                    let caps = re.captures(text)?;
                    Some(GradeFinding {
                        scale: scale.name.to_string(),
                        value: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
                        confidence: detection.confidence,
                    })
                })
                .collect();

            let subtype_detail = detect_subtype(text, detection.pathology_type);
            let confidence = if subtype_detail.is_some() {
                confidence_levels::HIGH
            } else {
                detection.confidence
            };

            PathologyFinding {
                pathology_type: detection.pathology_type,
                name: explicit_diagnosis.clone().unwrap_or(detection.name),
                confidence,
                grades,
                location: location.clone(),
                subtype: subtype_detail.map(|(subtype, _, _)| subtype),
            }
        })
        .collect()
}
