//! Pathology ontology (C2): static catalogue of pathology types, detection
//! patterns, and per-pathology sub-patterns.

pub mod catalogue;

use std::sync::LazyLock;

use regex::Regex;

use crate::config::confidence_levels;
use crate::model::enums::PathologyType;

pub use catalogue::{profile_for, GradingScale, PathologyProfile, CATALOGUE};

/// A single pathology detection result (§4.2).
#[derive(Debug, Clone)]
pub struct PathologyDetection {
    pub pathology_type: PathologyType,
    pub name: String,
    pub confidence: f32,
}

struct CompiledProfile {
    pathology_type: PathologyType,
    grading: Vec<Regex>,
    detection: Vec<Regex>,
    indirect: Vec<Regex>,
}

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!(pattern = p, error = %e, "ontology pattern failed to compile, skipped");
                None
            }
        })
        .collect()
}

static COMPILED: LazyLock<Vec<CompiledProfile>> = LazyLock::new(|| {
    CATALOGUE
        .iter()
        .map(|profile| CompiledProfile {
            pathology_type: profile.pathology_type,
            grading: profile
                .grading_scales
                .iter()
                .filter_map(|g| Regex::new(g.pattern).ok())
                .collect(),
            detection: compile_all(profile.detection_patterns),
            indirect: compile_all(profile.indirect_patterns),
        })
        .collect()
});

/// Detect which pathology types are present in `text`, sorted by confidence
/// descending (§4.2). Multiple types may co-occur; all are preserved.
pub fn detect_pathology(text: &str) -> Vec<PathologyDetection> {
    let mut results = Vec::new();

    for compiled in COMPILED.iter() {
        let profile = profile_for(compiled.pathology_type);

        let confidence = if compiled.grading.iter().any(|re| re.is_match(text)) {
            Some(confidence_levels::HIGH)
        } else if compiled.detection.iter().any(|re| re.is_match(text)) {
            Some(confidence_levels::MEDIUM)
        } else if compiled.indirect.iter().any(|re| re.is_match(text)) {
            Some(confidence_levels::LOW)
        } else {
            None
        };

        if let Some(confidence) = confidence {
            results.push(PathologyDetection {
                pathology_type: compiled.pathology_type,
                name: profile.display_name.to_string(),
                confidence,
            });
        }
    }

    results.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());
    results
}
