use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::enums::SourceQualityGrade;

/// Output of the source-quality assessor (C5, §3, §4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceQualityReport {
    pub grade: SourceQualityGrade,
    pub overall_score: f64,
    pub factors: HashMap<String, f64>,
    pub issues: Vec<String>,
}

/// Six-dimension quality scoring (C9, §3, §4.9).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityReport {
    pub completeness: f32,
    pub accuracy: f32,
    pub consistency: f32,
    pub narrative_quality: f32,
    pub specificity: f32,
    pub timeliness: f32,
    pub overall: f32,
    pub issues: HashMap<String, Vec<String>>,
}
