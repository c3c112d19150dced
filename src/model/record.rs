use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::{CanonicalEntity, ReferenceDates};
use super::enums::{AnticoagulationStatus, ComplicationSeverity, PathologyType};
use super::quality::SourceQualityReport;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Demographics {
    pub name: Option<String>,
    pub mrn: Option<String>,
    pub dob: Option<NaiveDate>,
    pub age: Option<u8>,
    pub sex: Option<String>,
    pub attending_physician: Option<String>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeFinding {
    pub scale: String,
    pub value: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathologyFinding {
    pub pathology_type: PathologyType,
    pub name: String,
    pub confidence: f32,
    pub grades: Vec<GradeFinding>,
    pub location: Option<String>,
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagingFinding {
    pub modality: String,
    pub finding: String,
    pub date: Option<NaiveDate>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionalScores {
    pub kps: Option<u8>,
    pub ecog: Option<u8>,
    pub mrs: Option<u8>,
    pub hunt_hess: Option<u8>,
    pub fisher: Option<u8>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpItem {
    pub instructions: String,
    pub date: Option<NaiveDate>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DischargeDestination {
    pub destination: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnticoagulationEntry {
    pub drug_name: String,
    pub status: AnticoagulationStatus,
    pub indication: Option<String>,
    pub last_dose_date: Option<NaiveDate>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OncologyMarker {
    pub marker_name: String,
    pub value: Option<String>,
    pub unit: Option<String>,
    pub date: Option<NaiveDate>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LateRecoveryIndicator {
    pub label: String,
    pub severity: ComplicationSeverity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LateRecoveryFlag {
    pub flagged: bool,
    pub los_days: Option<i64>,
    pub indicators: Vec<LateRecoveryIndicator>,
}

/// Per-phase wall-clock timings in milliseconds (§4.7 step 10, §6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub context_building: u64,
    pub extraction: u64,
    pub intelligence: u64,
    pub validation: u64,
    pub narrative: u64,
    pub quality_metrics: u64,
    pub overall: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub method: String,
    pub note_count: usize,
    pub total_length: usize,
    pub source_quality: Option<SourceQualityReport>,
    pub performance: PerformanceMetrics,
}

/// The final structured output of a single extraction call (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub demographics: Demographics,
    pub reference_dates: ReferenceDates,
    pub pathology: Vec<PathologyFinding>,
    pub symptoms: Vec<CanonicalEntity>,
    pub procedures: Vec<CanonicalEntity>,
    pub complications: Vec<CanonicalEntity>,
    pub medications: Vec<CanonicalEntity>,
    pub imaging: Vec<ImagingFinding>,
    pub functional_scores: FunctionalScores,
    pub follow_up: Vec<FollowUpItem>,
    pub discharge_destination: Option<DischargeDestination>,
    pub anticoagulation: Vec<AnticoagulationEntry>,
    pub oncology_markers: Vec<OncologyMarker>,
    pub late_recovery: LateRecoveryFlag,
    pub confidence: HashMap<String, f32>,
    pub metadata: ExtractionMetadata,
}

impl ExtractedRecord {
    pub fn category_names() -> &'static [&'static str] {
        &[
            "demographics",
            "dates",
            "pathology",
            "symptoms",
            "procedures",
            "complications",
            "medications",
            "imaging",
            "functional_scores",
            "follow_up",
            "discharge_destination",
            "anticoagulation",
            "oncology_markers",
        ]
    }
}
