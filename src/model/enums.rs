use serde::{Deserialize, Serialize};

/// Closed catalogue of pathology types detected by the ontology (§3, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathologyType {
    Sah,
    TbiCsdh,
    Ich,
    Tumors,
    Metastases,
    Spine,
    Hydrocephalus,
}

impl PathologyType {
    pub const ALL: [PathologyType; 7] = [
        PathologyType::Sah,
        PathologyType::TbiCsdh,
        PathologyType::Ich,
        PathologyType::Tumors,
        PathologyType::Metastases,
        PathologyType::Spine,
        PathologyType::Hydrocephalus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PathologyType::Sah => "SAH",
            PathologyType::TbiCsdh => "TBI/cSDH",
            PathologyType::Ich => "ICH",
            PathologyType::Tumors => "TUMORS",
            PathologyType::Metastases => "METASTASES",
            PathologyType::Spine => "SPINE",
            PathologyType::Hydrocephalus => "HYDROCEPHALUS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SAH" => Some(PathologyType::Sah),
            "TBI/CSDH" | "TBI" | "CSDH" => Some(PathologyType::TbiCsdh),
            "ICH" => Some(PathologyType::Ich),
            "TUMORS" | "TUMOR" => Some(PathologyType::Tumors),
            "METASTASES" | "METASTASIS" => Some(PathologyType::Metastases),
            "SPINE" => Some(PathologyType::Spine),
            "HYDROCEPHALUS" => Some(PathologyType::Hydrocephalus),
            _ => None,
        }
    }

    /// Pathologies for which an ictus (symptom-onset) date is meaningful (§4.6 Dates extractor).
    pub fn is_hemorrhagic(&self) -> bool {
        matches!(self, PathologyType::Sah | PathologyType::Ich | PathologyType::TbiCsdh)
    }

    /// Pathologies for which oncology markers are meaningful.
    pub fn is_oncologic(&self) -> bool {
        matches!(self, PathologyType::Tumors | PathologyType::Metastases)
    }
}

/// How a mention's temporal context was classified (§3, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceType {
    StatusPost,
    HistoryOf,
    Pod,
    NewEvent,
    ProcedureHeader,
}

/// Where a date attached to an entity came from (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateSource {
    Explicit,
    PodResolved,
    Inherited,
    NotFound,
}

/// Severity grade for complications (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplicationSeverity {
    Low,
    Moderate,
    High,
    Critical,
}

impl ComplicationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplicationSeverity::Low => "low",
            ComplicationSeverity::Moderate => "moderate",
            ComplicationSeverity::High => "high",
            ComplicationSeverity::Critical => "critical",
        }
    }
}

/// Medication status state machine (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MedicationStatus {
    Active,
    Started,
    Continued,
    Changed,
    Discontinued,
}

impl MedicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationStatus::Active => "active",
            MedicationStatus::Started => "started",
            MedicationStatus::Continued => "continued",
            MedicationStatus::Changed => "changed",
            MedicationStatus::Discontinued => "discontinued",
        }
    }
}

/// Anticoagulation status (§4.6 `[ADD]`, SPEC_FULL.md §4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnticoagulationStatus {
    On,
    Held,
    Reversed,
    Discontinued,
}

/// Validation flag severity (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FlagSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Source-quality letter grade (§3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceQualityGrade {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl SourceQualityGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            SourceQualityGrade::Excellent
        } else if score >= 0.7 {
            SourceQualityGrade::Good
        } else if score >= 0.5 {
            SourceQualityGrade::Fair
        } else if score >= 0.3 {
            SourceQualityGrade::Poor
        } else {
            SourceQualityGrade::VeryPoor
        }
    }
}
