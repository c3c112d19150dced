//! Per-category extractors (C6, §4.6). Each function takes the combined
//! note text plus whatever upstream context it depends on (pathology types,
//! reference dates) and returns its category's data alongside a raw
//! confidence, before source-quality calibration (§4.5) is applied by the
//! coordinator (C7).

pub mod anticoagulation;
pub mod common;
pub mod complications;
pub mod dates;
pub mod demographics;
pub mod discharge_destination;
pub mod follow_up;
pub mod functional_scores;
pub mod imaging;
pub mod late_recovery;
pub mod medications;
pub mod oncology;
pub mod pathology;
pub mod procedures;
pub mod symptoms;

pub use anticoagulation::extract_anticoagulation;
pub use complications::extract_complications;
pub use dates::extract_reference_dates;
pub use demographics::extract_demographics;
pub use discharge_destination::extract_discharge_destination;
pub use follow_up::extract_follow_up;
pub use functional_scores::extract_functional_scores;
pub use imaging::extract_imaging;
pub use late_recovery::detect_late_recovery;
pub use medications::extract_medications;
pub use oncology::extract_oncology_markers;
pub use pathology::extract_pathology;
pub use procedures::extract_procedures;
pub use symptoms::extract_symptoms;
