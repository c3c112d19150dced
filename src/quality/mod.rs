//! Source-quality assessment (C5): score how trustworthy a note is as an
//! extraction source, then use that score to calibrate extractor confidence
//! (§4.5).

pub mod assess;
pub mod calibrate;

pub use assess::assess_source_quality;
pub use calibrate::calibrate_confidence;
