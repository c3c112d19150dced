use crate::model::quality::SourceQualityReport;

/// Scale an extractor's raw confidence by source quality (§4.5). A
/// pristine note (`overallScore` 1.0) leaves confidence untouched; a
/// worthless one (`overallScore` 0.0) halves it. Clamped at both ends —
/// calibration can only ever pull confidence down, never inflate it past
/// its own raw value.
pub fn calibrate_confidence(confidence: f32, report: &SourceQualityReport) -> f32 {
    let factor = 0.5 + 0.5 * report.overall_score as f32;
    (confidence * factor).clamp(0.0, confidence.clamp(0.0, 1.0))
}
