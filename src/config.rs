//! Tunable constants for the extraction pipeline. Centralized here so callers
//! can reason about defaults without hunting through each component.

use std::time::Duration;

/// Single-linkage clustering threshold for the semantic deduplicator (§4.4).
pub const DEDUP_SIMILARITY_THRESHOLD: f64 = 0.75;

/// Minimum similarity for a reference mention to link to a canonical event (§4.4).
pub const REFERENCE_LINK_THRESHOLD: f64 = 0.75;

/// Cross-note dedup similarity threshold: notes at/above this are considered
/// duplicates and the shorter is dropped (§4.7 step 3).
pub const CROSS_NOTE_DEDUP_THRESHOLD: f64 = 0.85;

/// Hard timeout for the cross-note dedup worker offload (§5).
pub const CROSS_NOTE_DEDUP_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Soft per-extractor time budget; overrun is logged, not aborted (§5).
pub const EXTRACTOR_SOFT_BUDGET: Duration = Duration::from_secs(8);

/// Default maximum refinement iterations in the orchestrator feedback loop (§4.9).
pub const DEFAULT_MAX_REFINEMENT_ITERATIONS: u32 = 2;

/// Default quality threshold below which refinement is attempted (§4.9).
pub const DEFAULT_QUALITY_THRESHOLD: f32 = 0.7;

/// Default total deadline for one orchestrator call (§5, §6); on expiry the
/// orchestrator returns the best partial result assembled so far.
pub const DEFAULT_ORCHESTRATOR_DEADLINE: Duration = Duration::from_secs(30);

/// Quality-dimension weights (§4.9): completeness, accuracy, consistency,
/// narrative, specificity, timeliness — sums to 1.0.
pub mod quality_weights {
    pub const COMPLETENESS: f32 = 0.30;
    pub const ACCURACY: f32 = 0.25;
    pub const CONSISTENCY: f32 = 0.20;
    pub const NARRATIVE: f32 = 0.15;
    pub const SPECIFICITY: f32 = 0.05;
    pub const TIMELINESS: f32 = 0.05;
}

/// Source-quality factor weights (§4.5) — sums to 1.0.
pub mod source_quality_weights {
    pub const STRUCTURE: f64 = 0.30;
    pub const LENGTH: f64 = 0.20;
    pub const TERMINOLOGY_DENSITY: f64 = 0.20;
    pub const HAS_DATE: f64 = 0.15;
    pub const SENTENCE_STRUCTURE: f64 = 0.15;
}

/// Acceptable note length window (chars) for the length factor (§4.5).
pub const NOTE_LENGTH_MIN: usize = 500;
pub const NOTE_LENGTH_MAX: usize = 8000;

/// Minimum sliding-window combined-similarity for the validator's
/// no-extrapolation check's third matching path (§4.8).
pub const NO_EXTRAPOLATION_SIMILARITY: f64 = 0.8;

/// Quantized confidence levels emitted by extractors before calibration (§3).
pub mod confidence_levels {
    pub const LOW: f32 = 0.4;
    pub const MEDIUM: f32 = 0.6;
    pub const HIGH: f32 = 0.8;
    pub const CRITICAL: f32 = 0.95;
}

/// Build the default `tracing` env filter, matching `RUST_LOG` when set.
pub fn default_log_filter() -> &'static str {
    "neurodcs_core=info"
}

/// Initialize global tracing subscriber. Idempotent: safe to call from tests.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .try_init();
}
