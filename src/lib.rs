//! Neurosurgical clinical-note extraction core: lexical normalization,
//! pathology ontology matching, temporal-context resolution, cross-mention
//! deduplication, source-quality assessment, category extractors, a
//! learned-pattern store, and the coordinator/validator/orchestrator layers
//! that sequence them into a single extraction call.

pub mod config;
pub mod coordinator;
pub mod dedup;
pub mod errors;
pub mod extractors;
pub mod lexical;
pub mod model;
pub mod ontology;
pub mod orchestrator;
pub mod pattern_store;
pub mod quality;
pub mod temporal;
pub mod validator;

pub use errors::{ExtractionError, OrchestratorError, PatternStoreError, ValidationError};
pub use orchestrator::{run_extraction, run_extraction_blocking, NotesInput, OrchestratorOptions, OrchestratorOutcome};

/// Initializes the crate's tracing subscriber from `RUST_LOG`, falling back
/// to [`config::default_log_filter`]. Safe to call more than once; later
/// calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())))
        .try_init();
}
