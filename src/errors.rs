//! Error taxonomy for the extraction core (§7). Each boundary gets its own
//! narrow `thiserror::Error` enum; lower-layer errors are chained with
//! `#[from]` where one is a direct cause of the other, following the
//! teacher's `ExtractionError`/`CoherenceError` split.

use thiserror::Error;

use crate::lexical::LexicalError;

/// Errors a single category extractor can surface. Per §7, a `ParseFailure`
/// degrades that category to empty and is logged at `warn`; it is never
/// propagated to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("date parse failure: {0}")]
    ParseFailure(#[from] LexicalError),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors surfaced by the validator (§4.8, §7). Distinct from `ValidationFlag`
/// (a non-fatal finding carried in `ValidationOutcome::flags`): this enum is
/// for conditions that prevent validation from running at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("category {0} could not be validated: source text unavailable")]
    MissingSource(String),
}

/// Top-level orchestrator failure modes (§7). Only `InvalidInput` and
/// `DeadlineExceeded` are user-visible; everything else degrades locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("No valid input provided")]
    InvalidInput,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Pattern-store failure modes (§4.10, §7). The coordinator treats any of
/// these as `PatternStoreUnavailable`: proceed with an empty learned-pattern
/// set and log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternStoreError {
    #[error("pattern store lock poisoned")]
    LockPoisoned,

    #[error("pattern {0} not found")]
    NotFound(u64),

    #[error("export/import version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}
