//! Temporal reasoning (C3): classify a mention's context against the
//! surrounding text and resolve it to a calendar date (§4.3).

pub mod classify;
pub mod resolve;

pub use classify::classify_temporal_context;
pub use resolve::{associate_date_with_entity, resolve_relative_date};
