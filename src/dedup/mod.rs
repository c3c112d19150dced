//! Semantic deduplication (C4): collapse repeated mentions of the same
//! clinical event into canonical entities, then link reference-context
//! mentions back to the event they describe (§4.4).

pub mod cluster;
pub mod link;

pub use cluster::cluster_mentions;
pub use link::link_references_to_events;
