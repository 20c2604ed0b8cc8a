//! Analysis modules.
//!
//! Grouping of source rows by entity and per-entity statistics.

pub mod aggregator;

pub use aggregator::*;
