//! Analysis modules.
//!
//! Grouped aggregations over the passenger manifest.

pub mod aggregator;

pub use aggregator::*;
