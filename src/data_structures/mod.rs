//! Data structures for Roster.
//!
//! This module contains the in-memory structures the record store is built
//! on. They perform no I/O and never fail: missing keys are ordinary results.

pub mod prefix_index;

// Re-export common data structures
pub use prefix_index::PrefixIndex;
