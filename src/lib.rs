//! Roster Library
//!
//! This library contains the components of Roster, a record manager that
//! indexes record identifiers in a prefix tree for exact lookup and
//! autocomplete, and persists records to a flat file.
//!
//! # Architecture
//!
//! - [`data_structures::PrefixIndex`] is the leaf: a trie over identifiers
//! - [`store::RecordStore`] owns the records, keeps the index in step and
//!   rewrites the data file through a [`store::RecordRepository`]
//! - [`shell::Shell`] is the interactive console over a store
//! - [`config`] and [`error`] provide layered settings and typed errors

// Re-export public modules
pub mod config;
pub mod data_structures;
pub mod error;
pub mod shell;
pub mod store;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

/// Version information for Roster.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
