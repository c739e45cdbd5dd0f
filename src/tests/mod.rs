//! Test modules for Roster.
//!
//! This module contains the cross-component test suites:
//! - Property-based tests for the prefix index using proptest
//! - Record store tests against real data files
//! - Configuration loading and validation tests
//! - Error type and reporter tests
//!
//! Component-local unit tests live next to the code they cover.


pub use test_utils::{create_test_dir, identifier_set_strategy, identifier_strategy, TestFixture};
