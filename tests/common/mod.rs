//! Common test utilities for plugin-crawler integration tests

#[allow(dead_code)]
pub mod catalog;

#[allow(unused_imports)]
pub use catalog::*;
