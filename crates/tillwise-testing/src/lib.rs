//! Test utilities for tillwise crates.
//!
//! Provides order fixtures and shared test constants.
//! Import in `#[cfg(test)]` blocks and integration tests only, never in production code.

pub mod fixture;
