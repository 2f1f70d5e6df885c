//! Ambient plumbing shared by tillwise crates: configuration loading,
//! startup errors, tracing setup and serde helpers.

pub mod config;
pub mod error;
pub mod serde;
pub mod tracing;
