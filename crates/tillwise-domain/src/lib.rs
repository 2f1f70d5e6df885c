//! Domain types shared across the tillwise engine.
//!
//! This crate contains only pure types and pure lookup functions with no
//! framework dependencies. Import in `usecase/` and `domain/` layers; never
//! reach for storage from here.

pub mod capability;
pub mod id;
pub mod order;
pub mod permission;
pub mod role;
