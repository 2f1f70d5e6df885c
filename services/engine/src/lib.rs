//! Order lifecycle and staff authorization engine.
//!
//! `domain` holds the pure decision logic (state machine, gateway, idle
//! policy) and the collaborator ports; `usecase` orchestrates those decisions
//! against the ports; `infra` provides sea-orm and argon2 adapters.

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod state;
pub mod usecase;
