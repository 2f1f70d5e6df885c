//! sea-orm entities backing the engine's reference persistence adapter.
//! Migrations are owned by the surrounding application.

pub mod order_status_history;
pub mod orders;
pub mod staff_members;
pub mod staff_sessions;
