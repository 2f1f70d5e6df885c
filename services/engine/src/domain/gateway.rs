//! Authorization decisions over a session. Never touches storage.

use tillwise_domain::order::{Order, OrderStatus};
use tillwise_domain::permission::{PermissionOverrides, actions, effective_permission};

use crate::domain::machine;
use crate::domain::types::StaffSession;
use crate::error::EngineError;

/// Whether the session may perform `action` right now.
///
/// Uses the role snapshotted at login, adjusted by the staff member's
/// overrides. A clocked-out session may do nothing.
pub fn authorize(session: &StaffSession, overrides: &PermissionOverrides, action: &str) -> bool {
    session.is_active() && effective_permission(session.role, overrides, action)
}

/// [`authorize`] as a `Result`, for use with `?`.
pub fn require(
    session: &StaffSession,
    overrides: &PermissionOverrides,
    action: &str,
) -> Result<(), EngineError> {
    ensure_active(session)?;
    if effective_permission(session.role, overrides, action) {
        Ok(())
    } else {
        Err(EngineError::Forbidden(format!(
            "{} lacks permission {action}",
            session.role
        )))
    }
}

/// Decide whether the session may move `order` to `target`. The caller applies it.
pub fn authorize_transition(
    session: &StaffSession,
    order: &Order,
    target: OrderStatus,
) -> Result<(), EngineError> {
    ensure_in_shop(session, order)?;
    machine::attempt_transition(order, session.role, target)?;
    Ok(())
}

/// Quick-sale counterpart of [`authorize_transition`].
pub fn authorize_quick_sale(
    session: &StaffSession,
    overrides: &PermissionOverrides,
    order: &Order,
    target: OrderStatus,
) -> Result<(), EngineError> {
    ensure_in_shop(session, order)?;
    machine::attempt_quick_sale(order, session.role, overrides, target)?;
    Ok(())
}

/// Shop closing step for one order: needs `close_day` and a `paid` order.
pub fn authorize_close(
    session: &StaffSession,
    overrides: &PermissionOverrides,
    order: &Order,
) -> Result<(), EngineError> {
    ensure_in_shop(session, order)?;
    require(session, overrides, actions::CLOSE_DAY)?;
    machine::close_paid(order)?;
    Ok(())
}

fn ensure_active(session: &StaffSession) -> Result<(), EngineError> {
    if session.is_active() {
        Ok(())
    } else {
        Err(EngineError::Unauthorized)
    }
}

fn ensure_in_shop(session: &StaffSession, order: &Order) -> Result<(), EngineError> {
    ensure_active(session)?;
    // Sessions are per shop; a session from another tenant is no session at all here.
    if session.shop_id != order.shop_id {
        return Err(EngineError::Unauthorized);
    }
    Ok(())
}
