//! Order lifecycle state machine.
//!
//! Pure functions over [`Order`]: every transition must be legal in the global
//! graph ([`OrderStatus::next_statuses`]) and granted by the actor's role
//! table. One exception: full-access roles may void any non-terminal order.

use tillwise_domain::capability::Capability;
use tillwise_domain::order::{Order, OrderStatus};
use tillwise_domain::permission::{PermissionOverrides, actions, effective_permission};
use tillwise_domain::role::Role;

use crate::error::TransitionError;

/// Administrative override: full-access roles always reach `Void` from a
/// non-terminal status, whether or not the graph lists the edge.
pub fn is_admin_void(role: Role, from: OrderStatus, to: OrderStatus) -> bool {
    to == OrderStatus::Void
        && !from.is_terminal()
        && Capability::of(role).permissions.is_full_access()
}

/// Validate and apply a kitchen/service pipeline transition.
///
/// Returns the order with only `status` replaced. `Pending` orders belong to
/// the quick-sale sub-machine and are rejected here unless voided by an admin.
pub fn attempt_transition(
    order: &Order,
    actor_role: Role,
    target: OrderStatus,
) -> Result<Order, TransitionError> {
    let from = order.status;
    if is_admin_void(actor_role, from, target) {
        return Ok(order.with_status(target));
    }
    if from == OrderStatus::Pending || !from.can_reach(target) {
        return Err(TransitionError::InvalidTransition { from, to: target });
    }
    if !Capability::of(actor_role).allows(from, target) {
        return Err(TransitionError::Forbidden {
            role: actor_role,
            from,
            to: target,
        });
    }
    Ok(order.with_status(target))
}

/// Validate and apply a quick-sale transition (`pending → completed | cancelled`).
///
/// Gated by action permissions rather than the role tables:
/// completing needs `process_payment`, cancelling needs `cancel_sale`.
pub fn attempt_quick_sale(
    order: &Order,
    actor_role: Role,
    overrides: &PermissionOverrides,
    target: OrderStatus,
) -> Result<Order, TransitionError> {
    let from = order.status;
    if is_admin_void(actor_role, from, target) && from == OrderStatus::Pending {
        return Ok(order.with_status(target));
    }
    if from != OrderStatus::Pending || !from.can_reach(target) {
        return Err(TransitionError::InvalidTransition { from, to: target });
    }
    let required = match target {
        OrderStatus::Completed => actions::PROCESS_PAYMENT,
        _ => actions::CANCEL_SALE,
    };
    if !effective_permission(actor_role, overrides, required) {
        return Err(TransitionError::Forbidden {
            role: actor_role,
            from,
            to: target,
        });
    }
    Ok(order.with_status(target))
}

/// The shop closing step: `paid → closed`. Permission is checked by the caller.
pub fn close_paid(order: &Order) -> Result<Order, TransitionError> {
    if order.status != OrderStatus::Paid {
        return Err(TransitionError::InvalidTransition {
            from: order.status,
            to: OrderStatus::Closed,
        });
    }
    Ok(order.with_status(OrderStatus::Closed))
}
