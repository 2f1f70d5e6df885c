//! Permission representation and the pure permission lookups.
//!
//! A role's default permissions come from its [`Capability`]; per-staff
//! [`PermissionOverrides`] take precedence for the keys they name.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::capability::Capability;
use crate::order::OrderStatus;
use crate::role::{BusinessMode, Role};

/// Action keys understood by the engine.
pub mod actions {
    pub const TAKE_ORDER: &str = "take_order";
    pub const VIEW_ORDERS: &str = "view_orders";
    pub const VIEW_MENU: &str = "view_menu";
    pub const MARK_SERVED: &str = "mark_served";
    pub const REQUEST_PAYMENT: &str = "request_payment";
    pub const PROCESS_PAYMENT: &str = "process_payment";
    pub const VIEW_KITCHEN_ORDERS: &str = "view_kitchen_orders";
    pub const ACCEPT_ORDER: &str = "accept_order";
    pub const START_PREPARATION: &str = "start_preparation";
    pub const MARK_READY: &str = "mark_ready";
    pub const VIEW_READY_ORDERS: &str = "view_ready_orders";
    /// Cancel a pending quick sale. Full access only by default.
    pub const CANCEL_SALE: &str = "cancel_sale";
    /// Move paid orders to closed at end of day. Full access only by default.
    pub const CLOSE_DAY: &str = "close_day";
}

/// A role's default permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionSet {
    /// Every action key, including keys introduced later.
    FullAccess,
    /// Exactly the listed action keys.
    Actions(&'static [&'static str]),
}

impl PermissionSet {
    pub fn contains(&self, action: &str) -> bool {
        match self {
            Self::FullAccess => true,
            Self::Actions(keys) => keys.contains(&action),
        }
    }

    pub fn is_full_access(&self) -> bool {
        matches!(self, Self::FullAccess)
    }
}

/// Per-staff exceptions to the role default, keyed by action key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionOverrides(BTreeMap<String, bool>);

impl PermissionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<bool> {
        self.0.get(key).copied()
    }

    pub fn set(&mut self, key: impl Into<String>, allowed: bool) {
        self.0.insert(key.into(), allowed);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for PermissionOverrides {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Role default for one action key.
pub fn has_permission(role: Role, action: &str) -> bool {
    Capability::of(role).permissions.contains(action)
}

/// Alias kept for readability at override call sites.
pub fn role_default(role: Role, action: &str) -> bool {
    has_permission(role, action)
}

/// Override for `action` if present, else the role default.
pub fn effective_permission(role: Role, overrides: &PermissionOverrides, action: &str) -> bool {
    overrides
        .get(action)
        .unwrap_or_else(|| role_default(role, action))
}

/// Per-role transition table as a map.
pub fn allowed_transitions(role: Role) -> BTreeMap<OrderStatus, BTreeSet<OrderStatus>> {
    Capability::of(role).transition_map()
}

/// Same as [`allowed_transitions`] for a stored role name.
/// Unknown names get an empty table; callers reject unknown roles separately.
pub fn allowed_transitions_for_name(name: &str) -> BTreeMap<OrderStatus, BTreeSet<OrderStatus>> {
    Role::from_name(name)
        .map(allowed_transitions)
        .unwrap_or_default()
}

pub fn can_transition(role: Role, from: OrderStatus, to: OrderStatus) -> bool {
    Capability::of(role).allows(from, to)
}

/// Whether the requester may write permission overrides for other staff.
/// Either the primary or the secondary role qualifies.
pub fn can_manage_permissions(
    mode: BusinessMode,
    role: Role,
    secondary_role: Option<Role>,
) -> bool {
    let managers = mode.permission_managers();
    managers.contains(&role) || secondary_role.is_some_and(|r| managers.contains(&r))
}
