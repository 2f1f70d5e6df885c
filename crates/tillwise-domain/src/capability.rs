//! Capability sets: one named bundle of permissions and transition edges per role.
//!
//! Both business modes read from the single [`CAPABILITIES`] table, so a new
//! mode only needs a new taxonomy in [`crate::role::BusinessMode`], not a new
//! parallel table.

use std::collections::{BTreeMap, BTreeSet};

use crate::order::OrderStatus::{self, *};
use crate::permission::{PermissionSet, actions};
use crate::role::Role;

/// Transition edges a capability grants, as `(from, [to...])` rows.
pub type TransitionTable = &'static [(OrderStatus, &'static [OrderStatus])];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub role: Role,
    pub permissions: PermissionSet,
    pub transitions: TransitionTable,
}

const FULL_ACCESS_TRANSITIONS: TransitionTable = &[
    (New, &[Accepted, Void]),
    (Accepted, &[InPreparation, Void]),
    (InPreparation, &[Ready, Void]),
    (Ready, &[Served, Void]),
    (Served, &[PaymentRequested, Void]),
    (PaymentRequested, &[Paid, Void]),
];

const fn full_access(role: Role) -> Capability {
    Capability {
        role,
        permissions: PermissionSet::FullAccess,
        transitions: FULL_ACCESS_TRANSITIONS,
    }
}

const MANAGER: Capability = full_access(Role::Manager);
const SUPERVISOR: Capability = full_access(Role::Supervisor);
const ADMINISTRATOR: Capability = full_access(Role::Administrator);

const WAITER: Capability = Capability {
    role: Role::Waiter,
    permissions: PermissionSet::Actions(&[
        actions::TAKE_ORDER,
        actions::VIEW_ORDERS,
        actions::MARK_SERVED,
        actions::REQUEST_PAYMENT,
        actions::PROCESS_PAYMENT,
        actions::VIEW_MENU,
    ]),
    transitions: &[
        (New, &[Accepted]),
        (Served, &[PaymentRequested]),
        (PaymentRequested, &[Paid]),
    ],
};

const CHEF: Capability = Capability {
    role: Role::Chef,
    permissions: PermissionSet::Actions(&[
        actions::VIEW_KITCHEN_ORDERS,
        actions::ACCEPT_ORDER,
        actions::START_PREPARATION,
        actions::MARK_READY,
    ]),
    transitions: &[
        (New, &[Accepted]),
        (Accepted, &[InPreparation]),
        (InPreparation, &[Ready]),
    ],
};

const RUNNER: Capability = Capability {
    role: Role::Runner,
    permissions: PermissionSet::Actions(&[actions::VIEW_READY_ORDERS, actions::MARK_SERVED]),
    transitions: &[(Ready, &[Served])],
};

const CASHIER: Capability = Capability {
    role: Role::Cashier,
    permissions: PermissionSet::Actions(&[actions::PROCESS_PAYMENT, actions::VIEW_ORDERS]),
    transitions: &[(Served, &[PaymentRequested]), (PaymentRequested, &[Paid])],
};

pub const CAPABILITIES: &[Capability] = &[
    MANAGER,
    SUPERVISOR,
    ADMINISTRATOR,
    WAITER,
    CHEF,
    RUNNER,
    CASHIER,
];

impl Capability {
    pub fn of(role: Role) -> &'static Capability {
        match role {
            Role::Manager => &MANAGER,
            Role::Supervisor => &SUPERVISOR,
            Role::Administrator => &ADMINISTRATOR,
            Role::Waiter => &WAITER,
            Role::Chef => &CHEF,
            Role::Runner => &RUNNER,
            Role::Cashier => &CASHIER,
        }
    }

    pub fn next_statuses(&self, from: OrderStatus) -> &'static [OrderStatus] {
        self.transitions
            .iter()
            .find(|(f, _)| *f == from)
            .map(|(_, to)| *to)
            .unwrap_or_default()
    }

    pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
        self.next_statuses(from).contains(&to)
    }

    pub fn transition_map(&self) -> BTreeMap<OrderStatus, BTreeSet<OrderStatus>> {
        self.transitions
            .iter()
            .map(|(from, to)| (*from, to.iter().copied().collect()))
            .collect()
    }
}
