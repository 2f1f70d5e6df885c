//! Staff roles and the business modes that group them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Staff role. Snapshotted into a session at login.
///
/// Wire format: snake_case string (`"manager"`, `"waiter"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Manager,
    Waiter,
    Chef,
    Runner,
    Cashier,
    Supervisor,
    Administrator,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Manager,
        Role::Waiter,
        Role::Chef,
        Role::Runner,
        Role::Cashier,
        Role::Supervisor,
        Role::Administrator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Waiter => "waiter",
            Self::Chef => "chef",
            Self::Runner => "runner",
            Self::Cashier => "cashier",
            Self::Supervisor => "supervisor",
            Self::Administrator => "administrator",
        }
    }

    /// Parse a stored role name. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownRole(s.to_owned()))
    }
}

/// How a shop runs its floor. Each mode has its own role taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessMode {
    /// Table service: orders travel waiter → kitchen → runner → payment.
    TableOrder,
    /// Counter service: cashier-driven quick sales.
    QuickCheckout,
}

impl BusinessMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TableOrder => "table_order",
            Self::QuickCheckout => "quick_checkout",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "table_order" => Some(Self::TableOrder),
            "quick_checkout" => Some(Self::QuickCheckout),
            _ => None,
        }
    }

    /// Roles allowed to edit other staff members' permission overrides.
    pub fn permission_managers(self) -> &'static [Role] {
        match self {
            Self::TableOrder => &[Role::Manager],
            Self::QuickCheckout => &[Role::Manager, Role::Administrator],
        }
    }
}

impl fmt::Display for BusinessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
