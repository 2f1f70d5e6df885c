use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tillwise_domain::id::{DeviceId, OrderId, ShopId, StaffId};
use tillwise_domain::order::OrderStatus;
use tillwise_domain::permission::PermissionOverrides;
use tillwise_domain::role::Role;

/// Staff membership as read from the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffRecord {
    pub id: StaffId,
    pub shop_id: ShopId,
    pub name: String,
    pub role: Role,
    pub secondary_role: Option<Role>,
    pub overrides: PermissionOverrides,
    /// Set once the staff member accepted their invitation.
    pub accepted_at: Option<DateTime<Utc>>,
}

impl StaffRecord {
    pub fn has_accepted_invitation(&self) -> bool {
        self.accepted_at.is_some()
    }

    /// Record after a role change. Overrides are kept as they are.
    pub fn with_role(&self, role: Role) -> Self {
        Self {
            role,
            ..self.clone()
        }
    }
}

/// Identifies the single session slot a staff member has in a shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub shop_id: ShopId,
    pub staff_id: StaffId,
}

impl SessionKey {
    pub fn new(shop_id: ShopId, staff_id: StaffId) -> Self {
        Self { shop_id, staff_id }
    }
}

/// A staff member clocked in at one shop on one device.
///
/// Passed explicitly through request handling; there is no ambient
/// "current session".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffSession {
    pub shop_id: ShopId,
    pub staff_id: StaffId,
    pub device_id: DeviceId,
    /// Role snapshot taken at login; later role edits do not leak in.
    pub role: Role,
    pub clocked_in: bool,
    #[serde(serialize_with = "tillwise_core::serde::to_rfc3339_ms")]
    pub clocked_in_at: DateTime<Utc>,
    #[serde(serialize_with = "tillwise_core::serde::to_rfc3339_ms")]
    pub last_activity_at: DateTime<Utc>,
}

impl StaffSession {
    pub fn key(&self) -> SessionKey {
        SessionKey::new(self.shop_id, self.staff_id)
    }

    pub fn is_active(&self) -> bool {
        self.clocked_in
    }
}

/// What the store must still see for an upsert to go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPrecondition {
    /// No clocked-in row for the key.
    Vacant,
    /// The clocked-in row is bound to this device.
    HeldBy(DeviceId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Stored,
    /// Precondition failed: a concurrent admit changed the row first.
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmitOutcome {
    Admitted(StaffSession),
    /// Another device holds the session. Re-invoke with `force` to take it over.
    SwitchConfirmationRequired { previous_device_id: DeviceId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released,
    /// Nothing to release; treated as success.
    AlreadyReleased,
}

/// One accepted status change, emitted to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusHistoryEntry {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub actor_id: StaffId,
    #[serde(serialize_with = "tillwise_core::serde::to_rfc3339_ms")]
    pub recorded_at: DateTime<Utc>,
}

/// Seconds before the idle timeout at which the warning is raised.
pub const IDLE_WARNING_LEAD_SECS: u64 = 90;

/// Default idle timeout in minutes.
pub const DEFAULT_IDLE_TIMEOUT_MINUTES: u64 = 5;

/// Minimum spacing between persisted last-activity touches from one client.
pub const ACTIVITY_TOUCH_INTERVAL_SECS: u64 = 60;
