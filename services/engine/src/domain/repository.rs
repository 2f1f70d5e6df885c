#![allow(async_fn_in_trait)]

use std::future::Future;

use chrono::{DateTime, Utc};

use tillwise_domain::id::{DeviceId, OrderId, ShopId, StaffId};
use tillwise_domain::order::{Order, OrderStatus};

use crate::domain::types::{
    SessionPrecondition, StaffRecord, StaffSession, StatusHistoryEntry, UpsertOutcome,
};
use crate::error::EngineError;

/// Order records owned by the persistence collaborator.
pub trait OrderRepository: Send + Sync {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, EngineError>;

    /// Compare-and-swap the status. Returns `false` when the stored status is no
    /// longer `expected` (another writer won), never an error for that case.
    async fn cas_update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> Result<bool, EngineError>;
}

/// Append-only order status history.
pub trait StatusHistoryRepository: Send + Sync {
    async fn append(&self, entry: &StatusHistoryEntry) -> Result<(), EngineError>;
}

/// Staff records and their permission overrides.
pub trait StaffRepository: Send + Sync {
    async fn get_staff(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
    ) -> Result<Option<StaffRecord>, EngineError>;

    /// Returns `false` if the staff member does not exist.
    async fn set_permission_override(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
        key: &str,
        value: bool,
    ) -> Result<bool, EngineError>;
}

/// Stored PIN hashes, read by the argon2 credential adapter.
pub trait PinHashSource: Send + Sync {
    async fn pin_hash(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
    ) -> Result<Option<String>, EngineError>;
}

/// Clock-in records keyed by (shop_id, staff_id).
///
/// Methods return `Send` futures because idle watchers call them from
/// spawned tasks.
pub trait SessionRepository: Send + Sync {
    fn find(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
    ) -> impl Future<Output = Result<Option<StaffSession>, EngineError>> + Send;

    /// Insert or overwrite the row for `session.key()` if `precondition` still
    /// holds; otherwise report [`UpsertOutcome::Conflict`].
    fn upsert(
        &self,
        session: &StaffSession,
        precondition: SessionPrecondition,
    ) -> impl Future<Output = Result<UpsertOutcome, EngineError>> + Send;

    /// Set `clocked_in = false`. With `device_id`, only if the row is bound to
    /// that device. Returns `true` if a clocked-in row was changed.
    fn mark_clocked_out(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
        device_id: Option<DeviceId>,
    ) -> impl Future<Output = Result<bool, EngineError>> + Send;

    /// Bump last-activity on the clocked-in row bound to `device_id`.
    /// Returns `false` if there is no such row.
    fn touch(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
        device_id: DeviceId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, EngineError>> + Send;
}

/// Credential collaborator for in-person PIN login.
pub trait CredentialPort: Send + Sync {
    /// Wrong PIN, unknown staff and missing PIN all yield `Ok(None)`.
    async fn verify_pin(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
        pin: &str,
    ) -> Result<Option<StaffRecord>, EngineError>;
}
