use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use tillwise_domain::id::{DeviceId, OrderId, ShopId, StaffId};
use tillwise_domain::order::{Order, OrderStatus};
use tillwise_domain::permission::PermissionOverrides;
use tillwise_domain::role::Role;
use tillwise_engine::domain::repository::{
    OrderRepository, PinHashSource, SessionRepository, StaffRepository, StatusHistoryRepository,
};
use tillwise_engine::domain::types::{
    SessionKey, SessionPrecondition, StaffRecord, StaffSession, StatusHistoryEntry, UpsertOutcome,
};
use tillwise_engine::error::EngineError;
use tillwise_engine::usecase::idle::CredentialCache;

// ── MockOrderRepo ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockOrderRepo {
    pub orders: Arc<Mutex<HashMap<OrderId, Order>>>,
}

impl MockOrderRepo {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders: Arc::new(Mutex::new(orders.into_iter().map(|o| (o.id, o)).collect())),
        }
    }

    pub fn status_of(&self, id: OrderId) -> Option<OrderStatus> {
        self.orders.lock().unwrap().get(&id).map(|o| o.status)
    }
}

impl OrderRepository for MockOrderRepo {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, EngineError> {
        let order = self.orders.lock().unwrap().get(&id).cloned();
        // Let joined callers read before either writes.
        tokio::task::yield_now().await;
        Ok(order)
    }

    async fn cas_update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> Result<bool, EngineError> {
        let mut orders = self.orders.lock().unwrap();
        match orders.get_mut(&id) {
            Some(order) if order.status == expected => {
                order.status = new;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ── MockHistoryRepo ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockHistoryRepo {
    pub entries: Arc<Mutex<Vec<StatusHistoryEntry>>>,
    /// Fail every append, as if the history table were unavailable.
    pub unavailable: Arc<AtomicBool>,
}

impl MockHistoryRepo {
    pub fn entries(&self) -> Vec<StatusHistoryEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl StatusHistoryRepository for MockHistoryRepo {
    async fn append(&self, entry: &StatusHistoryEntry) -> Result<(), EngineError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(EngineError::Storage(anyhow::anyhow!("history table unavailable")));
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

// ── MockStaffRepo ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockStaffRepo {
    pub staff: Arc<Mutex<Vec<StaffRecord>>>,
    pub pin_hashes: Arc<Mutex<HashMap<StaffId, String>>>,
}

impl MockStaffRepo {
    pub fn new(staff: Vec<StaffRecord>) -> Self {
        Self {
            staff: Arc::new(Mutex::new(staff)),
            pin_hashes: Arc::default(),
        }
    }

    pub fn with_pin_hash(self, staff_id: StaffId, hash: String) -> Self {
        self.pin_hashes.lock().unwrap().insert(staff_id, hash);
        self
    }

    pub fn record(&self, staff_id: StaffId) -> Option<StaffRecord> {
        self.staff
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == staff_id)
            .cloned()
    }

    pub fn change_role(&self, staff_id: StaffId, role: Role) {
        let mut staff = self.staff.lock().unwrap();
        if let Some(record) = staff.iter_mut().find(|s| s.id == staff_id) {
            *record = record.with_role(role);
        }
    }
}

impl StaffRepository for MockStaffRepo {
    async fn get_staff(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
    ) -> Result<Option<StaffRecord>, EngineError> {
        Ok(self
            .staff
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.shop_id == shop_id && s.id == staff_id)
            .cloned())
    }

    async fn set_permission_override(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
        key: &str,
        value: bool,
    ) -> Result<bool, EngineError> {
        let mut staff = self.staff.lock().unwrap();
        match staff
            .iter_mut()
            .find(|s| s.shop_id == shop_id && s.id == staff_id)
        {
            Some(record) => {
                record.overrides.set(key, value);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl PinHashSource for MockStaffRepo {
    async fn pin_hash(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
    ) -> Result<Option<String>, EngineError> {
        let known = self
            .staff
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.shop_id == shop_id && s.id == staff_id);
        if !known {
            return Ok(None);
        }
        Ok(self.pin_hashes.lock().unwrap().get(&staff_id).cloned())
    }
}

// ── MockSessionRepo ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockSessionRepo {
    pub rows: Arc<Mutex<HashMap<SessionKey, StaffSession>>>,
    /// Number of clock-outs that changed a row.
    pub releases: Arc<AtomicUsize>,
    /// Report the next upsert as a conflict, as if another process won.
    pub conflict_next: Arc<AtomicBool>,
}

impl MockSessionRepo {
    pub fn row(&self, shop_id: ShopId, staff_id: StaffId) -> Option<StaffSession> {
        self.rows
            .lock()
            .unwrap()
            .get(&SessionKey::new(shop_id, staff_id))
            .cloned()
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Store a clocked-in row for `staff` and return the client's copy of it.
    pub fn clock_in(&self, staff: &StaffRecord) -> StaffSession {
        let session = session_for(staff);
        self.rows
            .lock()
            .unwrap()
            .insert(session.key(), session.clone());
        session
    }
}

impl SessionRepository for MockSessionRepo {
    async fn find(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
    ) -> Result<Option<StaffSession>, EngineError> {
        Ok(self.row(shop_id, staff_id))
    }

    async fn upsert(
        &self,
        session: &StaffSession,
        precondition: SessionPrecondition,
    ) -> Result<UpsertOutcome, EngineError> {
        if self.conflict_next.swap(false, Ordering::SeqCst) {
            return Ok(UpsertOutcome::Conflict);
        }
        let mut rows = self.rows.lock().unwrap();
        let holds = match (rows.get(&session.key()), precondition) {
            (None, _) => true,
            (Some(row), SessionPrecondition::Vacant) => !row.clocked_in,
            (Some(row), SessionPrecondition::HeldBy(device_id)) => {
                row.clocked_in && row.device_id == device_id
            }
        };
        if !holds {
            return Ok(UpsertOutcome::Conflict);
        }
        rows.insert(session.key(), session.clone());
        Ok(UpsertOutcome::Stored)
    }

    async fn mark_clocked_out(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
        device_id: Option<DeviceId>,
    ) -> Result<bool, EngineError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&SessionKey::new(shop_id, staff_id)) {
            Some(row) if row.clocked_in && device_id.is_none_or(|d| d == row.device_id) => {
                row.clocked_in = false;
                self.releases.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn touch(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
        device_id: DeviceId,
        at: DateTime<Utc>,
    ) -> Result<bool, EngineError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&SessionKey::new(shop_id, staff_id)) {
            Some(row) if row.clocked_in && row.device_id == device_id => {
                row.last_activity_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ── RecordingCache ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingCache {
    pub clears: AtomicUsize,
}

impl RecordingCache {
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl CredentialCache for RecordingCache {
    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_staff(shop_id: ShopId, role: Role) -> StaffRecord {
    StaffRecord {
        id: StaffId::new(),
        shop_id,
        name: format!("{role} on shift"),
        role,
        secondary_role: None,
        overrides: PermissionOverrides::new(),
        accepted_at: Some(Utc::now()),
    }
}

pub fn invited_staff(shop_id: ShopId, role: Role) -> StaffRecord {
    StaffRecord {
        accepted_at: None,
        ..test_staff(shop_id, role)
    }
}

/// A clocked-in session for `staff`, built without going through admission.
pub fn session_for(staff: &StaffRecord) -> StaffSession {
    StaffSession {
        shop_id: staff.shop_id,
        staff_id: staff.id,
        device_id: DeviceId::new(),
        role: staff.role,
        clocked_in: true,
        clocked_in_at: Utc::now(),
        last_activity_at: Utc::now(),
    }
}
