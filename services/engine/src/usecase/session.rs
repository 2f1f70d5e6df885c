use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use tillwise_domain::id::{DeviceId, ShopId, StaffId};

use crate::domain::repository::SessionRepository;
use crate::domain::types::{
    AdmitOutcome, ReleaseOutcome, SessionKey, SessionPrecondition, StaffRecord, StaffSession,
    UpsertOutcome,
};
use crate::error::EngineError;

pub struct AdmitRequest<'a> {
    pub shop_id: ShopId,
    pub staff: &'a StaffRecord,
    pub device_id: DeviceId,
    /// Take the session over from another device.
    pub force: bool,
}

/// Owner of clock-in state: at most one active session per (shop, staff).
///
/// Admission and release for a key run under that key's async mutex, kept in
/// the map only while a call for that key is in flight. The store's
/// precondition check covers writers outside this process.
pub struct SessionRegistry<S: SessionRepository> {
    pub store: S,
    locks: Mutex<HashMap<SessionKey, Arc<Mutex<()>>>>,
}

impl<S: SessionRepository> SessionRegistry<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn key_lock(&self, key: SessionKey) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(key).or_default().clone()
    }

    // ── Admit ─────────────────────────────────────────────────────────────────

    pub async fn admit(&self, request: AdmitRequest<'_>) -> Result<AdmitOutcome, EngineError> {
        let staff = request.staff;
        if staff.shop_id != request.shop_id {
            return Err(EngineError::StaffNotFound);
        }
        if !staff.has_accepted_invitation() {
            return Err(EngineError::InvitationNotAccepted);
        }

        let key = SessionKey::new(request.shop_id, staff.id);
        let lock = self.key_lock(key).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.admit_locked(key, request).await
        };
        self.forget_lock(key, lock).await;
        outcome
    }

    /// Read, decide and upsert. Runs under the key's mutex.
    async fn admit_locked(
        &self,
        key: SessionKey,
        request: AdmitRequest<'_>,
    ) -> Result<AdmitOutcome, EngineError> {
        let staff = request.staff;
        let existing = self
            .store
            .find(key.shop_id, key.staff_id)
            .await?
            .filter(StaffSession::is_active);

        let now = Utc::now();
        let (precondition, clocked_in_at) = match existing {
            Some(current) if current.device_id != request.device_id => {
                if !request.force {
                    return Ok(AdmitOutcome::SwitchConfirmationRequired {
                        previous_device_id: current.device_id,
                    });
                }
                warn!(
                    shop_id = %key.shop_id,
                    staff_id = %key.staff_id,
                    previous_device_id = %current.device_id,
                    device_id = %request.device_id,
                    "forced device switch"
                );
                self.store
                    .mark_clocked_out(key.shop_id, key.staff_id, Some(current.device_id))
                    .await?;
                (SessionPrecondition::Vacant, now)
            }
            Some(current) => (
                SessionPrecondition::HeldBy(current.device_id),
                current.clocked_in_at,
            ),
            None => (SessionPrecondition::Vacant, now),
        };

        let session = StaffSession {
            shop_id: key.shop_id,
            staff_id: key.staff_id,
            device_id: request.device_id,
            role: staff.role,
            clocked_in: true,
            clocked_in_at,
            last_activity_at: now,
        };

        match self.store.upsert(&session, precondition).await? {
            UpsertOutcome::Stored => {
                info!(
                    shop_id = %key.shop_id,
                    staff_id = %key.staff_id,
                    device_id = %session.device_id,
                    role = %session.role,
                    "staff clocked in"
                );
                Ok(AdmitOutcome::Admitted(session))
            }
            UpsertOutcome::Conflict => {
                warn!(
                    shop_id = %key.shop_id,
                    staff_id = %key.staff_id,
                    kind = "STALE_STATE",
                    "concurrent admit won"
                );
                Err(EngineError::StaleState)
            }
        }
    }

    // ── Release ───────────────────────────────────────────────────────────────

    /// Clock the staff member out wherever they are. Idempotent.
    pub async fn release(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
    ) -> Result<ReleaseOutcome, EngineError> {
        self.release_inner(SessionKey::new(shop_id, staff_id), None)
            .await
    }

    /// Clock out only if the session is still bound to `device_id`, so a
    /// stale client cannot end a session another device has taken over.
    pub async fn release_device(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
        device_id: DeviceId,
    ) -> Result<ReleaseOutcome, EngineError> {
        self.release_inner(SessionKey::new(shop_id, staff_id), Some(device_id))
            .await
    }

    async fn release_inner(
        &self,
        key: SessionKey,
        device_id: Option<DeviceId>,
    ) -> Result<ReleaseOutcome, EngineError> {
        let lock = self.key_lock(key).await;
        let released = {
            let _guard = lock.lock().await;
            self.store
                .mark_clocked_out(key.shop_id, key.staff_id, device_id)
                .await
        };
        self.forget_lock(key, lock).await;

        if released? {
            info!(shop_id = %key.shop_id, staff_id = %key.staff_id, "staff clocked out");
            Ok(ReleaseOutcome::Released)
        } else {
            debug!(
                shop_id = %key.shop_id,
                staff_id = %key.staff_id,
                kind = "SESSION_NOT_FOUND",
                "release of inactive session"
            );
            Ok(ReleaseOutcome::AlreadyReleased)
        }
    }

    /// Drop the key's mutex once no other caller holds or waits on it.
    async fn forget_lock(&self, key: SessionKey, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // One reference in the map, one here.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&key);
        }
    }

    // ── Activity ──────────────────────────────────────────────────────────────

    /// Bump last-activity. Returns `false` when no session is bound to the device.
    pub async fn record_activity(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
        device_id: DeviceId,
    ) -> Result<bool, EngineError> {
        let touched = self
            .store
            .touch(shop_id, staff_id, device_id, Utc::now())
            .await?;
        if !touched {
            debug!(
                shop_id = %shop_id,
                staff_id = %staff_id,
                kind = "SESSION_NOT_FOUND",
                "activity for inactive session"
            );
        }
        Ok(touched)
    }

    pub async fn active_session(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
    ) -> Result<Option<StaffSession>, EngineError> {
        Ok(self
            .store
            .find(shop_id, staff_id)
            .await?
            .filter(StaffSession::is_active))
    }

    /// The stored clock-in behind a client's session value. A session that was
    /// released, timed out or taken over by another device is `Unauthorized`.
    pub async fn require_live(&self, session: &StaffSession) -> Result<StaffSession, EngineError> {
        match self
            .active_session(session.shop_id, session.staff_id)
            .await?
        {
            Some(live) if live.device_id == session.device_id => Ok(live),
            _ => {
                debug!(
                    shop_id = %session.shop_id,
                    staff_id = %session.staff_id,
                    device_id = %session.device_id,
                    kind = "UNAUTHORIZED",
                    "session no longer live"
                );
                Err(EngineError::Unauthorized)
            }
        }
    }
}
