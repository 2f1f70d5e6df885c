use std::sync::Arc;

use tracing::info;

use tillwise_domain::id::StaffId;
use tillwise_domain::permission::can_manage_permissions;
use tillwise_domain::role::BusinessMode;

use crate::domain::repository::{SessionRepository, StaffRepository};
use crate::domain::types::StaffSession;
use crate::error::EngineError;
use crate::usecase::session::SessionRegistry;

pub struct UpdatePermissionOverrideInput {
    pub staff_id: StaffId,
    pub key: String,
    pub allowed: bool,
}

/// Writes a per-staff permission override within the requester's shop.
pub struct UpdatePermissionOverrideUseCase<St: StaffRepository, S: SessionRepository> {
    pub staff: St,
    pub sessions: Arc<SessionRegistry<S>>,
    pub mode: BusinessMode,
}

impl<St: StaffRepository, S: SessionRepository> UpdatePermissionOverrideUseCase<St, S> {
    pub async fn execute(
        &self,
        requester: &StaffSession,
        input: UpdatePermissionOverrideInput,
    ) -> Result<(), EngineError> {
        let live = self.sessions.require_live(requester).await?;
        let requester = &live;
        let requester_record = self
            .staff
            .get_staff(requester.shop_id, requester.staff_id)
            .await?
            .ok_or(EngineError::Unauthorized)?;

        if !can_manage_permissions(self.mode, requester.role, requester_record.secondary_role) {
            return Err(EngineError::Forbidden(format!(
                "{} may not manage permissions in {} mode",
                requester.role,
                self.mode.as_str()
            )));
        }

        let updated = self
            .staff
            .set_permission_override(requester.shop_id, input.staff_id, &input.key, input.allowed)
            .await?;
        if !updated {
            return Err(EngineError::StaffNotFound);
        }

        info!(
            shop_id = %requester.shop_id,
            staff_id = %input.staff_id,
            key = %input.key,
            allowed = input.allowed,
            by = %requester.staff_id,
            "permission override updated"
        );
        Ok(())
    }
}
