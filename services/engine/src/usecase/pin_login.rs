use std::sync::Arc;

use tracing::info;

use tillwise_domain::id::{DeviceId, ShopId, StaffId};

use crate::domain::repository::{CredentialPort, SessionRepository};
use crate::domain::types::AdmitOutcome;
use crate::error::EngineError;
use crate::usecase::session::{AdmitRequest, SessionRegistry};

pub struct PinLoginInput {
    pub shop_id: ShopId,
    pub staff_id: StaffId,
    pub pin: String,
    pub device_id: DeviceId,
    /// Confirmed takeover from another device.
    pub force: bool,
}

pub struct PinLoginUseCase<C: CredentialPort, S: SessionRepository> {
    pub credentials: C,
    pub registry: Arc<SessionRegistry<S>>,
}

impl<C: CredentialPort, S: SessionRepository> PinLoginUseCase<C, S> {
    pub async fn execute(&self, input: PinLoginInput) -> Result<AdmitOutcome, EngineError> {
        let Some(staff) = self
            .credentials
            .verify_pin(input.shop_id, input.staff_id, &input.pin)
            .await?
        else {
            info!(
                shop_id = %input.shop_id,
                staff_id = %input.staff_id,
                kind = "UNAUTHORIZED",
                "pin rejected"
            );
            return Err(EngineError::Unauthorized);
        };

        self.registry
            .admit(AdmitRequest {
                shop_id: input.shop_id,
                staff: &staff,
                device_id: input.device_id,
                force: input.force,
            })
            .await
    }
}
