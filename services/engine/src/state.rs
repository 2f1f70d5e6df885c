use std::sync::Arc;

use anyhow::Context as _;
use sea_orm::{Database, DatabaseConnection};

use tillwise_core::error::AppError;

use crate::config::EngineConfig;
use crate::infra::db::{
    DbOrderRepository, DbSessionRepository, DbStaffRepository, DbStatusHistoryRepository,
};
use crate::infra::pin::Argon2CredentialPort;
use crate::usecase::permission::UpdatePermissionOverrideUseCase;
use crate::usecase::pin_login::PinLoginUseCase;
use crate::usecase::session::SessionRegistry;
use crate::usecase::transition::{CloseOrderUseCase, QuickSaleUseCase, TransitionOrderUseCase};

/// Shared engine state, cheap to clone into request handlers.
#[derive(Clone)]
pub struct EngineState {
    pub db: DatabaseConnection,
    pub config: Arc<EngineConfig>,
    pub sessions: Arc<SessionRegistry<DbSessionRepository>>,
}

impl EngineState {
    pub fn new(db: DatabaseConnection, config: EngineConfig) -> Self {
        let sessions = Arc::new(SessionRegistry::new(DbSessionRepository { db: db.clone() }));
        Self {
            db,
            config: Arc::new(config),
            sessions,
        }
    }

    pub async fn connect(config: EngineConfig) -> Result<Self, AppError> {
        let db = Database::connect(config.require_database_url()?)
            .await
            .context("connect to database")?;
        Ok(Self::new(db, config))
    }

    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
        }
    }

    pub fn history_repo(&self) -> DbStatusHistoryRepository {
        DbStatusHistoryRepository {
            db: self.db.clone(),
        }
    }

    pub fn staff_repo(&self) -> DbStaffRepository {
        DbStaffRepository {
            db: self.db.clone(),
        }
    }

    pub fn transition_order(
        &self,
    ) -> TransitionOrderUseCase<DbOrderRepository, DbStatusHistoryRepository, DbSessionRepository>
    {
        TransitionOrderUseCase {
            orders: self.order_repo(),
            history: self.history_repo(),
            sessions: self.sessions.clone(),
        }
    }

    pub fn quick_sale(
        &self,
    ) -> QuickSaleUseCase<
        DbOrderRepository,
        DbStatusHistoryRepository,
        DbStaffRepository,
        DbSessionRepository,
    > {
        QuickSaleUseCase {
            orders: self.order_repo(),
            history: self.history_repo(),
            staff: self.staff_repo(),
            sessions: self.sessions.clone(),
        }
    }

    pub fn close_order(
        &self,
    ) -> CloseOrderUseCase<
        DbOrderRepository,
        DbStatusHistoryRepository,
        DbStaffRepository,
        DbSessionRepository,
    > {
        CloseOrderUseCase {
            orders: self.order_repo(),
            history: self.history_repo(),
            staff: self.staff_repo(),
            sessions: self.sessions.clone(),
        }
    }

    pub fn pin_login(
        &self,
    ) -> PinLoginUseCase<Argon2CredentialPort<DbStaffRepository>, DbSessionRepository> {
        PinLoginUseCase {
            credentials: Argon2CredentialPort {
                staff: self.staff_repo(),
            },
            registry: self.sessions.clone(),
        }
    }

    pub fn update_permission_override(
        &self,
    ) -> UpdatePermissionOverrideUseCase<DbStaffRepository, DbSessionRepository> {
        UpdatePermissionOverrideUseCase {
            staff: self.staff_repo(),
            sessions: self.sessions.clone(),
            mode: self.config.business_mode,
        }
    }
}
