use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use tillwise_domain::id::{DeviceId, OrderId, ShopId, StaffId};
use tillwise_domain::order::{Order, OrderStatus};
use tillwise_domain::permission::PermissionOverrides;
use tillwise_domain::role::Role;
use tillwise_engine_schema::{order_status_history, orders, staff_members, staff_sessions};

use crate::domain::repository::{
    OrderRepository, PinHashSource, SessionRepository, StaffRepository, StatusHistoryRepository,
};
use crate::domain::types::{
    SessionPrecondition, StaffRecord, StaffSession, StatusHistoryEntry, UpsertOutcome,
};
use crate::error::EngineError;

fn parse_role(name: &str) -> anyhow::Result<Role> {
    Role::from_name(name).with_context(|| format!("unknown role {name:?}"))
}

fn parse_status(name: &str) -> anyhow::Result<OrderStatus> {
    OrderStatus::from_name(name).with_context(|| format!("unknown order status {name:?}"))
}

// ── Order repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

impl OrderRepository for DbOrderRepository {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, EngineError> {
        let model = orders::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find order")?;
        Ok(model.map(order_from_model).transpose()?)
    }

    async fn cas_update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        new: OrderStatus,
    ) -> Result<bool, EngineError> {
        let result = orders::Entity::update_many()
            .col_expr(orders::Column::Status, Expr::value(new.as_str()))
            .filter(orders::Column::Id.eq(id.0))
            .filter(orders::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .context("compare-and-swap order status")?;
        Ok(result.rows_affected == 1)
    }
}

fn order_from_model(model: orders::Model) -> anyhow::Result<Order> {
    Ok(Order {
        id: OrderId(model.id),
        shop_id: ShopId(model.shop_id),
        status: parse_status(&model.status)?,
        items: serde_json::from_value(model.items).context("decode order items")?,
        total_amount: model.total_amount,
        created_at: model.created_at,
    })
}

// ── Status history repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbStatusHistoryRepository {
    pub db: DatabaseConnection,
}

impl StatusHistoryRepository for DbStatusHistoryRepository {
    async fn append(&self, entry: &StatusHistoryEntry) -> Result<(), EngineError> {
        order_status_history::ActiveModel {
            id: Set(Uuid::now_v7()),
            order_id: Set(entry.order_id.0),
            status: Set(entry.status.as_str().to_owned()),
            actor_id: Set(entry.actor_id.0),
            recorded_at: Set(entry.recorded_at),
        }
        .insert(&self.db)
        .await
        .context("append order status history")?;
        Ok(())
    }
}

// ── Staff repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbStaffRepository {
    pub db: DatabaseConnection,
}

impl DbStaffRepository {
    async fn find_model(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
    ) -> Result<Option<staff_members::Model>, EngineError> {
        let model = staff_members::Entity::find_by_id((shop_id.0, staff_id.0))
            .one(&self.db)
            .await
            .context("find staff member")?;
        Ok(model)
    }
}

impl StaffRepository for DbStaffRepository {
    async fn get_staff(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
    ) -> Result<Option<StaffRecord>, EngineError> {
        let model = self.find_model(shop_id, staff_id).await?;
        Ok(model.map(staff_from_model).transpose()?)
    }

    async fn set_permission_override(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
        key: &str,
        value: bool,
    ) -> Result<bool, EngineError> {
        let key = key.to_owned();
        let updated = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    // Row lock so concurrent edits to different keys do not drop each other.
                    let Some(model) = staff_members::Entity::find_by_id((shop_id.0, staff_id.0))
                        .lock_exclusive()
                        .one(txn)
                        .await?
                    else {
                        return Ok(false);
                    };

                    let mut overrides: PermissionOverrides =
                        serde_json::from_value(model.permission_overrides.clone())
                            .map_err(|e| DbErr::Json(e.to_string()))?;
                    overrides.set(key, value);
                    let json =
                        serde_json::to_value(&overrides).map_err(|e| DbErr::Json(e.to_string()))?;

                    let mut active: staff_members::ActiveModel = model.into();
                    active.permission_overrides = Set(json);
                    active.update(txn).await?;
                    Ok(true)
                })
            })
            .await
            .context("set permission override")?;
        Ok(updated)
    }
}

impl PinHashSource for DbStaffRepository {
    async fn pin_hash(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
    ) -> Result<Option<String>, EngineError> {
        let model = self.find_model(shop_id, staff_id).await?;
        Ok(model.and_then(|m| m.pin_hash))
    }
}

fn staff_from_model(model: staff_members::Model) -> anyhow::Result<StaffRecord> {
    Ok(StaffRecord {
        id: StaffId(model.staff_user_id),
        shop_id: ShopId(model.shop_id),
        name: model.name,
        role: parse_role(&model.role)?,
        secondary_role: model.secondary_role.as_deref().map(parse_role).transpose()?,
        overrides: serde_json::from_value(model.permission_overrides)
            .context("decode permission overrides")?,
        accepted_at: model.accepted_at,
    })
}

// ── Session repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSessionRepository {
    pub db: DatabaseConnection,
}

impl SessionRepository for DbSessionRepository {
    async fn find(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
    ) -> Result<Option<StaffSession>, EngineError> {
        let model = staff_sessions::Entity::find_by_id((shop_id.0, staff_id.0))
            .one(&self.db)
            .await
            .context("find staff session")?;
        Ok(model.map(session_from_model).transpose()?)
    }

    async fn upsert(
        &self,
        session: &StaffSession,
        precondition: SessionPrecondition,
    ) -> Result<UpsertOutcome, EngineError> {
        use staff_sessions::Column;

        // Evaluated against the existing row on conflict.
        let clocked_in = Expr::col((staff_sessions::Entity, Column::ClockedIn));
        let guard = match precondition {
            SessionPrecondition::Vacant => clocked_in.eq(false),
            SessionPrecondition::HeldBy(device_id) => clocked_in.eq(true).and(
                Expr::col((staff_sessions::Entity, Column::DeviceId)).eq(device_id.0),
            ),
        };

        let model = staff_sessions::ActiveModel {
            shop_id: Set(session.shop_id.0),
            staff_user_id: Set(session.staff_id.0),
            device_id: Set(session.device_id.0),
            role: Set(session.role.as_str().to_owned()),
            clocked_in: Set(session.clocked_in),
            clocked_in_at: Set(session.clocked_in_at),
            last_activity_at: Set(session.last_activity_at),
        };
        let rows = staff_sessions::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([Column::ShopId, Column::StaffUserId])
                    .update_columns([
                        Column::DeviceId,
                        Column::Role,
                        Column::ClockedIn,
                        Column::ClockedInAt,
                        Column::LastActivityAt,
                    ])
                    .action_and_where(guard)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("upsert staff session")?;

        Ok(if rows == 0 {
            UpsertOutcome::Conflict
        } else {
            UpsertOutcome::Stored
        })
    }

    async fn mark_clocked_out(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
        device_id: Option<DeviceId>,
    ) -> Result<bool, EngineError> {
        let mut query = staff_sessions::Entity::update_many()
            .col_expr(staff_sessions::Column::ClockedIn, Expr::value(false))
            .filter(staff_sessions::Column::ShopId.eq(shop_id.0))
            .filter(staff_sessions::Column::StaffUserId.eq(staff_id.0))
            .filter(staff_sessions::Column::ClockedIn.eq(true));
        if let Some(device_id) = device_id {
            query = query.filter(staff_sessions::Column::DeviceId.eq(device_id.0));
        }
        let result = query
            .exec(&self.db)
            .await
            .context("mark staff session clocked out")?;
        Ok(result.rows_affected > 0)
    }

    async fn touch(
        &self,
        shop_id: ShopId,
        staff_id: StaffId,
        device_id: DeviceId,
        at: DateTime<Utc>,
    ) -> Result<bool, EngineError> {
        let result = staff_sessions::Entity::update_many()
            .col_expr(staff_sessions::Column::LastActivityAt, Expr::value(at))
            .filter(staff_sessions::Column::ShopId.eq(shop_id.0))
            .filter(staff_sessions::Column::StaffUserId.eq(staff_id.0))
            .filter(staff_sessions::Column::DeviceId.eq(device_id.0))
            .filter(staff_sessions::Column::ClockedIn.eq(true))
            .exec(&self.db)
            .await
            .context("touch staff session")?;
        Ok(result.rows_affected > 0)
    }
}

fn session_from_model(model: staff_sessions::Model) -> anyhow::Result<StaffSession> {
    Ok(StaffSession {
        shop_id: ShopId(model.shop_id),
        staff_id: StaffId(model.staff_user_id),
        device_id: DeviceId(model.device_id),
        role: parse_role(&model.role)?,
        clocked_in: model.clocked_in,
        clocked_in_at: model.clocked_in_at,
        last_activity_at: model.last_activity_at,
    })
}
