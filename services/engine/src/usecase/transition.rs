use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use tillwise_domain::id::OrderId;
use tillwise_domain::order::{Order, OrderStatus};
use tillwise_domain::permission::PermissionOverrides;

use crate::domain::gateway;
use crate::domain::repository::{
    OrderRepository, SessionRepository, StaffRepository, StatusHistoryRepository,
};
use crate::domain::types::{StaffSession, StatusHistoryEntry};
use crate::error::EngineError;
use crate::usecase::session::SessionRegistry;

async fn load_order<O: OrderRepository>(orders: &O, id: OrderId) -> Result<Order, EngineError> {
    orders.get_order(id).await?.ok_or(EngineError::OrderNotFound)
}

async fn load_overrides<St: StaffRepository>(
    staff: &St,
    session: &StaffSession,
) -> Result<PermissionOverrides, EngineError> {
    let record = staff
        .get_staff(session.shop_id, session.staff_id)
        .await?
        .ok_or(EngineError::StaffNotFound)?;
    Ok(record.overrides)
}

/// Persist an authorized change: CAS on the status the decision was made
/// against, then one history entry. A lost race is `StaleState`; no retry.
async fn commit<O, H>(
    orders: &O,
    history: &H,
    actor: &StaffSession,
    order: &Order,
    target: OrderStatus,
) -> Result<Order, EngineError>
where
    O: OrderRepository,
    H: StatusHistoryRepository,
{
    if !orders
        .cas_update_status(order.id, order.status, target)
        .await?
    {
        warn!(
            order_id = %order.id,
            expected = %order.status,
            to = %target,
            kind = "STALE_STATE",
            "order status changed concurrently"
        );
        return Err(EngineError::StaleState);
    }

    let entry = StatusHistoryEntry {
        order_id: order.id,
        status: target,
        actor_id: actor.staff_id,
        recorded_at: Utc::now(),
    };
    if let Err(e) = history.append(&entry).await {
        // The CAS is already committed; only the audit row is missing.
        error!(
            order_id = %order.id,
            from = %order.status,
            to = %target,
            actor_id = %actor.staff_id,
            status_committed = true,
            error = %e,
            kind = e.kind(),
            "status history append failed"
        );
        return Err(e);
    }

    info!(
        order_id = %order.id,
        from = %order.status,
        to = %target,
        actor_id = %actor.staff_id,
        role = %actor.role,
        "order status changed"
    );
    Ok(order.with_status(target))
}

// ── TransitionOrder ───────────────────────────────────────────────────────────

pub struct TransitionOrderUseCase<O, H, S>
where
    O: OrderRepository,
    H: StatusHistoryRepository,
    S: SessionRepository,
{
    pub orders: O,
    pub history: H,
    pub sessions: Arc<SessionRegistry<S>>,
}

impl<O, H, S> TransitionOrderUseCase<O, H, S>
where
    O: OrderRepository,
    H: StatusHistoryRepository,
    S: SessionRepository,
{
    pub async fn execute(
        &self,
        session: &StaffSession,
        order_id: OrderId,
        target: OrderStatus,
    ) -> Result<Order, EngineError> {
        let actor = self.sessions.require_live(session).await?;
        let order = load_order(&self.orders, order_id).await?;
        gateway::authorize_transition(&actor, &order, target)?;
        commit(&self.orders, &self.history, &actor, &order, target).await
    }
}

// ── QuickSale ─────────────────────────────────────────────────────────────────

/// Settles or cancels a `pending` quick-checkout sale.
pub struct QuickSaleUseCase<O, H, St, S>
where
    O: OrderRepository,
    H: StatusHistoryRepository,
    St: StaffRepository,
    S: SessionRepository,
{
    pub orders: O,
    pub history: H,
    pub staff: St,
    pub sessions: Arc<SessionRegistry<S>>,
}

impl<O, H, St, S> QuickSaleUseCase<O, H, St, S>
where
    O: OrderRepository,
    H: StatusHistoryRepository,
    St: StaffRepository,
    S: SessionRepository,
{
    pub async fn execute(
        &self,
        session: &StaffSession,
        order_id: OrderId,
        target: OrderStatus,
    ) -> Result<Order, EngineError> {
        let actor = self.sessions.require_live(session).await?;
        let order = load_order(&self.orders, order_id).await?;
        let overrides = load_overrides(&self.staff, &actor).await?;
        gateway::authorize_quick_sale(&actor, &overrides, &order, target)?;
        commit(&self.orders, &self.history, &actor, &order, target).await
    }
}

// ── CloseOrder ────────────────────────────────────────────────────────────────

/// Shop closing: `paid → closed`, gated by `close_day`.
pub struct CloseOrderUseCase<O, H, St, S>
where
    O: OrderRepository,
    H: StatusHistoryRepository,
    St: StaffRepository,
    S: SessionRepository,
{
    pub orders: O,
    pub history: H,
    pub staff: St,
    pub sessions: Arc<SessionRegistry<S>>,
}

impl<O, H, St, S> CloseOrderUseCase<O, H, St, S>
where
    O: OrderRepository,
    H: StatusHistoryRepository,
    St: StaffRepository,
    S: SessionRepository,
{
    pub async fn execute(
        &self,
        session: &StaffSession,
        order_id: OrderId,
    ) -> Result<Order, EngineError> {
        let actor = self.sessions.require_live(session).await?;
        let order = load_order(&self.orders, order_id).await?;
        let overrides = load_overrides(&self.staff, &actor).await?;
        gateway::authorize_close(&actor, &overrides, &order)?;
        commit(
            &self.orders,
            &self.history,
            &actor,
            &order,
            OrderStatus::Closed,
        )
        .await
    }
}
