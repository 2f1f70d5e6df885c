use std::sync::Arc;

use tillwise_domain::id::{ShopId, StaffId};
use tillwise_domain::permission::{actions, effective_permission};
use tillwise_domain::role::{BusinessMode, Role};
use tillwise_engine::domain::gateway;
use tillwise_engine::domain::types::StaffRecord;
use tillwise_engine::error::EngineError;
use tillwise_engine::usecase::permission::{
    UpdatePermissionOverrideInput, UpdatePermissionOverrideUseCase,
};
use tillwise_engine::usecase::session::SessionRegistry;

use crate::helpers::{MockSessionRepo, MockStaffRepo, session_for, test_staff};

fn grant(staff: &StaffRecord, key: &str, allowed: bool) -> UpdatePermissionOverrideInput {
    UpdatePermissionOverrideInput {
        staff_id: staff.id,
        key: key.to_owned(),
        allowed,
    }
}

fn use_case(
    staff: &MockStaffRepo,
    sessions: &MockSessionRepo,
    mode: BusinessMode,
) -> UpdatePermissionOverrideUseCase<MockStaffRepo, MockSessionRepo> {
    UpdatePermissionOverrideUseCase {
        staff: staff.clone(),
        sessions: Arc::new(SessionRegistry::new(sessions.clone())),
        mode,
    }
}

#[tokio::test]
async fn should_let_manager_grant_override_in_table_order_mode() {
    let shop = ShopId::new();
    let manager = test_staff(shop, Role::Manager);
    let waiter = test_staff(shop, Role::Waiter);
    let repo = MockStaffRepo::new(vec![manager.clone(), waiter.clone()]);
    let sessions = MockSessionRepo::default();
    let session = sessions.clock_in(&manager);

    use_case(&repo, &sessions, BusinessMode::TableOrder)
        .execute(&session, grant(&waiter, actions::MARK_READY, true))
        .await
        .unwrap();

    let updated = repo.record(waiter.id).unwrap();
    assert_eq!(updated.overrides.get(actions::MARK_READY), Some(true));
    assert!(gateway::authorize(
        &session_for(&updated),
        &updated.overrides,
        actions::MARK_READY
    ));
}

#[tokio::test]
async fn should_forbid_administrator_in_table_order_mode() {
    let shop = ShopId::new();
    let admin = test_staff(shop, Role::Administrator);
    let waiter = test_staff(shop, Role::Waiter);
    let repo = MockStaffRepo::new(vec![admin.clone(), waiter.clone()]);
    let sessions = MockSessionRepo::default();
    let session = sessions.clock_in(&admin);

    let result = use_case(&repo, &sessions, BusinessMode::TableOrder)
        .execute(&session, grant(&waiter, actions::VIEW_MENU, false))
        .await;
    assert!(matches!(result, Err(EngineError::Forbidden(_))));
    assert!(repo.record(waiter.id).unwrap().overrides.is_empty());

    use_case(&repo, &sessions, BusinessMode::QuickCheckout)
        .execute(&session, grant(&waiter, actions::VIEW_MENU, false))
        .await
        .unwrap();
    assert_eq!(
        repo.record(waiter.id).unwrap().overrides.get(actions::VIEW_MENU),
        Some(false)
    );
}

#[tokio::test]
async fn should_accept_manager_as_secondary_role() {
    let shop = ShopId::new();
    let mut host = test_staff(shop, Role::Waiter);
    host.secondary_role = Some(Role::Manager);
    let runner = test_staff(shop, Role::Runner);
    let repo = MockStaffRepo::new(vec![host.clone(), runner.clone()]);
    let sessions = MockSessionRepo::default();
    let session = sessions.clock_in(&host);

    use_case(&repo, &sessions, BusinessMode::TableOrder)
        .execute(&session, grant(&runner, actions::TAKE_ORDER, true))
        .await
        .unwrap();
    assert_eq!(
        repo.record(runner.id).unwrap().overrides.get(actions::TAKE_ORDER),
        Some(true)
    );
}

#[tokio::test]
async fn should_forbid_non_manager_roles() {
    let shop = ShopId::new();
    let cashier = test_staff(shop, Role::Cashier);
    let waiter = test_staff(shop, Role::Waiter);
    let repo = MockStaffRepo::new(vec![cashier.clone(), waiter.clone()]);
    let sessions = MockSessionRepo::default();
    let session = sessions.clock_in(&cashier);

    let result = use_case(&repo, &sessions, BusinessMode::QuickCheckout)
        .execute(&session, grant(&waiter, actions::CANCEL_SALE, true))
        .await;
    assert!(matches!(result, Err(EngineError::Forbidden(_))));
}

#[tokio::test]
async fn should_reject_clocked_out_requester() {
    let shop = ShopId::new();
    let manager = test_staff(shop, Role::Manager);
    let waiter = test_staff(shop, Role::Waiter);
    let repo = MockStaffRepo::new(vec![manager.clone(), waiter.clone()]);
    let sessions = MockSessionRepo::default();
    let session = sessions.clock_in(&manager);
    let update = use_case(&repo, &sessions, BusinessMode::TableOrder);
    update.sessions.release(shop, manager.id).await.unwrap();

    let result = update
        .execute(&session, grant(&waiter, actions::VIEW_MENU, true))
        .await;
    assert!(matches!(result, Err(EngineError::Unauthorized)));
    assert!(repo.record(waiter.id).unwrap().overrides.is_empty());
}

#[tokio::test]
async fn should_return_staff_not_found_for_unknown_target() {
    let shop = ShopId::new();
    let manager = test_staff(shop, Role::Manager);
    let repo = MockStaffRepo::new(vec![manager.clone()]);
    let sessions = MockSessionRepo::default();
    let session = sessions.clock_in(&manager);

    let result = use_case(&repo, &sessions, BusinessMode::TableOrder)
        .execute(
            &session,
            UpdatePermissionOverrideInput {
                staff_id: StaffId::new(),
                key: actions::VIEW_MENU.to_owned(),
                allowed: true,
            },
        )
        .await;
    assert!(matches!(result, Err(EngineError::StaffNotFound)));
}

#[tokio::test]
async fn should_not_reach_staff_in_another_shop() {
    let manager = test_staff(ShopId::new(), Role::Manager);
    let elsewhere = test_staff(ShopId::new(), Role::Waiter);
    let repo = MockStaffRepo::new(vec![manager.clone(), elsewhere.clone()]);
    let sessions = MockSessionRepo::default();
    let session = sessions.clock_in(&manager);

    let result = use_case(&repo, &sessions, BusinessMode::TableOrder)
        .execute(&session, grant(&elsewhere, actions::VIEW_MENU, true))
        .await;
    assert!(matches!(result, Err(EngineError::StaffNotFound)));
    assert!(repo.record(elsewhere.id).unwrap().overrides.is_empty());
}

#[tokio::test]
async fn should_keep_overrides_after_promotion() {
    let shop = ShopId::new();
    let manager = test_staff(shop, Role::Manager);
    let cashier = test_staff(shop, Role::Cashier);
    let repo = MockStaffRepo::new(vec![manager.clone(), cashier.clone()]);
    let sessions = MockSessionRepo::default();
    let session = sessions.clock_in(&manager);

    use_case(&repo, &sessions, BusinessMode::TableOrder)
        .execute(&session, grant(&cashier, actions::VIEW_ORDERS, false))
        .await
        .unwrap();

    repo.change_role(cashier.id, Role::Supervisor);

    let promoted = repo.record(cashier.id).unwrap();
    assert_eq!(promoted.role, Role::Supervisor);
    assert!(!effective_permission(
        promoted.role,
        &promoted.overrides,
        actions::VIEW_ORDERS
    ));
    assert!(effective_permission(
        promoted.role,
        &promoted.overrides,
        actions::CLOSE_DAY
    ));
}
