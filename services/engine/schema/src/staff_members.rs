use sea_orm::entity::prelude::*;

/// Staff membership of one user in one shop.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "staff_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub shop_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub staff_user_id: Uuid,
    pub name: String,
    pub role: String,
    pub secondary_role: Option<String>,
    /// JSON object of `{ action_key: bool }`.
    pub permission_overrides: Json,
    /// Argon2id PHC string; `None` until the staff member sets a PIN.
    pub pin_hash: Option<String>,
    pub accepted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
