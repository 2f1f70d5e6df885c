use sea_orm::entity::prelude::*;

/// Clock-in record. The composite primary key enforces one row per
/// (shop_id, staff_user_id); later devices overwrite it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "staff_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub shop_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub staff_user_id: Uuid,
    pub device_id: Uuid,
    /// Role snapshot taken at clock-in.
    pub role: String,
    pub clocked_in: bool,
    pub clocked_in_at: chrono::DateTime<chrono::Utc>,
    pub last_activity_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
