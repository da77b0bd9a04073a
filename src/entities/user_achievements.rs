use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 用户已解锁成就（(user_id, achievement_id) 唯一）。
/// `unlocked_at` 仅在解锁时写入一次。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_achievements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub achievement_id: i64,
    pub unlocked_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
