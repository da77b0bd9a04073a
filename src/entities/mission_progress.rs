use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

/// 用户 × 任务进度（(user_id, mission_id) 唯一）。
/// 不变式: claimed ⇒ completed；completed ⇒ completed_at 非空。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "mission_progress")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub mission_id: i64,
    pub mission_date: NaiveDate,
    pub progress: i64,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub claimed: bool,
    pub claimed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
