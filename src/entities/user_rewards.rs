use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reward_kind")]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    #[sea_orm(string_value = "badge")]
    Badge,
    #[sea_orm(string_value = "title")]
    Title,
    #[sea_orm(string_value = "theme")]
    Theme,
    #[sea_orm(string_value = "frame")]
    Frame,
    #[sea_orm(string_value = "emoji")]
    Emoji,
}

impl std::fmt::Display for RewardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewardKind::Badge => write!(f, "badge"),
            RewardKind::Title => write!(f, "title"),
            RewardKind::Theme => write!(f, "theme"),
            RewardKind::Frame => write!(f, "frame"),
            RewardKind::Emoji => write!(f, "emoji"),
        }
    }
}

/// 用户已拥有的装饰奖励（(user_id, reward_ref) 唯一）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_rewards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub reward_kind: RewardKind,
    pub reward_ref: String,
    pub granted_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
