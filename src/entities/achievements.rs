use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 成就解锁条件类型。
/// `Special` 类成就不走通用数值比较，由显式触发路径评估。
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "requirement_type")]
#[serde(rename_all = "snake_case")]
pub enum RequirementType {
    #[sea_orm(string_value = "xp")]
    Xp,
    #[sea_orm(string_value = "posts")]
    Posts,
    #[sea_orm(string_value = "replies")]
    Replies,
    #[sea_orm(string_value = "referrals")]
    Referrals,
    #[sea_orm(string_value = "special")]
    Special,
}

impl std::fmt::Display for RequirementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequirementType::Xp => write!(f, "xp"),
            RequirementType::Posts => write!(f, "posts"),
            RequirementType::Replies => write!(f, "replies"),
            RequirementType::Referrals => write!(f, "referrals"),
            RequirementType::Special => write!(f, "special"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "achievement_rarity")]
#[serde(rename_all = "snake_case")]
pub enum AchievementRarity {
    #[sea_orm(string_value = "common")]
    Common,
    #[sea_orm(string_value = "rare")]
    Rare,
    #[sea_orm(string_value = "epic")]
    Epic,
    #[sea_orm(string_value = "legendary")]
    Legendary,
}

impl AchievementRarity {
    /// 前端展示颜色（静态配置，不入库）
    pub fn color(&self) -> &'static str {
        match self {
            AchievementRarity::Common => "#9e9e9e",
            AchievementRarity::Rare => "#2196f3",
            AchievementRarity::Epic => "#9c27b0",
            AchievementRarity::Legendary => "#ff9800",
        }
    }
}

/// 成就定义（管理员维护的配置实体，对评估器只读）。
/// 通过 `is_active = false` 软删除，被用户解锁记录引用时不物理删除。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "achievements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub requirement_type: RequirementType,
    pub requirement_value: i64,
    /// Special 类成就的触发键（如 "night_owl"），其余为 NULL
    pub special_key: Option<String>,
    /// 解锁时记入 achievement_points 的分值
    pub points: i64,
    /// 附带的装饰奖励（可选）
    pub reward_kind: Option<super::user_rewards::RewardKind>,
    pub reward_ref: Option<String>,
    pub rarity: AchievementRarity,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
