use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema, DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "mission_type")]
#[serde(rename_all = "snake_case")]
pub enum MissionType {
    #[sea_orm(string_value = "create_posts")]
    CreatePosts,
    #[sea_orm(string_value = "create_replies")]
    CreateReplies,
    #[sea_orm(string_value = "earn_xp")]
    EarnXp,
    #[sea_orm(string_value = "give_likes")]
    GiveLikes,
    #[sea_orm(string_value = "visit_category")]
    VisitCategory,
    #[sea_orm(string_value = "login")]
    Login,
}

impl std::fmt::Display for MissionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissionType::CreatePosts => write!(f, "create_posts"),
            MissionType::CreateReplies => write!(f, "create_replies"),
            MissionType::EarnXp => write!(f, "earn_xp"),
            MissionType::GiveLikes => write!(f, "give_likes"),
            MissionType::VisitCategory => write!(f, "visit_category"),
            MissionType::Login => write!(f, "login"),
        }
    }
}

/// 每日任务（按天生成，生成后当天内不可变）。
/// `year_week = ISO 年 * 100 + ISO 周`，用于按周统计同类任务出现次数。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "daily_missions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub mission_type: MissionType,
    pub description: String,
    pub requirement_value: i64,
    /// visit_category 类任务绑定的版块，其余为 NULL
    pub category_id: Option<i64>,
    pub reward_points: i64,
    pub reward_xp: i64,
    pub mission_date: NaiveDate,
    /// 当天槽位 (0..MISSIONS_PER_DAY)，与 mission_date 联合唯一，防止并发重复生成
    pub slot: i16,
    pub expires_at: DateTime<Utc>,
    pub year_week: i32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
