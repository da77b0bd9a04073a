use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub last_login_ip: Option<String>,
    pub xp: i64,
    pub post_count: i64,
    pub reply_count: i64,
    /// 可消费积分（任务奖励 / 商店消费）
    pub points: i64,
    pub achievement_points: i64,
    pub referral_points: i64,
    pub total_referrals: i64,
    pub streak_current: i32,
    pub streak_longest: i32,
    pub last_login_date: Option<NaiveDate>,
    pub referral_code: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
