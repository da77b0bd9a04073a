use crate::entities::{AchievementRarity, RequirementType, achievement_entity as achievements};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AchievementResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub requirement_type: RequirementType,
    pub requirement_value: i64,
    pub points: i64,
    pub rarity: AchievementRarity,
    pub rarity_color: String,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
    /// 0..=100，已解锁恒为 100
    pub progress_percent: i32,
}

impl AchievementResponse {
    pub fn from_definition(
        a: achievements::Model,
        unlocked_at: Option<DateTime<Utc>>,
        progress_percent: i32,
    ) -> Self {
        Self {
            id: a.id,
            name: a.name,
            description: a.description,
            requirement_type: a.requirement_type,
            requirement_value: a.requirement_value,
            points: a.points,
            rarity: a.rarity,
            rarity_color: a.rarity.color().to_string(),
            unlocked: unlocked_at.is_some(),
            unlocked_at,
            progress_percent,
        }
    }
}

/// Evaluate 的返回项：本次新解锁的成就
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnlockedAchievement {
    pub achievement_id: i64,
    pub name: String,
    pub points: i64,
}
