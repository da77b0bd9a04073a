use crate::entities::{MissionType, daily_mission_entity as missions};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 任务模板（静态配置，构造 MissionService 时注入，不落库）。
/// `max_weekly_occurrences` 限制同类任务在一个 ISO 周内的生成次数，
/// 保证每日任务的多样性。
#[derive(Debug, Clone)]
pub struct MissionTemplate {
    pub mission_type: MissionType,
    /// visit_category 模板用 "{category}" 占位符，生成时插入版块名
    pub description: &'static str,
    pub requirement_value: i64,
    pub reward_points: i64,
    pub reward_xp: i64,
    pub max_weekly_occurrences: i32,
}

/// 默认任务模板池
pub fn default_template_pool() -> Vec<MissionTemplate> {
    vec![
        MissionTemplate {
            mission_type: MissionType::CreatePosts,
            description: "Create 2 new posts",
            requirement_value: 2,
            reward_points: 50,
            reward_xp: 30,
            max_weekly_occurrences: 3,
        },
        MissionTemplate {
            mission_type: MissionType::CreateReplies,
            description: "Reply to 5 discussions",
            requirement_value: 5,
            reward_points: 40,
            reward_xp: 25,
            max_weekly_occurrences: 4,
        },
        MissionTemplate {
            mission_type: MissionType::EarnXp,
            description: "Earn 50 XP today",
            requirement_value: 50,
            reward_points: 60,
            reward_xp: 0,
            max_weekly_occurrences: 3,
        },
        MissionTemplate {
            mission_type: MissionType::GiveLikes,
            description: "Like 10 posts or replies",
            requirement_value: 10,
            reward_points: 30,
            reward_xp: 15,
            max_weekly_occurrences: 4,
        },
        MissionTemplate {
            mission_type: MissionType::VisitCategory,
            description: "Visit the {category} category",
            requirement_value: 1,
            reward_points: 20,
            reward_xp: 10,
            max_weekly_occurrences: 2,
        },
        MissionTemplate {
            mission_type: MissionType::Login,
            description: "Log in to the forum",
            requirement_value: 1,
            reward_points: 10,
            reward_xp: 5,
            max_weekly_occurrences: 2,
        },
    ]
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MissionResponse {
    pub id: i64,
    pub mission_type: MissionType,
    pub description: String,
    pub requirement_value: i64,
    pub category_id: Option<i64>,
    pub reward_points: i64,
    pub reward_xp: i64,
    pub expires_at: DateTime<Utc>,
    pub progress: i64,
    pub completed: bool,
    pub claimed: bool,
}

impl MissionResponse {
    pub fn from_mission(m: missions::Model, progress: i64, completed: bool, claimed: bool) -> Self {
        Self {
            id: m.id,
            mission_type: m.mission_type,
            description: m.description,
            requirement_value: m.requirement_value,
            category_id: m.category_id,
            reward_points: m.reward_points,
            reward_xp: m.reward_xp,
            expires_at: m.expires_at,
            progress,
            completed,
            claimed,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClaimRewardResponse {
    pub mission_id: i64,
    pub points_awarded: i64,
    /// 连续签到加成 floor(reward_points * streak * 0.1)
    pub streak_bonus: i64,
    pub xp_awarded: i64,
    /// 本次领取若推进了连续天数则返回新值
    pub streak: Option<i32>,
    /// 连续天数为 7 的倍数时的整周奖励
    pub weekly_bonus: Option<i64>,
}
