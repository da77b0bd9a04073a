use crate::entities::{RewardKind, user_reward_entity as user_rewards};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 商店目录条目（静态配置）
#[derive(Debug, Clone)]
pub struct RewardCatalogItem {
    pub reward_ref: &'static str,
    pub name: &'static str,
    pub kind: RewardKind,
    pub cost: i64,
}

/// 可购买的装饰奖励目录
pub fn default_reward_catalog() -> Vec<RewardCatalogItem> {
    vec![
        RewardCatalogItem {
            reward_ref: "title_veteran",
            name: "Veteran",
            kind: RewardKind::Title,
            cost: 500,
        },
        RewardCatalogItem {
            reward_ref: "theme_midnight",
            name: "Midnight Theme",
            kind: RewardKind::Theme,
            cost: 800,
        },
        RewardCatalogItem {
            reward_ref: "frame_gold",
            name: "Gold Avatar Frame",
            kind: RewardKind::Frame,
            cost: 1200,
        },
        RewardCatalogItem {
            reward_ref: "emoji_party",
            name: "Party Emoji Pack",
            kind: RewardKind::Emoji,
            cost: 300,
        },
        RewardCatalogItem {
            reward_ref: "badge_supporter",
            name: "Supporter Badge",
            kind: RewardKind::Badge,
            cost: 1000,
        },
    ]
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchaseRewardRequest {
    #[schema(example = "theme_midnight")]
    pub reward_ref: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchaseRewardResponse {
    pub reward_ref: String,
    pub cost: i64,
    pub points_remaining: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OwnedRewardResponse {
    pub reward_kind: RewardKind,
    pub reward_ref: String,
    pub granted_at: DateTime<Utc>,
}

impl From<user_rewards::Model> for OwnedRewardResponse {
    fn from(r: user_rewards::Model) -> Self {
        Self {
            reward_kind: r.reward_kind,
            reward_ref: r.reward_ref,
            granted_at: r.granted_at,
        }
    }
}
