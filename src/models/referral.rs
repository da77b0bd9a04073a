use crate::entities::{ReferralStatus, referral_entity as referrals};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApplyReferralRequest {
    #[schema(example = "PB-7F3K9Q")]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReferralResponse {
    pub id: i64,
    pub referred_id: i64,
    pub points_awarded: i64,
    pub status: ReferralStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<referrals::Model> for ReferralResponse {
    fn from(r: referrals::Model) -> Self {
        Self {
            id: r.id,
            referred_id: r.referred_id,
            points_awarded: r.points_awarded,
            status: r.status,
            completed_at: r.completed_at,
            created_at: r.created_at,
        }
    }
}

/// 批量校验结果汇总（单条失败不中断批次，计入 failed）
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ReferralBatchSummary {
    pub checked: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub still_pending: i64,
    pub failed: i64,
}
