use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{AchievementRarity, MissionType, ReferralStatus, RequirementType, RewardKind};
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::mission::get_today,
        handlers::mission::claim,
        handlers::achievement::list,
        handlers::referral::apply_code,
        handlers::referral::list,
        handlers::reward::inventory,
        handlers::reward::purchase,
        handlers::events::post_created,
        handlers::events::reply_created,
        handlers::events::like_given,
        handlers::events::login,
        handlers::events::category_visited,
        handlers::admin::generate_missions,
        handlers::admin::validate_referrals,
    ),
    components(
        schemas(
            ApiError,
            MissionResponse,
            ClaimRewardResponse,
            AchievementResponse,
            UnlockedAchievement,
            ApplyReferralRequest,
            ReferralResponse,
            ReferralBatchSummary,
            PurchaseRewardRequest,
            PurchaseRewardResponse,
            OwnedRewardResponse,
            OutboundNotification,
            UserEventRequest,
            LikeEventRequest,
            CategoryVisitRequest,
            MissionType,
            RequirementType,
            AchievementRarity,
            ReferralStatus,
            RewardKind,
        )
    ),
    tags(
        (name = "missions", description = "每日任务"),
        (name = "achievements", description = "成就"),
        (name = "referrals", description = "推荐"),
        (name = "rewards", description = "装饰奖励商店"),
        (name = "events", description = "玩法事件入口（内部）"),
        (name = "admin", description = "管理端按需触发")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
