use actix_web::{HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

use crate::services::{MissionService, NotificationService, ReferralService};

// 管理端按需触发入口（常规路径由后台定时任务驱动）。
// 管理员鉴权同样由上游网关完成。

#[utoipa::path(
    post,
    path = "/admin/missions/generate",
    tag = "admin",
    responses((status = 200, description = "今日任务集（已存在则原样返回）"))
)]
pub async fn generate_missions(
    mission_service: web::Data<MissionService>,
) -> Result<HttpResponse> {
    match mission_service.generate_daily(Utc::now().date_naive()).await {
        Ok(missions) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "generated": missions.len() }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/referrals/validate",
    tag = "admin",
    responses((status = 200, description = "批量校验汇总", body = crate::models::ReferralBatchSummary))
)]
pub async fn validate_referrals(
    referral_service: web::Data<ReferralService>,
    notification_service: web::Data<NotificationService>,
) -> Result<HttpResponse> {
    match referral_service.run_validation().await {
        Ok((summary, notifications)) => {
            notification_service.dispatch_all(notifications).await;
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": summary
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/missions/generate", web::post().to(generate_missions))
            .route("/referrals/validate", web::post().to(validate_referrals)),
    );
}
