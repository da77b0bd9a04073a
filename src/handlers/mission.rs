use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::AppError;
use crate::handlers::user_id_from_request;
use crate::services::{MissionService, NotificationService};

#[utoipa::path(
    get,
    path = "/missions/today",
    tag = "missions",
    responses(
        (status = 200, description = "今日任务及当前进度"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_today(
    mission_service: web::Data<MissionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let Some(user_id) = user_id_from_request(&req) else {
        return Ok(AppError::ValidationError("Missing user".into()).error_response());
    };

    match mission_service.today(user_id).await {
        Ok(missions) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "missions": missions }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/missions/{mission_id}/claim",
    tag = "missions",
    params(
        ("mission_id" = i64, Path, description = "任务 id")
    ),
    responses(
        (status = 200, description = "领取成功", body = crate::models::ClaimRewardResponse),
        (status = 404, description = "任务不存在"),
        (status = 409, description = "未完成或已领取")
    )
)]
pub async fn claim(
    mission_service: web::Data<MissionService>,
    notification_service: web::Data<NotificationService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let Some(user_id) = user_id_from_request(&req) else {
        return Ok(AppError::ValidationError("Missing user".into()).error_response());
    };
    let mission_id = path.into_inner();

    match mission_service.claim(user_id, mission_id).await {
        Ok((claim, notifications)) => {
            // 核心变更已落库，再派发通知
            notification_service.dispatch_all(notifications).await;
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": claim
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn mission_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/missions")
            .route("/today", web::get().to(get_today))
            .route("/{mission_id}/claim", web::post().to(claim)),
    );
}
