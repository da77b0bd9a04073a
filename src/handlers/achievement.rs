use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::AppError;
use crate::handlers::user_id_from_request;
use crate::services::AchievementService;

#[utoipa::path(
    get,
    path = "/achievements",
    tag = "achievements",
    responses(
        (status = 200, description = "成就列表（含进度百分比与稀有度颜色）"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list(
    achievement_service: web::Data<AchievementService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let Some(user_id) = user_id_from_request(&req) else {
        return Ok(AppError::ValidationError("Missing user".into()).error_response());
    };

    match achievement_service.list_with_progress(user_id).await {
        Ok(achievements) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "achievements": achievements }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn achievement_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/achievements").route("", web::get().to(list)));
}
