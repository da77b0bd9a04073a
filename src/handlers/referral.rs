use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::AppError;
use crate::handlers::{client_ip, user_id_from_request};
use crate::models::ApplyReferralRequest;
use crate::services::ReferralService;

#[utoipa::path(
    post,
    path = "/referrals/apply",
    tag = "referrals",
    request_body = ApplyReferralRequest,
    responses(
        (status = 200, description = "推荐码已应用，进入 pending 状态"),
        (status = 404, description = "推荐码无效"),
        (status = 409, description = "已应用过推荐码或被反作弊拒绝")
    )
)]
pub async fn apply_code(
    referral_service: web::Data<ReferralService>,
    req: HttpRequest,
    request: web::Json<ApplyReferralRequest>,
) -> Result<HttpResponse> {
    let Some(user_id) = user_id_from_request(&req) else {
        return Ok(AppError::ValidationError("Missing user".into()).error_response());
    };
    let ip = client_ip(&req);

    match referral_service
        .apply_code(user_id, &request.code, &ip)
        .await
    {
        Ok(referral) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "referral": referral }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/referrals",
    tag = "referrals",
    responses(
        (status = 200, description = "当前用户发起的推荐列表"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list(
    referral_service: web::Data<ReferralService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let Some(user_id) = user_id_from_request(&req) else {
        return Ok(AppError::ValidationError("Missing user".into()).error_response());
    };

    match referral_service.list_for_referrer(user_id).await {
        Ok(referrals) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "referrals": referrals }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn referral_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/referrals")
            .route("", web::get().to(list))
            .route("/apply", web::post().to(apply_code)),
    );
}
