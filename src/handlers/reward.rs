use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::AppError;
use crate::handlers::user_id_from_request;
use crate::models::PurchaseRewardRequest;
use crate::services::RewardService;

#[utoipa::path(
    get,
    path = "/rewards/inventory",
    tag = "rewards",
    responses(
        (status = 200, description = "已拥有的装饰奖励"),
        (status = 401, description = "未授权")
    )
)]
pub async fn inventory(
    reward_service: web::Data<RewardService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let Some(user_id) = user_id_from_request(&req) else {
        return Ok(AppError::ValidationError("Missing user".into()).error_response());
    };

    match reward_service.inventory(user_id).await {
        Ok(rewards) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "rewards": rewards }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/rewards/purchase",
    tag = "rewards",
    request_body = PurchaseRewardRequest,
    responses(
        (status = 200, description = "购买成功", body = crate::models::PurchaseRewardResponse),
        (status = 404, description = "奖励不存在"),
        (status = 409, description = "积分不足或已拥有")
    )
)]
pub async fn purchase(
    reward_service: web::Data<RewardService>,
    req: HttpRequest,
    request: web::Json<PurchaseRewardRequest>,
) -> Result<HttpResponse> {
    let Some(user_id) = user_id_from_request(&req) else {
        return Ok(AppError::ValidationError("Missing user".into()).error_response());
    };

    match reward_service.purchase(user_id, &request.reward_ref).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn reward_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rewards")
            .route("/inventory", web::get().to(inventory))
            .route("/purchase", web::post().to(purchase)),
    );
}
