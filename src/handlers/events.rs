use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::AppError;
use crate::handlers::client_ip;
use crate::models::{CategoryVisitRequest, LikeEventRequest, UserEventRequest};
use crate::services::ProgressionService;

// 内部事件入口：帖子/回复/点赞的 CRUD 属于独立子系统，
// 它们在自身事务提交后把事件转发到这里驱动进度引擎。

#[utoipa::path(
    post,
    path = "/events/post-created",
    tag = "events",
    request_body = UserEventRequest,
    responses((status = 202, description = "事件已受理"))
)]
pub async fn post_created(
    progression_service: web::Data<ProgressionService>,
    request: web::Json<UserEventRequest>,
) -> Result<HttpResponse> {
    match progression_service.on_post_created(request.user_id).await {
        Ok(()) => Ok(HttpResponse::Accepted().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events/reply-created",
    tag = "events",
    request_body = UserEventRequest,
    responses((status = 202, description = "事件已受理"))
)]
pub async fn reply_created(
    progression_service: web::Data<ProgressionService>,
    request: web::Json<UserEventRequest>,
) -> Result<HttpResponse> {
    match progression_service.on_reply_created(request.user_id).await {
        Ok(()) => Ok(HttpResponse::Accepted().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events/like",
    tag = "events",
    request_body = LikeEventRequest,
    responses((status = 202, description = "事件已受理"), (status = 400, description = "参数错误"))
)]
pub async fn like_given(
    progression_service: web::Data<ProgressionService>,
    request: web::Json<LikeEventRequest>,
) -> Result<HttpResponse> {
    if request.delta == 0 {
        return Ok(AppError::ValidationError("delta must be non-zero".into()).error_response());
    }
    match progression_service
        .on_like_given(request.author_id, request.delta, request.liker_id)
        .await
    {
        Ok(()) => Ok(HttpResponse::Accepted().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events/login",
    tag = "events",
    request_body = UserEventRequest,
    responses((status = 202, description = "事件已受理"))
)]
pub async fn login(
    progression_service: web::Data<ProgressionService>,
    req: HttpRequest,
    request: web::Json<UserEventRequest>,
) -> Result<HttpResponse> {
    let ip = client_ip(&req);
    match progression_service.on_login(request.user_id, &ip).await {
        Ok(()) => Ok(HttpResponse::Accepted().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/events/category-visit",
    tag = "events",
    request_body = CategoryVisitRequest,
    responses((status = 202, description = "事件已受理"))
)]
pub async fn category_visited(
    progression_service: web::Data<ProgressionService>,
    request: web::Json<CategoryVisitRequest>,
) -> Result<HttpResponse> {
    match progression_service
        .on_category_visited(request.user_id, request.category_id)
        .await
    {
        Ok(()) => Ok(HttpResponse::Accepted().json(json!({ "success": true }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn events_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/events")
            .route("/post-created", web::post().to(post_created))
            .route("/reply-created", web::post().to(reply_created))
            .route("/like", web::post().to(like_given))
            .route("/login", web::post().to(login))
            .route("/category-visit", web::post().to(category_visited)),
    );
}
