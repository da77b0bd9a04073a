pub mod achievement;
pub mod admin;
pub mod events;
pub mod mission;
pub mod referral;
pub mod reward;

use actix_web::{HttpRequest, web};

pub use achievement::achievement_config;
pub use admin::admin_config;
pub use events::events_config;
pub use mission::mission_config;
pub use referral::referral_config;
pub use reward::reward_config;

/// 认证在上游网关完成，网关把已验证的用户 id 注入 X-User-Id 头
pub(crate) fn user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.headers()
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
}

/// 客户端地址（优先网关注入的 X-Forwarded-For 首项）
pub(crate) fn client_ip(req: &HttpRequest) -> String {
    req.headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .or_else(|| req.peer_addr().map(|a| a.ip().to_string()))
        .unwrap_or_default()
}

pub fn api_config(cfg: &mut web::ServiceConfig) {
    mission_config(cfg);
    achievement_config(cfg);
    referral_config(cfg);
    reward_config(cfg);
    events_config(cfg);
    admin_config(cfg);
}
