use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 核心操作产生的出站通知。
/// 业务操作只收集通知并返回给调用方，由调用方在核心变更落库后统一派发，
/// 这样核心逻辑无需依赖在线通知通道即可测试。
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OutboundNotification {
    pub user_id: i64,
    pub message: String,
    pub link: Option<String>,
}

impl OutboundNotification {
    pub fn new(user_id: i64, message: impl Into<String>) -> Self {
        Self {
            user_id,
            message: message.into(),
            link: None,
        }
    }

    pub fn with_link(user_id: i64, message: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            user_id,
            message: message.into(),
            link: Some(link.into()),
        }
    }
}
