use crate::entities::notification_entity as notifications;
use crate::error::AppResult;
use crate::models::OutboundNotification;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// 通知出口：核心操作返回的通知列表在变更落库后由调用方经此派发。
/// 实时推送由独立的 socket 层消费 notifications 表，引擎侧只写。
#[derive(Clone)]
pub struct NotificationService {
    pool: DatabaseConnection,
}

impl NotificationService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn push(&self, n: &OutboundNotification) -> AppResult<()> {
        notifications::ActiveModel {
            user_id: Set(n.user_id),
            message: Set(n.message.clone()),
            link: Set(n.link.clone()),
            is_read: Set(false),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(())
    }

    /// fire-and-forget 语义：单条派发失败只记日志，不影响其余通知和主流程
    pub async fn dispatch_all(&self, list: Vec<OutboundNotification>) {
        for n in list {
            if let Err(e) = self.push(&n).await {
                log::error!("Failed to dispatch notification to user {}: {e:?}", n.user_id);
            }
        }
    }
}
