use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 帖子/回复/登录等由请求层转发进来的玩法事件
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserEventRequest {
    pub user_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LikeEventRequest {
    /// 被点赞内容的作者（XP 变动归属者）
    pub author_id: i64,
    /// 点赞 +n / 取消点赞 -n
    pub delta: i64,
    /// 点赞发起者（用于 give_likes 任务进度），取消点赞时可省略
    pub liker_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryVisitRequest {
    pub user_id: i64,
    pub category_id: i64,
}
