use crate::config::ProgressionConfig;
use crate::entities::{MissionType, user_entity as users};
use crate::error::AppResult;
use crate::models::OutboundNotification;
use crate::services::{
    AchievementService, BalanceField, MissionService, NotificationService, PointsService,
    StreakService,
};
use chrono::{Timelike, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// 深夜发帖成就的触发键（00:00–05:59 UTC）
const NIGHT_OWL_KEY: &str = "night_owl";

/// 玩法事件入口（请求层转发 post/reply/like/login 事件到这里）。
/// 计数与 XP 走账本；任务进度与成就评估的内部失败只记日志，
/// 不让触发事件的请求因此失败。
#[derive(Clone)]
pub struct ProgressionService {
    pool: DatabaseConnection,
    config: ProgressionConfig,
    points_service: PointsService,
    mission_service: MissionService,
    achievement_service: AchievementService,
    streak_service: StreakService,
    notification_service: NotificationService,
}

impl ProgressionService {
    pub fn new(
        pool: DatabaseConnection,
        config: ProgressionConfig,
        points_service: PointsService,
        mission_service: MissionService,
        achievement_service: AchievementService,
        streak_service: StreakService,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            pool,
            config,
            points_service,
            mission_service,
            achievement_service,
            streak_service,
            notification_service,
        }
    }

    pub async fn on_post_created(&self, user_id: i64) -> AppResult<()> {
        let mut notifications = Vec::new();

        self.adjust_logged(user_id, BalanceField::PostCount, 1).await;
        self.adjust_logged(user_id, BalanceField::Xp, self.config.xp_per_post)
            .await;

        self.progress_logged(user_id, MissionType::CreatePosts, 1, None, &mut notifications)
            .await;
        self.progress_logged(
            user_id,
            MissionType::EarnXp,
            self.config.xp_per_post,
            None,
            &mut notifications,
        )
        .await;

        self.evaluate_logged(user_id, &mut notifications).await;
        if Utc::now().hour() < 6 {
            self.evaluate_special_logged(user_id, NIGHT_OWL_KEY, &mut notifications)
                .await;
        }

        self.notification_service.dispatch_all(notifications).await;
        Ok(())
    }

    pub async fn on_reply_created(&self, user_id: i64) -> AppResult<()> {
        let mut notifications = Vec::new();

        self.adjust_logged(user_id, BalanceField::ReplyCount, 1).await;
        self.adjust_logged(user_id, BalanceField::Xp, self.config.xp_per_reply)
            .await;

        self.progress_logged(
            user_id,
            MissionType::CreateReplies,
            1,
            None,
            &mut notifications,
        )
        .await;
        self.progress_logged(
            user_id,
            MissionType::EarnXp,
            self.config.xp_per_reply,
            None,
            &mut notifications,
        )
        .await;

        self.evaluate_logged(user_id, &mut notifications).await;

        self.notification_service.dispatch_all(notifications).await;
        Ok(())
    }

    /// 点赞（delta > 0）或取消点赞（delta < 0）。
    /// XP 变动归内容作者；give_likes 任务进度归点赞者。
    pub async fn on_like_given(
        &self,
        author_id: i64,
        delta: i64,
        liker_id: Option<i64>,
    ) -> AppResult<()> {
        let mut notifications = Vec::new();

        self.adjust_logged(author_id, BalanceField::Xp, delta).await;

        if delta > 0 {
            self.progress_logged(
                author_id,
                MissionType::EarnXp,
                delta,
                None,
                &mut notifications,
            )
            .await;
            if let Some(liker) = liker_id {
                self.progress_logged(liker, MissionType::GiveLikes, 1, None, &mut notifications)
                    .await;
            }
            self.evaluate_logged(author_id, &mut notifications).await;
        }

        self.notification_service.dispatch_all(notifications).await;
        Ok(())
    }

    pub async fn on_login(&self, user_id: i64, request_ip: &str) -> AppResult<()> {
        let mut notifications = Vec::new();

        // 反作弊依据：记录最近登录 IP
        if let Err(e) = users::Entity::update_many()
            .col_expr(users::Column::LastLoginIp, Expr::value(request_ip))
            .filter(users::Column::Id.eq(user_id))
            .exec(&self.pool)
            .await
        {
            log::error!("Failed to record login IP for user {user_id}: {e:?}");
        }

        if let Err(e) = self.streak_service.advance(user_id).await {
            log::error!("Failed to advance streak for user {user_id}: {e:?}");
        }

        self.progress_logged(user_id, MissionType::Login, 1, None, &mut notifications)
            .await;
        self.evaluate_logged(user_id, &mut notifications).await;

        self.notification_service.dispatch_all(notifications).await;
        Ok(())
    }

    pub async fn on_category_visited(&self, user_id: i64, category_id: i64) -> AppResult<()> {
        let mut notifications = Vec::new();
        self.progress_logged(
            user_id,
            MissionType::VisitCategory,
            1,
            Some(category_id),
            &mut notifications,
        )
        .await;
        self.notification_service.dispatch_all(notifications).await;
        Ok(())
    }

    // -----------------------------
    // 内部辅助方法（失败隔离）
    // -----------------------------

    async fn adjust_logged(&self, user_id: i64, field: BalanceField, delta: i64) {
        if let Err(e) = self.points_service.adjust(user_id, field, delta).await {
            log::error!("Ledger adjust {field:?} {delta} failed for user {user_id}: {e:?}");
        }
    }

    async fn progress_logged(
        &self,
        user_id: i64,
        mission_type: MissionType,
        amount: i64,
        category_id: Option<i64>,
        notifications: &mut Vec<OutboundNotification>,
    ) {
        match self
            .mission_service
            .update_progress(user_id, mission_type, amount, category_id)
            .await
        {
            Ok(mut n) => notifications.append(&mut n),
            Err(e) => log::error!(
                "Mission progress {mission_type} failed for user {user_id}: {e:?}"
            ),
        }
    }

    async fn evaluate_logged(
        &self,
        user_id: i64,
        notifications: &mut Vec<OutboundNotification>,
    ) {
        match self.achievement_service.evaluate(user_id).await {
            Ok((_, mut n)) => notifications.append(&mut n),
            Err(e) => log::error!("Achievement evaluation failed for user {user_id}: {e:?}"),
        }
    }

    async fn evaluate_special_logged(
        &self,
        user_id: i64,
        key: &str,
        notifications: &mut Vec<OutboundNotification>,
    ) {
        match self.achievement_service.evaluate_special(user_id, key).await {
            Ok((_, mut n)) => notifications.append(&mut n),
            Err(e) => {
                log::error!("Special achievement {key} failed for user {user_id}: {e:?}")
            }
        }
    }
}
