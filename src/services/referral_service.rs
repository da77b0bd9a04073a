use crate::config::ProgressionConfig;
use crate::entities::{
    ReferralStatus, referral_entity as referrals, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{OutboundNotification, ReferralBatchSummary, ReferralResponse};
use crate::services::{BalanceField, PointsService};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReferralOutcome {
    Complete,
    Cancel,
    Wait,
}

/// 单条推荐的结算决策（纯函数）。
/// 两侧时间界限：注册满 activation_days 且活跃则结算；
/// 满 expiry_days 仍未达标则取消；其余保持 pending。
fn decide(
    age_days: i64,
    profile_complete: bool,
    post_count: i64,
    reply_count: i64,
    activation_days: i64,
    expiry_days: i64,
) -> ReferralOutcome {
    if age_days < activation_days {
        return ReferralOutcome::Wait;
    }
    let active = profile_complete && (post_count >= 1 || reply_count >= 3);
    if active {
        ReferralOutcome::Complete
    } else if age_days >= expiry_days {
        ReferralOutcome::Cancel
    } else {
        ReferralOutcome::Wait
    }
}

#[derive(Clone)]
pub struct ReferralService {
    pool: DatabaseConnection,
    points_service: PointsService,
    config: ProgressionConfig,
}

impl ReferralService {
    pub fn new(
        pool: DatabaseConnection,
        points_service: PointsService,
        config: ProgressionConfig,
    ) -> Self {
        Self {
            pool,
            points_service,
            config,
        }
    }

    /// 注册时应用推荐码。
    /// 反作弊：与推荐人共享最近登录 IP 的申请直接拒绝；
    /// 每个账号终身只能应用一次推荐码（referred_id 唯一索引硬约束）。
    pub async fn apply_code(
        &self,
        new_user_id: i64,
        code: &str,
        request_ip: &str,
    ) -> AppResult<ReferralResponse> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::ValidationError(
                "Referral code must not be empty".to_string(),
            ));
        }

        let referrer = users::Entity::find()
            .filter(users::Column::ReferralCode.eq(code))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid referral code".to_string()))?;

        if referrer.id == new_user_id {
            return Err(AppError::ValidationError(
                "Cannot apply your own referral code".to_string(),
            ));
        }

        if referrer.last_login_ip.as_deref() == Some(request_ip) {
            log::warn!(
                "Referral code {code} rejected: applicant {new_user_id} shares IP with referrer {}",
                referrer.id
            );
            return Err(AppError::PreconditionFailed(
                "Referral rejected".to_string(),
            ));
        }

        let rows = referrals::Entity::insert(referrals::ActiveModel {
            referrer_id: Set(referrer.id),
            referred_id: Set(new_user_id),
            referral_code: Set(code.to_string()),
            points_awarded: Set(self.config.referral_points),
            status: Set(ReferralStatus::Pending),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::column(referrals::Column::ReferredId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.pool)
        .await?;
        if rows == 0 {
            return Err(AppError::PreconditionFailed(
                "A referral code has already been applied to this account".to_string(),
            ));
        }

        let created = referrals::Entity::find()
            .filter(referrals::Column::ReferredId.eq(new_user_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::InternalError("Referral vanished after insert".into()))?;
        Ok(created.into())
    }

    /// 每日批量结算 pending 推荐（也可由管理端按需触发）。
    /// 状态迁移是 WHERE status = 'pending' 的条件写，批量任务重复/并发运行各条只生效一次；
    /// 单条失败计入 failed，不中断批次。
    pub async fn run_validation(
        &self,
    ) -> AppResult<(ReferralBatchSummary, Vec<OutboundNotification>)> {
        let pending = referrals::Entity::find()
            .filter(referrals::Column::Status.eq(ReferralStatus::Pending))
            .all(&self.pool)
            .await?;

        let mut summary = ReferralBatchSummary::default();
        let mut notifications = Vec::new();
        for r in pending {
            summary.checked += 1;
            match self.validate_one(&r).await {
                Ok(ReferralOutcome::Complete) => {
                    summary.completed += 1;
                    notifications.push(OutboundNotification::with_link(
                        r.referrer_id,
                        format!(
                            "Your referral was confirmed, {} points credited",
                            r.points_awarded
                        ),
                        "/referrals",
                    ));
                }
                Ok(ReferralOutcome::Cancel) => summary.cancelled += 1,
                Ok(ReferralOutcome::Wait) => summary.still_pending += 1,
                Err(e) => {
                    summary.failed += 1;
                    log::error!("Referral {} validation failed: {e:?}", r.id);
                }
            }
        }
        log::info!(
            "Referral validation: {} checked, {} completed, {} cancelled, {} pending, {} failed",
            summary.checked,
            summary.completed,
            summary.cancelled,
            summary.still_pending,
            summary.failed
        );
        Ok((summary, notifications))
    }

    /// 推荐人视角的推荐列表
    pub async fn list_for_referrer(&self, user_id: i64) -> AppResult<Vec<ReferralResponse>> {
        let list = referrals::Entity::find()
            .filter(referrals::Column::ReferrerId.eq(user_id))
            .order_by_desc(referrals::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    async fn validate_one(&self, r: &referrals::Model) -> AppResult<ReferralOutcome> {
        let referred = users::Entity::find_by_id(r.referred_id)
            .one(&self.pool)
            .await?;
        let Some(referred) = referred else {
            // 被推荐账号已删除：按未达标处理，到期取消
            log::warn!("Referred user {} no longer exists", r.referred_id);
            let age = (Utc::now() - r.created_at.unwrap_or_else(Utc::now)).num_days();
            if age >= self.config.referral_expiry_days {
                self.transition(r, ReferralStatus::Cancelled).await?;
                return Ok(ReferralOutcome::Cancel);
            }
            return Ok(ReferralOutcome::Wait);
        };

        let age_days = (Utc::now() - r.created_at.unwrap_or_else(Utc::now)).num_days();
        let profile_complete =
            !referred.username.trim().is_empty() && referred.email.is_some();
        let outcome = decide(
            age_days,
            profile_complete,
            referred.post_count,
            referred.reply_count,
            self.config.referral_activation_days,
            self.config.referral_expiry_days,
        );

        match outcome {
            ReferralOutcome::Complete => {
                if self.transition(r, ReferralStatus::Completed).await? {
                    self.credit_referrer(r).await?;
                    Ok(ReferralOutcome::Complete)
                } else {
                    // 并发批次已迁移过
                    Ok(ReferralOutcome::Wait)
                }
            }
            ReferralOutcome::Cancel => {
                self.transition(r, ReferralStatus::Cancelled).await?;
                Ok(ReferralOutcome::Cancel)
            }
            ReferralOutcome::Wait => Ok(ReferralOutcome::Wait),
        }
    }

    /// pending → 终态的条件迁移；返回本次是否真正迁移成功。
    /// WHERE status = 'pending' 保证终态只写入一次，重复批次不重复计分。
    async fn transition(&self, r: &referrals::Model, to: ReferralStatus) -> AppResult<bool> {
        let sql = if to == ReferralStatus::Completed {
            "UPDATE referrals SET status = 'completed', completed_at = NOW() \
             WHERE id = $1 AND status = 'pending'"
        } else {
            "UPDATE referrals SET status = 'cancelled' \
             WHERE id = $1 AND status = 'pending'"
        };
        let stmt = sea_orm::Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            sql,
            [r.id.into()],
        );
        let res = self.pool.execute(stmt).await?;
        Ok(res.rows_affected() == 1)
    }

    /// 结算分值在创建时已固定，入账统一走积分台账
    async fn credit_referrer(&self, r: &referrals::Model) -> AppResult<()> {
        self.points_service
            .adjust(r.referrer_id, BalanceField::ReferralPoints, r.points_awarded)
            .await?;
        self.points_service
            .adjust(r.referrer_id, BalanceField::TotalReferrals, 1)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIVATION: i64 = 2;
    const EXPIRY: i64 = 30;

    #[test]
    fn test_active_referral_stays_pending_before_activation() {
        assert_eq!(
            decide(1, true, 3, 0, ACTIVATION, EXPIRY),
            ReferralOutcome::Wait
        );
    }

    #[test]
    fn test_active_referral_completes_at_activation() {
        assert_eq!(
            decide(2, true, 1, 0, ACTIVATION, EXPIRY),
            ReferralOutcome::Complete
        );
        // 无发帖但回帖达标同样算活跃
        assert_eq!(
            decide(2, true, 0, 3, ACTIVATION, EXPIRY),
            ReferralOutcome::Complete
        );
    }

    #[test]
    fn test_inactive_referral_waits_within_window() {
        assert_eq!(
            decide(29, true, 0, 2, ACTIVATION, EXPIRY),
            ReferralOutcome::Wait
        );
        // 资料不全也不结算
        assert_eq!(
            decide(5, false, 10, 10, ACTIVATION, EXPIRY),
            ReferralOutcome::Wait
        );
    }

    #[test]
    fn test_inactive_referral_cancelled_at_expiry() {
        assert_eq!(
            decide(30, true, 0, 2, ACTIVATION, EXPIRY),
            ReferralOutcome::Cancel
        );
        assert_eq!(
            decide(45, false, 0, 0, ACTIVATION, EXPIRY),
            ReferralOutcome::Cancel
        );
    }

    #[test]
    fn test_late_activity_still_completes() {
        // 第 30 天才活跃：优先结算而不是取消
        assert_eq!(
            decide(30, true, 2, 0, ACTIVATION, EXPIRY),
            ReferralOutcome::Complete
        );
    }
}
