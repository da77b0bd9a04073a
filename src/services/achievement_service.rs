use crate::entities::{
    RequirementType, achievement_entity as defs, user_achievement_entity as ua,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{AchievementResponse, OutboundNotification, UnlockedAchievement};
use crate::services::{BalanceField, PointsService, RewardService};
use chrono::Utc;
use sea_orm::sea_query::{OnConflict, PostgresQueryBuilder, Query};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use std::collections::{HashMap, HashSet};

/// 数值成就的进度百分比，0..=100
fn progress_percent(stat: i64, requirement: i64) -> i32 {
    if requirement <= 0 {
        return 100;
    }
    let pct = (stat as f64 * 100.0 / requirement as f64).round() as i64;
    pct.clamp(0, 100) as i32
}

#[derive(Clone)]
pub struct AchievementService {
    pool: DatabaseConnection,
    points_service: PointsService,
    reward_service: RewardService,
}

impl AchievementService {
    pub fn new(
        pool: DatabaseConnection,
        points_service: PointsService,
        reward_service: RewardService,
    ) -> Self {
        Self {
            pool,
            points_service,
            reward_service,
        }
    }

    /// 评估数值型成就并解锁新满足的条目。
    /// 单个成就发放失败只记日志，不影响其余候选；
    /// 未落库的解锁会在下一次评估时重试。
    pub async fn evaluate(
        &self,
        user_id: i64,
    ) -> AppResult<(Vec<UnlockedAchievement>, Vec<OutboundNotification>)> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let unlocked_ids = self.unlocked_ids(user_id).await?;

        let candidates = defs::Entity::find()
            .filter(defs::Column::IsActive.eq(true))
            .filter(defs::Column::RequirementType.ne(RequirementType::Special))
            .all(&self.pool)
            .await?;

        let mut unlocked = Vec::new();
        let mut notifications = Vec::new();
        for def in candidates {
            if unlocked_ids.contains(&def.id) {
                continue;
            }
            let stat = match def.requirement_type {
                RequirementType::Xp => user.xp,
                RequirementType::Posts => user.post_count,
                RequirementType::Replies => user.reply_count,
                RequirementType::Referrals => user.total_referrals,
                RequirementType::Special => continue,
            };
            if stat < def.requirement_value {
                continue;
            }
            match self.unlock(user_id, &def).await {
                Ok(Some((item, n))) => {
                    unlocked.push(item);
                    notifications.push(n);
                }
                Ok(None) => {} // 并发评估已解锁，跳过
                Err(e) => {
                    log::error!(
                        "Failed to unlock achievement {} for user {user_id}: {e:?}",
                        def.id
                    );
                }
            }
        }
        Ok((unlocked, notifications))
    }

    /// Special 类成就的显式触发路径（定性条件，如深夜发帖）。
    /// 由调用方在条件成立时以 special_key 触发。
    pub async fn evaluate_special(
        &self,
        user_id: i64,
        special_key: &str,
    ) -> AppResult<(Vec<UnlockedAchievement>, Vec<OutboundNotification>)> {
        let unlocked_ids = self.unlocked_ids(user_id).await?;

        let candidates = defs::Entity::find()
            .filter(defs::Column::IsActive.eq(true))
            .filter(defs::Column::RequirementType.eq(RequirementType::Special))
            .filter(defs::Column::SpecialKey.eq(special_key))
            .all(&self.pool)
            .await?;

        let mut unlocked = Vec::new();
        let mut notifications = Vec::new();
        for def in candidates {
            if unlocked_ids.contains(&def.id) {
                continue;
            }
            match self.unlock(user_id, &def).await {
                Ok(Some((item, n))) => {
                    unlocked.push(item);
                    notifications.push(n);
                }
                Ok(None) => {}
                Err(e) => {
                    log::error!(
                        "Failed to unlock special achievement {} for user {user_id}: {e:?}",
                        def.id
                    );
                }
            }
        }
        Ok((unlocked, notifications))
    }

    /// 成就列表（含进度）。
    /// 读取时顺带自愈：解锁记录指向已被物理删除的定义时，清掉悬挂引用。
    pub async fn list_with_progress(&self, user_id: i64) -> AppResult<Vec<AchievementResponse>> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let definitions = defs::Entity::find()
            .order_by_asc(defs::Column::Id)
            .all(&self.pool)
            .await?;
        let by_id: HashMap<i64, &defs::Model> = definitions.iter().map(|d| (d.id, d)).collect();

        let rows = ua::Entity::find()
            .filter(ua::Column::UserId.eq(user_id))
            .all(&self.pool)
            .await?;

        // 悬挂引用自愈
        let orphans: Vec<i64> = rows
            .iter()
            .filter(|r| !by_id.contains_key(&r.achievement_id))
            .map(|r| r.id)
            .collect();
        if !orphans.is_empty() {
            log::warn!(
                "Removing {} orphaned achievement record(s) for user {user_id}",
                orphans.len()
            );
            ua::Entity::delete_many()
                .filter(ua::Column::Id.is_in(orphans))
                .exec(&self.pool)
                .await?;
        }

        let unlocked_at: HashMap<i64, chrono::DateTime<Utc>> = rows
            .iter()
            .filter(|r| by_id.contains_key(&r.achievement_id))
            .map(|r| (r.achievement_id, r.unlocked_at))
            .collect();

        let mut out = Vec::new();
        for def in definitions {
            let when = unlocked_at.get(&def.id).copied();
            // 未解锁的软删除定义不展示
            if !def.is_active && when.is_none() {
                continue;
            }
            let percent = match (when, def.requirement_type) {
                (Some(_), _) => 100,
                (None, RequirementType::Special) => 0,
                (None, t) => {
                    let stat = match t {
                        RequirementType::Xp => user.xp,
                        RequirementType::Posts => user.post_count,
                        RequirementType::Replies => user.reply_count,
                        RequirementType::Referrals => user.total_referrals,
                        RequirementType::Special => 0,
                    };
                    progress_percent(stat, def.requirement_value)
                }
            };
            out.push(AchievementResponse::from_definition(def, when, percent));
        }
        Ok(out)
    }

    async fn unlocked_ids(&self, user_id: i64) -> AppResult<HashSet<i64>> {
        let rows = ua::Entity::find()
            .filter(ua::Column::UserId.eq(user_id))
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.achievement_id).collect())
    }

    /// 解锁单个成就：
    /// (user_id, achievement_id) 唯一索引 + DO NOTHING，只有真正插入成功的
    /// 那一次才计分、发奖励、发通知，并发重复评估不会重复计分。
    async fn unlock(
        &self,
        user_id: i64,
        def: &defs::Model,
    ) -> AppResult<Option<(UnlockedAchievement, OutboundNotification)>> {
        let insert = Query::insert()
            .into_table(ua::Entity)
            .columns([
                ua::Column::UserId,
                ua::Column::AchievementId,
                ua::Column::UnlockedAt,
            ])
            .values_panic([user_id.into(), def.id.into(), Utc::now().into()])
            .on_conflict(
                OnConflict::columns([ua::Column::UserId, ua::Column::AchievementId])
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();
        let (sql, values) = insert.build(PostgresQueryBuilder);
        let stmt = sea_orm::Statement::from_sql_and_values(
            sea_orm::DatabaseBackend::Postgres,
            sql,
            values,
        );
        let res = self.pool.execute(stmt).await?;
        if res.rows_affected() == 0 {
            return Ok(None);
        }

        if def.points > 0 {
            self.points_service
                .adjust(user_id, BalanceField::AchievementPoints, def.points)
                .await?;
        }

        if let (Some(kind), Some(reward_ref)) = (def.reward_kind, def.reward_ref.as_deref()) {
            // 已拥有时 grant 返回 false，不报错
            if let Err(e) = self.reward_service.grant(user_id, kind, reward_ref).await {
                log::error!(
                    "Failed to grant reward {reward_ref} for achievement {}: {e:?}",
                    def.id
                );
            }
        }

        let notification = OutboundNotification::with_link(
            user_id,
            format!("Achievement unlocked: {}", def.name),
            "/achievements",
        );
        Ok(Some((
            UnlockedAchievement {
                achievement_id: def.id,
                name: def.name.clone(),
                points: def.points,
            },
            notification,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent_partial() {
        // xp=240, 要求 250 → 96
        assert_eq!(progress_percent(240, 250), 96);
    }

    #[test]
    fn test_progress_percent_capped_at_100() {
        assert_eq!(progress_percent(300, 250), 100);
        assert_eq!(progress_percent(250, 250), 100);
    }

    #[test]
    fn test_progress_percent_zero_stat() {
        assert_eq!(progress_percent(0, 250), 0);
    }

    #[test]
    fn test_progress_percent_degenerate_requirement() {
        assert_eq!(progress_percent(0, 0), 100);
    }
}
