use crate::entities::{
    MissionType, category_entity as categories, daily_mission_entity as missions,
    mission_progress_entity as progress, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    ClaimRewardResponse, MissionResponse, MissionTemplate, OutboundNotification,
};
use crate::services::{BalanceField, PointsService, StreakService};
use crate::utils::{end_of_day_utc, iso_year_week};
use chrono::{NaiveDate, Utc};
use rand::Rng;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;
use std::sync::Arc;

/// 每天生成的任务数
pub const MISSIONS_PER_DAY: usize = 3;
/// 连续天数达到 7 的倍数时的整周奖励
const WEEKLY_STREAK_BONUS: i64 = 500;

/// 连续签到加成: floor(points * streak * 0.1)
fn streak_bonus(points: i64, streak: i32) -> i64 {
    points * streak.max(0) as i64 / 10
}

/// 整周奖励决策：连续天数是 7 的倍数即发放。
/// 只看当前连续天数，不要求本次 advance 真的推进了。
/// 正常流程里连续天数在当天登录时就已推进，领完最后一个任务时 advance 是同日空操作。
fn weekly_bonus_due(streak: i32) -> Option<i64> {
    if streak > 0 && streak % 7 == 0 {
        Some(WEEKLY_STREAK_BONUS)
    } else {
        None
    }
}

/// 进度累加（钳制到 requirement）。
/// 返回 None 表示无变化（不落库）；Some((new, crossed)) 中 crossed 表示本次跨过完成线。
fn apply_progress(current: i64, amount: i64, requirement: i64) -> Option<(i64, bool)> {
    if amount <= 0 {
        return None;
    }
    let next = (current + amount).min(requirement);
    if next == current {
        return None;
    }
    Some((next, next >= requirement))
}

/// 按周出现上限从模板池为当天选槽。
/// 每个槽位：从今天尚未选中的模板里均匀随机抽取，
/// 同类任务本 ISO 周的生成数达到上限则重抽，每个槽最多重试 pool_size 次后放弃该槽。
/// 这是公平性/多样性约束，保证枯燥任务类型一周内不会反复出现。
fn pick_templates<R: Rng>(
    rng: &mut R,
    pool: &[MissionTemplate],
    weekly_counts: &HashMap<MissionType, i64>,
    slots: usize,
) -> Vec<usize> {
    let mut chosen: Vec<usize> = Vec::with_capacity(slots);
    for _ in 0..slots {
        let mut attempts = 0;
        while attempts < pool.len() {
            attempts += 1;
            let unused: Vec<usize> = (0..pool.len()).filter(|i| !chosen.contains(i)).collect();
            if unused.is_empty() {
                return chosen;
            }
            let idx = unused[rng.gen_range(0..unused.len())];
            let t = &pool[idx];
            let used_this_week = weekly_counts.get(&t.mission_type).copied().unwrap_or(0);
            if used_this_week < t.max_weekly_occurrences as i64 {
                chosen.push(idx);
                break;
            }
        }
    }
    chosen
}

#[derive(Clone)]
pub struct MissionService {
    pool: DatabaseConnection,
    templates: Arc<Vec<MissionTemplate>>,
    points_service: PointsService,
    streak_service: StreakService,
}

impl MissionService {
    pub fn new(
        pool: DatabaseConnection,
        templates: Vec<MissionTemplate>,
        points_service: PointsService,
        streak_service: StreakService,
    ) -> Self {
        Self {
            pool,
            templates: Arc::new(templates),
            points_service,
            streak_service,
        }
    }

    /// 生成指定日期的任务集（幂等）。
    /// 已存在则原样返回；(mission_date, slot) 唯一索引兜底并发重复生成。
    pub async fn generate_daily(&self, date: NaiveDate) -> AppResult<Vec<missions::Model>> {
        let existing = missions::Entity::find()
            .filter(missions::Column::MissionDate.eq(date))
            .order_by_asc(missions::Column::Slot)
            .all(&self.pool)
            .await?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        let year_week = iso_year_week(date);

        // 本 ISO 周各任务类型已生成的次数
        let week_rows = missions::Entity::find()
            .filter(missions::Column::YearWeek.eq(year_week))
            .all(&self.pool)
            .await?;
        let mut weekly_counts: HashMap<MissionType, i64> = HashMap::new();
        for m in &week_rows {
            *weekly_counts.entry(m.mission_type).or_insert(0) += 1;
        }

        let picked = {
            let mut rng = rand::thread_rng();
            pick_templates(&mut rng, &self.templates, &weekly_counts, MISSIONS_PER_DAY)
        };

        let expires_at = end_of_day_utc(date);
        let mut slot: i16 = 0;
        for idx in picked {
            let t = &self.templates[idx];

            let (description, category_id) = if t.mission_type == MissionType::VisitCategory {
                match self.random_active_category().await? {
                    Some(c) => (t.description.replace("{category}", &c.name), Some(c.id)),
                    None => {
                        log::warn!("No active category available, skipping visit_category slot");
                        continue;
                    }
                }
            } else {
                (t.description.to_string(), None)
            };

            missions::Entity::insert(missions::ActiveModel {
                mission_type: Set(t.mission_type),
                description: Set(description),
                requirement_value: Set(t.requirement_value),
                category_id: Set(category_id),
                reward_points: Set(t.reward_points),
                reward_xp: Set(t.reward_xp),
                mission_date: Set(date),
                slot: Set(slot),
                expires_at: Set(expires_at),
                year_week: Set(year_week),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::columns([missions::Column::MissionDate, missions::Column::Slot])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;
            slot += 1;
        }

        // 读回当天任务（并发生成时以先落库者为准）
        let generated = missions::Entity::find()
            .filter(missions::Column::MissionDate.eq(date))
            .order_by_asc(missions::Column::Slot)
            .all(&self.pool)
            .await?;
        log::info!("Generated {} mission(s) for {date}", generated.len());
        Ok(generated)
    }

    /// 玩法事件驱动的进度更新。
    /// 命中今天同类型（版块任务还要求版块匹配）的所有任务；
    /// 已完成的任务不再累加，无变化不落库。跨过完成线时产生完成通知（不自动领取）。
    pub async fn update_progress(
        &self,
        user_id: i64,
        mission_type: MissionType,
        amount: i64,
        category_id: Option<i64>,
    ) -> AppResult<Vec<OutboundNotification>> {
        let today = Utc::now().date_naive();
        let todays = missions::Entity::find()
            .filter(missions::Column::MissionDate.eq(today))
            .filter(missions::Column::MissionType.eq(mission_type))
            .all(&self.pool)
            .await?;

        let mut notifications = Vec::new();
        for mission in todays {
            // 版块任务只接受对应版块的访问事件
            if let Some(bound) = mission.category_id
                && category_id != Some(bound)
            {
                continue;
            }

            let row = self.ensure_progress(user_id, &mission).await?;

            if row.claimed && !row.completed {
                // 数据不一致：claimed 必然蕴含 completed，按已完成修复
                log::warn!(
                    "Integrity: progress {} claimed without completed, repairing",
                    row.id
                );
                progress::Entity::update_many()
                    .col_expr(progress::Column::Completed, Expr::value(true))
                    .col_expr(
                        progress::Column::CompletedAt,
                        Expr::value(row.claimed_at.unwrap_or_else(Utc::now)),
                    )
                    .filter(progress::Column::Id.eq(row.id))
                    .exec(&self.pool)
                    .await?;
                continue;
            }
            if row.completed {
                continue;
            }

            let Some((next, crossed)) =
                apply_progress(row.progress, amount, mission.requirement_value)
            else {
                continue;
            };

            // 以读取到的 progress 为条件写入，并发事件只有一个生效，
            // 输掉的那个增量由下一次事件补上
            let mut update = progress::Entity::update_many()
                .col_expr(progress::Column::Progress, Expr::value(next))
                .col_expr(progress::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(progress::Column::Id.eq(row.id))
                .filter(progress::Column::Completed.eq(false))
                .filter(progress::Column::Progress.eq(row.progress));
            if crossed {
                update = update
                    .col_expr(progress::Column::Completed, Expr::value(true))
                    .col_expr(progress::Column::CompletedAt, Expr::value(Utc::now()));
            }
            let res = update.exec(&self.pool).await?;

            if crossed && res.rows_affected == 1 {
                notifications.push(OutboundNotification::with_link(
                    user_id,
                    format!("Daily mission completed: {}", mission.description),
                    "/missions",
                ));
            }
        }
        Ok(notifications)
    }

    /// 领取已完成任务的奖励（显式操作，完成不等于领取）。
    /// claimed 的翻转是 WHERE claimed = false 的条件写，重复领取只生效一次。
    pub async fn claim(
        &self,
        user_id: i64,
        mission_id: i64,
    ) -> AppResult<(ClaimRewardResponse, Vec<OutboundNotification>)> {
        let mission = missions::Entity::find_by_id(mission_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Mission not found".to_string()))?;
        if Utc::now() >= mission.expires_at {
            return Err(AppError::PreconditionFailed("Mission expired".to_string()));
        }

        let row = progress::Entity::find()
            .filter(progress::Column::UserId.eq(user_id))
            .filter(progress::Column::MissionId.eq(mission_id))
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::PreconditionFailed("Mission not completed".to_string())
            })?;
        if !row.completed {
            return Err(AppError::PreconditionFailed(
                "Mission not completed".to_string(),
            ));
        }
        if row.claimed {
            return Err(AppError::PreconditionFailed(
                "Reward already claimed".to_string(),
            ));
        }
        if row.completed_at.is_none() {
            log::warn!("Integrity: progress {} completed without timestamp", row.id);
        }

        let now = Utc::now();
        let res = progress::Entity::update_many()
            .col_expr(progress::Column::Claimed, Expr::value(true))
            .col_expr(progress::Column::ClaimedAt, Expr::value(now))
            .col_expr(progress::Column::UpdatedAt, Expr::value(now))
            .filter(progress::Column::Id.eq(row.id))
            .filter(progress::Column::Claimed.eq(false))
            .filter(progress::Column::Completed.eq(true))
            .exec(&self.pool)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::PreconditionFailed(
                "Reward already claimed".to_string(),
            ));
        }

        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let bonus = streak_bonus(mission.reward_points, user.streak_current);

        self.points_service
            .adjust(user_id, BalanceField::Points, mission.reward_points + bonus)
            .await?;
        if mission.reward_xp > 0 {
            self.points_service
                .adjust(user_id, BalanceField::Xp, mission.reward_xp)
                .await?;
        }

        let mut notifications = Vec::new();
        let mut streak = None;
        let mut weekly_bonus = None;

        // 当天最后一个未领取任务：推进连续天数。
        // claimed 的条件翻转让这条路径每天只走到一次，整周奖励不会重复发放。
        if self.all_claimed_today(user_id, mission.mission_date).await? {
            let state = self.streak_service.advance(user_id).await?;
            streak = Some(state.current);
            if let Some(bonus_points) = weekly_bonus_due(state.current) {
                self.points_service
                    .adjust(user_id, BalanceField::Points, bonus_points)
                    .await?;
                weekly_bonus = Some(bonus_points);
                notifications.push(OutboundNotification::new(
                    user_id,
                    format!(
                        "{}-day streak! Weekly bonus: {bonus_points} points",
                        state.current
                    ),
                ));
            }
        }

        Ok((
            ClaimRewardResponse {
                mission_id,
                points_awarded: mission.reward_points,
                streak_bonus: bonus,
                xp_awarded: mission.reward_xp,
                streak,
                weekly_bonus,
            },
            notifications,
        ))
    }

    /// 今天的任务及当前用户进度
    pub async fn today(&self, user_id: i64) -> AppResult<Vec<MissionResponse>> {
        let today = Utc::now().date_naive();
        let todays = missions::Entity::find()
            .filter(missions::Column::MissionDate.eq(today))
            .order_by_asc(missions::Column::Slot)
            .all(&self.pool)
            .await?;
        let ids: Vec<i64> = todays.iter().map(|m| m.id).collect();
        let rows = progress::Entity::find()
            .filter(progress::Column::UserId.eq(user_id))
            .filter(progress::Column::MissionId.is_in(ids))
            .all(&self.pool)
            .await?;
        let by_mission: HashMap<i64, &progress::Model> =
            rows.iter().map(|r| (r.mission_id, r)).collect();

        Ok(todays
            .into_iter()
            .map(|m| {
                let (p, c, cl) = by_mission
                    .get(&m.id)
                    .map(|r| (r.progress, r.completed, r.claimed))
                    .unwrap_or((0, false, false));
                MissionResponse::from_mission(m, p, c, cl)
            })
            .collect())
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    async fn random_active_category(&self) -> AppResult<Option<categories::Model>> {
        let list = categories::Entity::find()
            .filter(categories::Column::IsActive.eq(true))
            .all(&self.pool)
            .await?;
        if list.is_empty() {
            return Ok(None);
        }
        let idx = rand::thread_rng().gen_range(0..list.len());
        Ok(Some(list[idx].clone()))
    }

    /// 进度行不存在则创建（(user_id, mission_id) 唯一 + DO NOTHING）
    async fn ensure_progress(
        &self,
        user_id: i64,
        mission: &missions::Model,
    ) -> AppResult<progress::Model> {
        if let Some(row) = progress::Entity::find()
            .filter(progress::Column::UserId.eq(user_id))
            .filter(progress::Column::MissionId.eq(mission.id))
            .one(&self.pool)
            .await?
        {
            return Ok(row);
        }
        let inserted = progress::ActiveModel {
            user_id: Set(user_id),
            mission_id: Set(mission.id),
            mission_date: Set(mission.mission_date),
            progress: Set(0),
            completed: Set(false),
            claimed: Set(false),
            ..Default::default()
        }
        .insert(&self.pool)
        .await;
        match inserted {
            Ok(m) => Ok(m),
            // 并发创建撞唯一索引：读回已存在的行
            Err(_) => progress::Entity::find()
                .filter(progress::Column::UserId.eq(user_id))
                .filter(progress::Column::MissionId.eq(mission.id))
                .one(&self.pool)
                .await?
                .ok_or_else(|| {
                    AppError::InternalError("Progress row vanished after insert conflict".into())
                }),
        }
    }

    async fn all_claimed_today(&self, user_id: i64, date: NaiveDate) -> AppResult<bool> {
        let todays = missions::Entity::find()
            .filter(missions::Column::MissionDate.eq(date))
            .all(&self.pool)
            .await?;
        if todays.is_empty() {
            return Ok(false);
        }
        let ids: Vec<i64> = todays.iter().map(|m| m.id).collect();
        let claimed = progress::Entity::find()
            .filter(progress::Column::UserId.eq(user_id))
            .filter(progress::Column::MissionId.is_in(ids))
            .filter(progress::Column::Claimed.eq(true))
            .all(&self.pool)
            .await?;
        Ok(claimed.len() == todays.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_template_pool;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_streak_bonus_floor() {
        // 50 * 3 * 0.1 = 15
        assert_eq!(streak_bonus(50, 3), 15);
        // 25 * 3 * 0.1 = 7.5 → 7
        assert_eq!(streak_bonus(25, 3), 7);
        assert_eq!(streak_bonus(50, 0), 0);
    }

    #[test]
    fn test_weekly_bonus_due_at_full_weeks() {
        assert_eq!(weekly_bonus_due(7), Some(WEEKLY_STREAK_BONUS));
        assert_eq!(weekly_bonus_due(14), Some(WEEKLY_STREAK_BONUS));
        // 登录已推进过连续天数也必须发放：决策只依赖当前值
        assert_eq!(weekly_bonus_due(21), Some(WEEKLY_STREAK_BONUS));
    }

    #[test]
    fn test_weekly_bonus_not_due_between_weeks() {
        assert_eq!(weekly_bonus_due(0), None);
        assert_eq!(weekly_bonus_due(1), None);
        assert_eq!(weekly_bonus_due(6), None);
        assert_eq!(weekly_bonus_due(8), None);
    }

    #[test]
    fn test_apply_progress_clamps_to_requirement() {
        assert_eq!(apply_progress(3, 10, 5), Some((5, true)));
    }

    #[test]
    fn test_apply_progress_noop_when_no_change() {
        assert_eq!(apply_progress(5, 1, 5), None);
        assert_eq!(apply_progress(2, 0, 5), None);
        assert_eq!(apply_progress(2, -3, 5), None);
    }

    #[test]
    fn test_apply_progress_partial() {
        assert_eq!(apply_progress(1, 2, 5), Some((3, false)));
    }

    #[test]
    fn test_pick_templates_count_and_uniqueness() {
        let pool = default_template_pool();
        let mut rng = StdRng::seed_from_u64(7);
        let picked = pick_templates(&mut rng, &pool, &HashMap::new(), MISSIONS_PER_DAY);
        assert_eq!(picked.len(), MISSIONS_PER_DAY);
        let mut sorted = picked.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), MISSIONS_PER_DAY);
    }

    #[test]
    fn test_pick_templates_respects_weekly_cap() {
        let pool = default_template_pool();
        let mut counts = HashMap::new();
        // login 本周已生成到上限
        counts.insert(MissionType::Login, 2);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = pick_templates(&mut rng, &pool, &counts, MISSIONS_PER_DAY);
            assert!(
                picked
                    .iter()
                    .all(|&i| pool[i].mission_type != MissionType::Login),
                "capped template picked with seed {seed}"
            );
        }
    }

    #[test]
    fn test_pick_templates_skips_slots_when_pool_exhausted() {
        let pool = default_template_pool();
        // 所有类型都到达上限 → 没有可选模板
        let counts: HashMap<MissionType, i64> = pool
            .iter()
            .map(|t| (t.mission_type, t.max_weekly_occurrences as i64))
            .collect();
        let mut rng = StdRng::seed_from_u64(1);
        let picked = pick_templates(&mut rng, &pool, &counts, MISSIONS_PER_DAY);
        assert!(picked.is_empty());
    }
}
