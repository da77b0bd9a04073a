use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakState {
    pub current: i32,
    pub longest: i32,
}

/// 连续天数推进的纯计算。
/// - 无历史记录 → current = longest = 1
/// - 相差 1 天 → current + 1，longest 取较大值
/// - 相差超过 1 天 → 断签，current 重置为 1
/// - 同一天 → None（今日已推进，无操作）
fn compute(
    last: Option<NaiveDate>,
    today: NaiveDate,
    current: i32,
    longest: i32,
) -> Option<(i32, i32)> {
    match last {
        None => Some((1, longest.max(1))),
        Some(last) => {
            let days = (today - last).num_days();
            if days == 0 {
                None
            } else if days == 1 {
                let next = current + 1;
                Some((next, longest.max(next)))
            } else {
                // days < 0 只在时钟回拨时出现，同样按断签重置处理
                Some((1, longest.max(1)))
            }
        }
    }
}

#[derive(Clone)]
pub struct StreakService {
    pool: DatabaseConnection,
}

impl StreakService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 推进用户的连续天数并回写 last_login_date。
    /// 写入以读取到的 last_login_date 为条件，两个并发推进只有一个生效，
    /// 失败的一方直接返回已推进后的状态。
    pub async fn advance(&self, user_id: i64) -> AppResult<StreakState> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let today = Utc::now().date_naive();
        let Some((current, longest)) = compute(
            user.last_login_date,
            today,
            user.streak_current,
            user.streak_longest,
        ) else {
            return Ok(StreakState {
                current: user.streak_current,
                longest: user.streak_longest,
            });
        };

        let mut update = users::Entity::update_many()
            .col_expr(users::Column::StreakCurrent, Expr::value(current))
            .col_expr(users::Column::StreakLongest, Expr::value(longest))
            .col_expr(users::Column::LastLoginDate, Expr::value(today))
            .filter(users::Column::Id.eq(user_id));
        update = match user.last_login_date {
            Some(d) => update.filter(users::Column::LastLoginDate.eq(d)),
            None => update.filter(users::Column::LastLoginDate.is_null()),
        };
        let res = update.exec(&self.pool).await?;

        if res.rows_affected == 0 {
            // 另一个并发请求已推进，读回最新值
            let fresh = users::Entity::find_by_id(user_id)
                .one(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            return Ok(StreakState {
                current: fresh.streak_current,
                longest: fresh.streak_longest,
            });
        }

        Ok(StreakState { current, longest })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_first_advance() {
        assert_eq!(compute(None, d(2026, 8, 25), 0, 0), Some((1, 1)));
    }

    #[test]
    fn test_consecutive_day_increments() {
        assert_eq!(
            compute(Some(d(2026, 8, 24)), d(2026, 8, 25), 3, 5),
            Some((4, 5))
        );
    }

    #[test]
    fn test_longest_never_decreases() {
        assert_eq!(
            compute(Some(d(2026, 8, 24)), d(2026, 8, 25), 5, 5),
            Some((6, 6))
        );
        // 断签重置也不会降低 longest
        assert_eq!(
            compute(Some(d(2026, 8, 20)), d(2026, 8, 25), 5, 9),
            Some((1, 9))
        );
    }

    #[test]
    fn test_skipped_day_resets() {
        assert_eq!(
            compute(Some(d(2026, 8, 23)), d(2026, 8, 25), 6, 6),
            Some((1, 6))
        );
    }

    #[test]
    fn test_same_day_noop() {
        assert_eq!(compute(Some(d(2026, 8, 25)), d(2026, 8, 25), 4, 6), None);
    }
}
