use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, EntityTrait, Statement};

/// 可通过账本调整的用户数值字段。
/// 所有进度相关的数值写入都必须经过 PointsService，
/// 避免应用层 read-modify-write 在并发下丢失更新。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceField {
    Xp,
    PostCount,
    ReplyCount,
    Points,
    AchievementPoints,
    ReferralPoints,
    TotalReferrals,
}

impl BalanceField {
    fn column(&self) -> &'static str {
        match self {
            BalanceField::Xp => "xp",
            BalanceField::PostCount => "post_count",
            BalanceField::ReplyCount => "reply_count",
            BalanceField::Points => "points",
            BalanceField::AchievementPoints => "achievement_points",
            BalanceField::ReferralPoints => "referral_points",
            BalanceField::TotalReferrals => "total_referrals",
        }
    }
}

#[derive(Clone)]
pub struct PointsService {
    pool: DatabaseConnection,
}

impl PointsService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 原子调整单个数值字段，返回调整后的值。
    /// 负向调整在数据库侧用 GREATEST 钳制到 0，余额永不为负。
    pub async fn adjust(
        &self,
        user_id: i64,
        field: BalanceField,
        delta: i64,
    ) -> AppResult<i64> {
        let col = field.column();
        let sql = format!(
            "UPDATE users SET {col} = GREATEST({col} + $1, 0), updated_at = NOW() \
             WHERE id = $2 RETURNING {col} AS value"
        );
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            sql,
            [delta.into(), user_id.into()],
        );
        let row = self
            .pool
            .query_one(stmt)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let value: i64 = row.try_get("", "value")?;
        Ok(value)
    }

    /// 条件扣减可消费积分：余额不足时不做任何修改。
    /// WHERE points >= cost 保证并发下不会扣成负数。
    pub async fn try_spend(&self, user_id: i64, cost: i64) -> AppResult<i64> {
        if cost <= 0 {
            return Err(AppError::ValidationError(
                "Cost must be positive".to_string(),
            ));
        }
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "UPDATE users SET points = points - $1, updated_at = NOW() \
             WHERE id = $2 AND points >= $1 RETURNING points AS value",
            [cost.into(), user_id.into()],
        );
        match self.pool.query_one(stmt).await? {
            Some(row) => {
                let value: i64 = row.try_get("", "value")?;
                Ok(value)
            }
            None => {
                // 区分用户不存在与余额不足
                let exists = users::Entity::find_by_id(user_id).one(&self.pool).await?;
                match exists {
                    Some(_) => Err(AppError::PreconditionFailed(
                        "Insufficient points".to_string(),
                    )),
                    None => Err(AppError::NotFound("User not found".to_string())),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_field_column_mapping() {
        assert_eq!(BalanceField::Xp.column(), "xp");
        assert_eq!(BalanceField::PostCount.column(), "post_count");
        assert_eq!(BalanceField::ReplyCount.column(), "reply_count");
        assert_eq!(BalanceField::Points.column(), "points");
        assert_eq!(
            BalanceField::AchievementPoints.column(),
            "achievement_points"
        );
        // 推荐结算入账走的两个字段
        assert_eq!(BalanceField::ReferralPoints.column(), "referral_points");
        assert_eq!(BalanceField::TotalReferrals.column(), "total_referrals");
    }
}
