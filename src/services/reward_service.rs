use crate::entities::{RewardKind, user_reward_entity as ur};
use crate::error::{AppError, AppResult};
use crate::models::{
    OwnedRewardResponse, PurchaseRewardResponse, RewardCatalogItem,
};
use crate::services::{BalanceField, PointsService};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct RewardService {
    pool: DatabaseConnection,
    points_service: PointsService,
    catalog: Arc<Vec<RewardCatalogItem>>,
}

impl RewardService {
    pub fn new(
        pool: DatabaseConnection,
        points_service: PointsService,
        catalog: Vec<RewardCatalogItem>,
    ) -> Self {
        Self {
            pool,
            points_service,
            catalog: Arc::new(catalog),
        }
    }

    /// 幂等发放：已拥有时返回 false（不视为错误）。
    /// 通过 (user_id, reward_ref) 唯一索引 + DO NOTHING 容忍并发重复触发。
    pub async fn grant(
        &self,
        user_id: i64,
        kind: RewardKind,
        reward_ref: &str,
    ) -> AppResult<bool> {
        let rows = ur::Entity::insert(ur::ActiveModel {
            user_id: Set(user_id),
            reward_kind: Set(kind),
            reward_ref: Set(reward_ref.to_string()),
            granted_at: Set(Utc::now()),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([ur::Column::UserId, ur::Column::RewardRef])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.pool)
        .await?;
        Ok(rows > 0)
    }

    /// 用户拥有的装饰奖励清单
    pub async fn inventory(&self, user_id: i64) -> AppResult<Vec<OwnedRewardResponse>> {
        let list = ur::Entity::find()
            .filter(ur::Column::UserId.eq(user_id))
            .order_by_asc(ur::Column::GrantedAt)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 商店购买：
    /// 1. 目录校验
    /// 2. 已拥有则拒绝（不扣分）
    /// 3. 条件扣分（余额不足时整体失败，无部分生效）
    /// 4. 幂等发放；若并发下另一请求先发放成功，则退回扣掉的积分
    pub async fn purchase(
        &self,
        user_id: i64,
        reward_ref: &str,
    ) -> AppResult<PurchaseRewardResponse> {
        let item = self
            .catalog
            .iter()
            .find(|i| i.reward_ref == reward_ref)
            .ok_or_else(|| AppError::NotFound("Unknown reward".to_string()))?
            .clone();

        let owned = ur::Entity::find()
            .filter(ur::Column::UserId.eq(user_id))
            .filter(ur::Column::RewardRef.eq(reward_ref))
            .one(&self.pool)
            .await?;
        if owned.is_some() {
            return Err(AppError::PreconditionFailed(
                "Reward already owned".to_string(),
            ));
        }

        let remaining = self.points_service.try_spend(user_id, item.cost).await?;

        let granted = self.grant(user_id, item.kind, reward_ref).await?;
        if !granted {
            // 两个并发购买同时通过了已拥有检查：只保留先落库的那次，退款
            log::warn!(
                "Concurrent purchase of {reward_ref} by user {user_id}, refunding {}",
                item.cost
            );
            let refunded = self
                .points_service
                .adjust(user_id, BalanceField::Points, item.cost)
                .await?;
            return Ok(PurchaseRewardResponse {
                reward_ref: reward_ref.to_string(),
                cost: 0,
                points_remaining: refunded,
            });
        }

        Ok(PurchaseRewardResponse {
            reward_ref: reward_ref.to_string(),
            cost: item.cost,
            points_remaining: remaining,
        })
    }
}
