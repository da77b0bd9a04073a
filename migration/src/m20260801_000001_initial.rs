use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    LastLoginIp,
    Xp,
    PostCount,
    ReplyCount,
    Points,
    AchievementPoints,
    ReferralPoints,
    TotalReferrals,
    StreakCurrent,
    StreakLongest,
    LastLoginDate,
    ReferralCode,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Achievements {
    Table,
    Id,
    Name,
    Description,
    RequirementType,
    RequirementValue,
    SpecialKey,
    Points,
    RewardKind,
    RewardRef,
    Rarity,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserAchievements {
    Table,
    Id,
    UserId,
    AchievementId,
    UnlockedAt,
}

#[derive(DeriveIden)]
enum DailyMissions {
    Table,
    Id,
    MissionType,
    Description,
    RequirementValue,
    CategoryId,
    RewardPoints,
    RewardXp,
    MissionDate,
    Slot,
    ExpiresAt,
    YearWeek,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MissionProgress {
    Table,
    Id,
    UserId,
    MissionId,
    MissionDate,
    Progress,
    Completed,
    CompletedAt,
    Claimed,
    ClaimedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Referrals {
    Table,
    Id,
    ReferrerId,
    ReferredId,
    ReferralCode,
    PointsAwarded,
    Status,
    CompletedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UserRewards {
    Table,
    Id,
    UserId,
    RewardKind,
    RewardRef,
    GrantedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Message,
    Link,
    IsRead,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // enums
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("requirement_type"))
                    .values(vec![
                        Alias::new("xp"),
                        Alias::new("posts"),
                        Alias::new("replies"),
                        Alias::new("referrals"),
                        Alias::new("special"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("achievement_rarity"))
                    .values(vec![
                        Alias::new("common"),
                        Alias::new("rare"),
                        Alias::new("epic"),
                        Alias::new("legendary"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("mission_type"))
                    .values(vec![
                        Alias::new("create_posts"),
                        Alias::new("create_replies"),
                        Alias::new("earn_xp"),
                        Alias::new("give_likes"),
                        Alias::new("visit_category"),
                        Alias::new("login"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("referral_status"))
                    .values(vec![
                        Alias::new("pending"),
                        Alias::new("completed"),
                        Alias::new("cancelled"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("reward_kind"))
                    .values(vec![
                        Alias::new("badge"),
                        Alias::new("title"),
                        Alias::new("theme"),
                        Alias::new("frame"),
                        Alias::new("emoji"),
                    ])
                    .to_owned(),
            )
            .await?;

        // 用户表（进度相关数值字段，计数与积分均非负，由账本层钳制）
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string_len(50).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(255).null())
                    .col(ColumnDef::new(Users::LastLoginIp).string_len(45).null())
                    .col(
                        ColumnDef::new(Users::Xp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::PostCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::ReplyCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::Points)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::AchievementPoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::ReferralPoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::TotalReferrals)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::StreakCurrent)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::StreakLongest)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Users::LastLoginDate).date().null())
                    .col(ColumnDef::new(Users::ReferralCode).string_len(20).null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 推荐码唯一（NULL 除外）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_referral_code_unique")
                    .table(Users::Table)
                    .col(Users::ReferralCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 成就定义表
        manager
            .create_table(
                Table::create()
                    .table(Achievements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Achievements::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Achievements::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Achievements::Description).text().not_null())
                    .col(
                        ColumnDef::new(Achievements::RequirementType)
                            .custom(Alias::new("requirement_type"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Achievements::RequirementValue)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Achievements::SpecialKey).string_len(50).null())
                    .col(
                        ColumnDef::new(Achievements::Points)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Achievements::RewardKind)
                            .custom(Alias::new("reward_kind"))
                            .null(),
                    )
                    .col(ColumnDef::new(Achievements::RewardRef).string_len(100).null())
                    .col(
                        ColumnDef::new(Achievements::Rarity)
                            .custom(Alias::new("achievement_rarity"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Achievements::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Achievements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Achievements::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 种子数据按名称幂等插入，名称必须唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_achievements_name_unique")
                    .table(Achievements::Table)
                    .col(Achievements::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 用户成就解锁表
        manager
            .create_table(
                Table::create()
                    .table(UserAchievements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserAchievements::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserAchievements::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAchievements::AchievementId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserAchievements::UnlockedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一成就每用户只解锁一次（幂等解锁依赖该约束）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_achievements_unique")
                    .table(UserAchievements::Table)
                    .col(UserAchievements::UserId)
                    .col(UserAchievements::AchievementId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 每日任务表
        manager
            .create_table(
                Table::create()
                    .table(DailyMissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyMissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DailyMissions::MissionType)
                            .custom(Alias::new("mission_type"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(DailyMissions::Description).text().not_null())
                    .col(
                        ColumnDef::new(DailyMissions::RequirementValue)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DailyMissions::CategoryId).big_integer().null())
                    .col(
                        ColumnDef::new(DailyMissions::RewardPoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyMissions::RewardXp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(DailyMissions::MissionDate).date().not_null())
                    .col(
                        ColumnDef::new(DailyMissions::Slot)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyMissions::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DailyMissions::YearWeek).integer().not_null())
                    .col(
                        ColumnDef::new(DailyMissions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 并发生成兜底：同一天同一槽位只落一行
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_daily_missions_date_slot_unique")
                    .table(DailyMissions::Table)
                    .col(DailyMissions::MissionDate)
                    .col(DailyMissions::Slot)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 周上限统计走此索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_daily_missions_year_week")
                    .table(DailyMissions::Table)
                    .col(DailyMissions::YearWeek)
                    .to_owned(),
            )
            .await?;

        // 任务进度表
        manager
            .create_table(
                Table::create()
                    .table(MissionProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MissionProgress::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MissionProgress::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MissionProgress::MissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MissionProgress::MissionDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MissionProgress::Progress)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MissionProgress::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(MissionProgress::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MissionProgress::Claimed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(MissionProgress::ClaimedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MissionProgress::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(MissionProgress::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 每用户每任务一行
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_mission_progress_unique")
                    .table(MissionProgress::Table)
                    .col(MissionProgress::UserId)
                    .col(MissionProgress::MissionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_mission_progress_user_date")
                    .table(MissionProgress::Table)
                    .col(MissionProgress::UserId)
                    .col(MissionProgress::MissionDate)
                    .to_owned(),
            )
            .await?;

        // 推荐表
        manager
            .create_table(
                Table::create()
                    .table(Referrals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Referrals::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Referrals::ReferrerId).big_integer().not_null())
                    .col(ColumnDef::new(Referrals::ReferredId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Referrals::ReferralCode)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Referrals::PointsAwarded)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Referrals::Status)
                            .custom(Alias::new("referral_status"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Referrals::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Referrals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个账号终身只能应用一次推荐码
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_referrals_referred_unique")
                    .table(Referrals::Table)
                    .col(Referrals::ReferredId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_referrals_referrer")
                    .table(Referrals::Table)
                    .col(Referrals::ReferrerId)
                    .to_owned(),
            )
            .await?;

        // 用户装饰奖励表
        manager
            .create_table(
                Table::create()
                    .table(UserRewards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserRewards::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserRewards::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(UserRewards::RewardKind)
                            .custom(Alias::new("reward_kind"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserRewards::RewardRef)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserRewards::GrantedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一奖励每用户最多持有一份（幂等发放依赖该约束）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_rewards_unique")
                    .table(UserRewards::Table)
                    .col(UserRewards::UserId)
                    .col(UserRewards::RewardRef)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 版块表
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Categories::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_categories_name_unique")
                    .table(Categories::Table)
                    .col(Categories::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 通知表
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    .col(ColumnDef::new(Notifications::Link).string_len(255).null())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notifications_user")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：从属表 -> 定义表 -> 用户表 -> 枚举类型
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(Notifications::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(UserRewards::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Referrals::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(MissionProgress::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(DailyMissions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(UserAchievements::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(Achievements::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;

        for ty in [
            "reward_kind",
            "referral_status",
            "mission_type",
            "achievement_rarity",
            "requirement_type",
        ] {
            manager
                .drop_type(Type::drop().if_exists().name(Alias::new(ty)).to_owned())
                .await?;
        }

        Ok(())
    }
}
