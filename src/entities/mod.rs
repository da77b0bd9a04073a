pub mod achievements;
pub mod categories;
pub mod daily_missions;
pub mod mission_progress;
pub mod notifications;
pub mod referrals;
pub mod user_achievements;
pub mod user_rewards;
pub mod users;

pub use achievements as achievement_entity;
pub use categories as category_entity;
pub use daily_missions as daily_mission_entity;
pub use mission_progress as mission_progress_entity;
pub use notifications as notification_entity;
pub use referrals as referral_entity;
pub use user_achievements as user_achievement_entity;
pub use user_rewards as user_reward_entity;
pub use users as user_entity;

pub use achievements::{AchievementRarity, RequirementType};
pub use daily_missions::MissionType;
pub use referrals::ReferralStatus;
pub use user_rewards::RewardKind;
