pub mod achievement_service;
pub mod mission_service;
pub mod notification_service;
pub mod points_service;
pub mod progression_service;
pub mod referral_service;
pub mod reward_service;
pub mod streak_service;

pub use achievement_service::*;
pub use mission_service::*;
pub use notification_service::*;
pub use points_service::*;
pub use progression_service::*;
pub use referral_service::*;
pub use reward_service::*;
pub use streak_service::*;
