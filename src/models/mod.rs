pub mod achievement;
pub mod common;
pub mod events;
pub mod mission;
pub mod notification;
pub mod referral;
pub mod reward;

pub use achievement::*;
pub use common::*;
pub use events::*;
pub use mission::*;
pub use notification::*;
pub use referral::*;
pub use reward::*;
