pub mod admin;
pub mod auth;
pub mod booking;
pub mod referral;
pub mod seed;
pub mod stats;
pub mod task;
#[cfg(test)]
pub mod test_utils;

pub use admin::Admin;
pub use auth::{Auth, Session};
pub use booking::Bookings;
pub use referral::Referrals;
pub use stats::Stats;
pub use task::Tasks;
