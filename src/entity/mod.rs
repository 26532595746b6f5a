pub mod admin_action;
pub mod booking;
pub mod business;
pub mod credential;
pub mod customer;
pub mod kv;
pub mod notification;
pub mod qr_code;
pub mod referral;
pub mod task;
pub mod transaction;

pub use admin_action::AdminAction;
pub use booking::{Booking, BookingStatus, PaymentStatus};
pub use business::{BusinessInfo, Contact, Service, WorkingHour};
pub use credential::Credential;
pub use customer::{Customer, Role};
pub use notification::Notification;
pub use qr_code::QrCode;
pub use referral::{Referral, ReferralTransaction};
pub use task::{FilterOption, Priority, SortOption, Task};
pub use transaction::{PaymentMethod, Transaction, TransactionStatus};

/// Fresh record id, unique within any collection.
pub fn new_id() -> String {
  uuid::Uuid::new_v4().to_string()
}
