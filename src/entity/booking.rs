use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
  Confirmed,
  #[default]
  Pending,
  Cancelled,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Paid,
  #[default]
  Unpaid,
  Free,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
  pub id: String,
  pub customer_id: String,
  pub service_id: String,
  pub date: DateTime,
  /// Minutes
  pub duration: u32,
  pub status: BookingStatus,
  pub payment_status: PaymentStatus,
  pub created_at: DateTime,
  pub updated_at: DateTime,
  pub price: f64,
  /// Snapshot of the customer's referrer at booking time
  #[serde(default)]
  pub referrer_id: Option<String>,
}
