use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
  #[default]
  Completed,
  Pending,
  Failed,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
  #[default]
  Card,
  Cash,
  Free,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
  pub id: String,
  pub customer_id: String,
  pub booking_id: String,
  pub amount: f64,
  pub currency: String,
  pub status: TransactionStatus,
  pub payment_method: PaymentMethod,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub stripe_payment_id: Option<String>,
  pub created_at: DateTime,
  #[serde(default)]
  pub referrer_id: Option<String>,
  /// Referral kickback in money units
  pub reward_amount: f64,
  /// Referral kickback converted to free hours
  pub reward_hours: f64,
}
