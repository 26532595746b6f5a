use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Shareable referral link of one customer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
  pub id: String,
  pub customer_id: String,
  pub url: String,
  pub image_url: String,
  pub created_at: DateTime,
  pub scans_count: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub last_scanned: Option<DateTime>,
}
