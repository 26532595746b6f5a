use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Audit record of a manual change made by an admin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAction {
  pub id: String,
  pub admin_id: String,
  pub customer_id: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub value: f64,
  pub reason: String,
  pub created_at: DateTime,
  #[serde(default)]
  pub related_transaction_id: Option<String>,
}
