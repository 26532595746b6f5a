use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub id: String,
  pub recipient_id: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub title: String,
  pub message: String,
  #[serde(default)]
  pub data: json::Value,
  pub read: bool,
  pub created_at: DateTime,
  pub sent_via_email: bool,
  pub sent_via_push: bool,
}
