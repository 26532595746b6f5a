use serde::{Deserialize, Serialize};

/// Password hash of a customer, kept apart from the profile record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
  pub customer_id: String,
  pub password_hash: String,
}
