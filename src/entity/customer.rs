use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  Customer,
  Admin,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
  pub id: String,
  pub email: String,
  pub first_name: String,
  pub last_name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub age: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub occupation: Option<String>,
  pub created_at: DateTime,
  pub updated_at: DateTime,
  pub is_verified: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub qr_code_url: Option<String>,
  pub free_hours: f64,
  #[serde(default)]
  pub referrer_id: Option<String>,
  pub role: Role,
}

impl Customer {
  /// Emails are compared case-insensitively everywhere.
  pub fn has_email(&self, email: &str) -> bool {
    self.email.to_lowercase() == email.trim().to_lowercase()
  }

  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}
