use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
  Low,
  #[default]
  Medium,
  High,
}

impl Priority {
  /// Sort rank, most urgent first
  pub fn rank(self) -> u8 {
    match self {
      Priority::High => 0,
      Priority::Medium => 1,
      Priority::Low => 2,
    }
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
  Priority,
  #[default]
  Date,
  Title,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOption {
  #[default]
  All,
  Completed,
  Active,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  pub id: String,
  pub title: String,
  pub description: String,
  pub completed: bool,
  pub created_at: DateTime,
  pub priority: Priority,
}
