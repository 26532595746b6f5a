use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
  pub id: String,
  pub name: String,
  pub description: String,
  pub services: Vec<Service>,
  pub contact: Contact,
  pub working_hours: Vec<WorkingHour>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub logo: Option<String>,
}

impl BusinessInfo {
  pub fn service(&self, id: &str) -> Option<&Service> {
    self.services.iter().find(|service| service.id == id)
  }
}

/// Bookable offering. `duration` is in minutes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Service {
  pub id: String,
  pub name: String,
  pub price: f64,
  pub duration: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contact {
  pub phone: String,
  pub email: String,
  pub address: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkingHour {
  pub day: String,
  pub from: String,
  pub to: String,
}
