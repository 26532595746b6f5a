use serde::{Deserialize, Serialize};

use crate::{entity::new_id, prelude::*};

/// Aggregate for one (referrer, referred) pair.
///
/// `total_paid` and `total_free_hours` always equal the sums over
/// `transactions`; mutate through [`Referral::record`] to keep it so.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
  pub id: String,
  pub referrer_id: String,
  pub referred_id: String,
  pub created_at: DateTime,
  pub total_paid: f64,
  pub total_free_hours: f64,
  pub transactions: Vec<ReferralTransaction>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralTransaction {
  pub booking_id: String,
  pub date: DateTime,
  pub amount: f64,
  pub free_hours_earned: f64,
}

impl Referral {
  pub fn new(referrer_id: &str, referred_id: &str) -> Self {
    Self {
      id: new_id(),
      referrer_id: referrer_id.to_string(),
      referred_id: referred_id.to_string(),
      created_at: Utc::now(),
      total_paid: 0.0,
      total_free_hours: 0.0,
      transactions: Vec::new(),
    }
  }

  pub fn is_between(&self, referrer_id: &str, referred_id: &str) -> bool {
    self.referrer_id == referrer_id && self.referred_id == referred_id
  }

  pub fn record(&mut self, line: ReferralTransaction) {
    self.transactions.push(line);
    self.recompute_totals();
  }

  pub fn recompute_totals(&mut self) {
    let (paid, hours) = self.sums();
    self.total_paid = paid;
    self.total_free_hours = hours;
  }

  pub fn is_consistent(&self) -> bool {
    const EPS: f64 = 1e-9;

    let (paid, hours) = self.sums();
    (self.total_paid - paid).abs() < EPS
      && (self.total_free_hours - hours).abs() < EPS
  }

  fn sums(&self) -> (f64, f64) {
    self.transactions.iter().fold((0.0, 0.0), |(paid, hours), line| {
      (paid + line.amount, hours + line.free_hours_earned)
    })
  }
}
