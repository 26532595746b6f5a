use serde::Serialize;

use crate::{
  entity::{Customer, Transaction, TransactionStatus},
  prelude::*,
};

/// Sum of completed payments. Single currency is assumed.
pub fn total_revenue(transactions: &[Transaction]) -> f64 {
  transactions
    .iter()
    .filter(|tx| tx.status == TransactionStatus::Completed)
    .map(|tx| tx.amount)
    .sum()
}

/// Case-insensitive substring match on first name, last name or email.
pub fn search_customers<'c>(
  customers: &'c [Customer],
  term: &str,
) -> Vec<&'c Customer> {
  let term = term.trim().to_lowercase();
  customers
    .iter()
    .filter(|c| {
      c.first_name.to_lowercase().contains(&term)
        || c.last_name.to_lowercase().contains(&term)
        || c.email.to_lowercase().contains(&term)
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
  pub customers: usize,
  pub referrals: usize,
  pub bookings: usize,
  pub total_revenue: f64,
}

pub struct Stats<'a> {
  store: &'a Store,
}

impl<'a> Stats<'a> {
  pub fn new(store: &'a Store) -> Self {
    Self { store }
  }

  pub async fn overview(&self) -> Overview {
    let transactions = self.store.load_collection(keys::TRANSACTIONS).await;

    Overview {
      customers: self.store.load_collection(keys::CUSTOMERS).await.len(),
      referrals: self.store.load_collection(keys::REFERRALS).await.len(),
      bookings: self.store.load_collection(keys::BOOKINGS).await.len(),
      total_revenue: total_revenue(&transactions),
    }
  }
}
