use serde::Serialize;

use crate::{
  entity::{AdminAction, BookingStatus, Customer, PaymentStatus, new_id},
  prelude::*,
  sv::stats,
};

/// Referral aggregate resolved to display names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRow {
  pub id: String,
  pub referrer_name: String,
  pub referrer_email: Option<String>,
  pub referred_name: String,
  pub referred_email: Option<String>,
  pub created_at: DateTime,
  pub total_paid: f64,
  pub total_free_hours: f64,
  pub transactions: usize,
}

/// Booking resolved to its customer and service for the admin listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRow {
  pub id: String,
  pub date: DateTime,
  pub customer_name: String,
  pub service_id: String,
  pub service_name: Option<String>,
  pub duration: u32,
  pub price: f64,
  pub status: BookingStatus,
  pub payment_status: PaymentStatus,
}

pub struct Admin<'a> {
  store: &'a Store,
}

impl<'a> Admin<'a> {
  pub fn new(store: &'a Store) -> Self {
    Self { store }
  }

  pub async fn customers(&self, term: &str) -> Vec<Customer> {
    let customers = self.store.load_collection(keys::CUSTOMERS).await;
    stats::search_customers(&customers, term).into_iter().cloned().collect()
  }

  pub async fn booking_rows(&self) -> Vec<BookingRow> {
    let customers = self.store.load_collection(keys::CUSTOMERS).await;
    let info = self.store.load_singleton(keys::BUSINESS_INFO).await;

    self
      .store
      .load_collection(keys::BOOKINGS)
      .await
      .into_iter()
      .map(|b| BookingRow {
        customer_name: customers
          .iter()
          .find(|c| c.id == b.customer_id)
          .map(Customer::full_name)
          .unwrap_or_else(|| "Unknown".into()),
        service_name: info
          .as_ref()
          .and_then(|info| info.service(&b.service_id))
          .map(|s| s.name.clone()),
        id: b.id,
        date: b.date,
        service_id: b.service_id,
        duration: b.duration,
        price: b.price,
        status: b.status,
        payment_status: b.payment_status,
      })
      .collect()
  }

  pub async fn referral_rows(&self) -> Vec<ReferralRow> {
    let customers = self.store.load_collection(keys::CUSTOMERS).await;
    let find = |id: &str| customers.iter().find(|c| c.id == id);
    let name = |c: Option<&Customer>| {
      c.map(Customer::full_name).unwrap_or_else(|| "Unknown".into())
    };

    self
      .store
      .load_collection(keys::REFERRALS)
      .await
      .into_iter()
      .map(|r| {
        let referrer = find(&r.referrer_id);
        let referred = find(&r.referred_id);
        ReferralRow {
          referrer_name: name(referrer),
          referrer_email: referrer.map(|c| c.email.clone()),
          referred_name: name(referred),
          referred_email: referred.map(|c| c.email.clone()),
          created_at: r.created_at,
          total_paid: r.total_paid,
          total_free_hours: r.total_free_hours,
          transactions: r.transactions.len(),
          id: r.id,
        }
      })
      .collect()
  }

  /// Manually grants (or revokes, with a negative delta) free hours.
  pub async fn adjust_free_hours(
    &self,
    admin: &Customer,
    customer_id: &str,
    delta: f64,
    reason: &str,
  ) -> Result<Customer> {
    if !admin.is_admin() {
      warn!("Non-admin {} tried to adjust free hours", admin.id);
      return Err(Error::Forbidden);
    }
    if !delta.is_finite() || delta == 0.0 {
      return Err(Error::InvalidArgs("Delta must be a non-zero number".into()));
    }

    let _guard = self.store.lock().await;
    let mut customers = self.store.load_collection(keys::CUSTOMERS).await;
    let customer = customers
      .iter_mut()
      .find(|c| c.id == customer_id)
      .ok_or(Error::CustomerNotFound)?;

    if customer.free_hours + delta < 0.0 {
      return Err(Error::InsufficientFreeHours);
    }

    customer.free_hours += delta;
    customer.updated_at = Utc::now();
    let customer = customer.clone();
    self.store.save_collection(keys::CUSTOMERS, &customers).await;

    let mut actions = self.store.load_collection(keys::ADMIN_ACTIONS).await;
    actions.push(AdminAction {
      id: new_id(),
      admin_id: admin.id.clone(),
      customer_id: customer.id.clone(),
      kind: "free_hours_adjustment".into(),
      value: delta,
      reason: reason.to_string(),
      created_at: Utc::now(),
      related_transaction_id: None,
    });
    self.store.save_collection(keys::ADMIN_ACTIONS, &actions).await;

    info!(
      "Admin {} adjusted free hours of {} by {delta}: {reason}",
      admin.id, customer.id
    );
    Ok(customer)
  }
}
