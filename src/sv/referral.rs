use serde::{Deserialize, Serialize};

use crate::{
  entity::{Notification, QrCode, Referral, ReferralTransaction, new_id},
  prelude::*,
  utils,
};

const QR_IMAGE_API: &str =
  "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data=";

/// How a referred customer's payment turns into the referrer's reward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardPolicy {
  /// Share of each paid amount credited to the referrer
  pub percent: f64,
  /// Reward money units that make up one free hour
  pub unit_per_hour: f64,
}

impl Default for RewardPolicy {
  fn default() -> Self {
    Self { percent: 5.0, unit_per_hour: 50.0 }
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Reward {
  pub amount: f64,
  pub hours: f64,
}

impl RewardPolicy {
  pub fn reward(&self, paid: f64) -> Reward {
    let amount = paid * self.percent / 100.0;
    Reward { amount, hours: amount / self.unit_per_hour }
  }
}

/// Per-referrer aggregate over all of their referrals.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferrerTotals {
  pub referred: usize,
  pub total_paid: f64,
  pub total_free_hours: f64,
}

pub fn referrals_for(customer_id: &str, all: &[Referral]) -> Vec<Referral> {
  all.iter().filter(|r| r.referrer_id == customer_id).cloned().collect()
}

pub fn totals_for(customer_id: &str, all: &[Referral]) -> ReferrerTotals {
  all.iter().filter(|r| r.referrer_id == customer_id).fold(
    ReferrerTotals::default(),
    |acc, r| ReferrerTotals {
      referred: acc.referred + 1,
      total_paid: acc.total_paid + r.total_paid,
      total_free_hours: acc.total_free_hours + r.total_free_hours,
    },
  )
}

pub struct Referrals<'a> {
  store: &'a Store,
}

impl<'a> Referrals<'a> {
  pub fn new(store: &'a Store) -> Self {
    Self { store }
  }

  pub async fn for_customer(&self, customer_id: &str) -> Vec<Referral> {
    let all = self.store.load_collection(keys::REFERRALS).await;
    referrals_for(customer_id, &all)
  }

  pub async fn totals(&self, customer_id: &str) -> ReferrerTotals {
    let all = self.store.load_collection(keys::REFERRALS).await;
    totals_for(customer_id, &all)
  }

  /// Opens the aggregate for a pair, or returns the one already open.
  pub async fn link(&self, referrer_id: &str, referred_id: &str) -> Referral {
    let _guard = self.store.lock().await;
    let mut referrals = self.store.load_collection(keys::REFERRALS).await;

    if let Some(existing) =
      referrals.iter().find(|r| r.is_between(referrer_id, referred_id))
    {
      return existing.clone();
    }

    let referral = Referral::new(referrer_id, referred_id);
    referrals.push(referral.clone());
    self.store.save_collection(keys::REFERRALS, &referrals).await;

    debug!("Referral {referrer_id} -> {referred_id} opened");
    referral
  }

  /// Appends a paid booking to the pair's aggregate and notifies the
  /// referrer. Crediting the referrer's free hours is up to the caller.
  pub async fn credit(
    &self,
    referrer_id: &str,
    referred_id: &str,
    line: ReferralTransaction,
  ) -> Referral {
    let _guard = self.store.lock().await;
    let mut referrals = self.store.load_collection(keys::REFERRALS).await;

    let idx = match referrals
      .iter()
      .position(|r| r.is_between(referrer_id, referred_id))
    {
      Some(idx) => idx,
      None => {
        referrals.push(Referral::new(referrer_id, referred_id));
        referrals.len() - 1
      }
    };

    let hours = line.free_hours_earned;
    let booking_id = line.booking_id.clone();
    referrals[idx].record(line);
    let referral = referrals[idx].clone();
    debug_assert!(referral.is_consistent());
    self.store.save_collection(keys::REFERRALS, &referrals).await;

    let mut notifications =
      self.store.load_collection(keys::NOTIFICATIONS).await;
    notifications.push(Notification {
      id: new_id(),
      recipient_id: referrer_id.to_string(),
      kind: "reward_earned".into(),
      title: "Reward earned".into(),
      message: format!(
        "You earned {} free hours from a referral",
        utils::format_hours(hours)
      ),
      data: json::json!({
        "referralId": referral.id,
        "bookingId": booking_id,
        "freeHours": hours,
      }),
      read: false,
      created_at: Utc::now(),
      sent_via_email: false,
      sent_via_push: false,
    });
    self.store.save_collection(keys::NOTIFICATIONS, &notifications).await;

    info!("Referrer {referrer_id} earned {hours}h via {referred_id}");
    referral
  }

  /// Returns the customer's referral code, creating it on first use.
  pub async fn generate_qr(
    &self,
    customer_id: &str,
    base_url: &str,
  ) -> Result<QrCode> {
    let _guard = self.store.lock().await;
    let mut codes = self.store.load_collection(keys::QR_CODES).await;
    if let Some(code) = codes.iter().find(|c| c.customer_id == customer_id) {
      return Ok(code.clone());
    }

    let mut customers = self.store.load_collection(keys::CUSTOMERS).await;
    let customer = customers
      .iter_mut()
      .find(|c| c.id == customer_id)
      .ok_or(Error::CustomerNotFound)?;

    let url = format!("{base_url}/ref/{customer_id}");
    let code = QrCode {
      id: new_id(),
      customer_id: customer_id.to_string(),
      image_url: format!("{QR_IMAGE_API}{}", utils::percent_encode(&url)),
      url: url.clone(),
      created_at: Utc::now(),
      scans_count: 0,
      last_scanned: None,
    };

    customer.qr_code_url = Some(url);
    self.store.save_collection(keys::CUSTOMERS, &customers).await;

    codes.push(code.clone());
    self.store.save_collection(keys::QR_CODES, &codes).await;

    info!("QR code generated for {customer_id}");
    Ok(code)
  }

  pub async fn record_scan(&self, customer_id: &str) -> Result<QrCode> {
    let _guard = self.store.lock().await;
    let mut codes = self.store.load_collection(keys::QR_CODES).await;
    let code = codes
      .iter_mut()
      .find(|code| code.customer_id == customer_id)
      .ok_or(Error::QrCodeNotFound)?;

    code.scans_count += 1;
    code.last_scanned = Some(Utc::now());
    let code = code.clone();

    self.store.save_collection(keys::QR_CODES, &codes).await;
    Ok(code)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::fixtures;

  fn referral(referrer: &str, referred: &str, paid: &[f64]) -> Referral {
    let mut referral = Referral::new(referrer, referred);
    for amount in paid {
      referral.record(ReferralTransaction {
        booking_id: new_id(),
        date: Utc::now(),
        amount: *amount,
        free_hours_earned: amount / 1000.0,
      });
    }
    referral
  }

  #[test]
  fn test_default_reward_is_five_percent() {
    let policy = RewardPolicy::default();

    assert_eq!(policy.reward(500.0), Reward { amount: 25.0, hours: 0.5 });
    assert_eq!(policy.reward(600.0), Reward { amount: 30.0, hours: 0.6 });
    assert_eq!(policy.reward(0.0), Reward::default());
  }

  #[test]
  fn test_referrals_for_filters_by_referrer() {
    let all = vec![
      referral("john", "jane", &[500.0]),
      referral("jane", "mike", &[]),
      referral("john", "anna", &[300.0]),
    ];

    let johns = referrals_for("john", &all);

    assert_eq!(johns.len(), 2);
    assert!(johns.iter().all(|r| r.referrer_id == "john"));
    assert!(referrals_for("mike", &all).is_empty());
  }

  #[test]
  fn test_totals_for_sums_aggregates() {
    let all = vec![
      referral("john", "jane", &[500.0, 600.0]),
      referral("john", "anna", &[300.0]),
      referral("jane", "mike", &[1000.0]),
    ];

    let totals = totals_for("john", &all);

    assert_eq!(totals.referred, 2);
    assert_eq!(totals.total_paid, 1400.0);
    assert!((totals.total_free_hours - 1.4).abs() < 1e-9);
  }

  #[tokio::test]
  async fn test_link_is_idempotent() {
    let store = Store::memory();
    let referrals = Referrals::new(&store);

    let first = referrals.link("john", "jane").await;
    let second = referrals.link("john", "jane").await;

    assert_eq!(first.id, second.id);
    assert_eq!(store.load_collection(keys::REFERRALS).await.len(), 1);
  }

  #[tokio::test]
  async fn test_credit_records_line_and_notifies() {
    let store = Store::memory();
    let referrals = Referrals::new(&store);
    referrals.link("john", "jane").await;

    let referral = referrals
      .credit("john", "jane", ReferralTransaction {
        booking_id: "b1".into(),
        date: Utc::now(),
        amount: 500.0,
        free_hours_earned: 0.5,
      })
      .await;

    assert_eq!(referral.total_paid, 500.0);
    assert!(referral.is_consistent());
    assert_eq!(referrals.for_customer("john").await, vec![referral]);

    let notifications = store.load_collection(keys::NOTIFICATIONS).await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].recipient_id, "john");
    assert_eq!(notifications[0].kind, "reward_earned");
  }

  #[tokio::test]
  async fn test_generate_qr_once_per_customer() {
    let store = Store::memory();
    let (customer, _) = fixtures::register(&store, "john@example.com").await;
    let referrals = Referrals::new(&store);

    let code =
      referrals.generate_qr(&customer.id, "https://example.com").await.unwrap();
    let again =
      referrals.generate_qr(&customer.id, "https://example.com").await.unwrap();

    assert_eq!(code, again);
    assert_eq!(code.url, format!("https://example.com/ref/{}", customer.id));
    assert_eq!(
      code.image_url,
      format!(
        "{QR_IMAGE_API}https%3A%2F%2Fexample.com%2Fref%2F{}",
        customer.id
      )
    );
    assert_eq!(code.scans_count, 0);

    let stored = store.load_collection(keys::CUSTOMERS).await;
    assert_eq!(stored[0].qr_code_url.as_ref(), Some(&code.url));
  }

  #[tokio::test]
  async fn test_generate_qr_unknown_customer() {
    let store = Store::memory();

    let result =
      Referrals::new(&store).generate_qr("ghost", "https://example.com").await;

    assert!(matches!(result, Err(Error::CustomerNotFound)));
  }

  #[tokio::test]
  async fn test_record_scan_counts() {
    let store = Store::memory();
    let (customer, _) = fixtures::register(&store, "john@example.com").await;
    let referrals = Referrals::new(&store);
    referrals.generate_qr(&customer.id, "https://example.com").await.unwrap();

    referrals.record_scan(&customer.id).await.unwrap();
    let code = referrals.record_scan(&customer.id).await.unwrap();

    assert_eq!(code.scans_count, 2);
    assert!(code.last_scanned.is_some());
    assert!(matches!(
      referrals.record_scan("ghost").await,
      Err(Error::QrCodeNotFound)
    ));
  }
}
