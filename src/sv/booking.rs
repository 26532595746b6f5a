use serde::Deserialize;

use crate::{
  entity::{
    Booking, BookingStatus, PaymentMethod, PaymentStatus, ReferralTransaction,
    Transaction, TransactionStatus, new_id,
  },
  prelude::*,
  sv::{
    Referrals, Session,
    referral::{Reward, RewardPolicy},
  },
};

pub const CURRENCY: &str = "CZK";

/// Slack for hours accumulated from many fractional rewards.
const HOURS_EPS: f64 = 1e-9;

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
  pub service_id: Option<String>,
  pub date: Option<DateTime>,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub phone: String,
}

impl BookingRequest {
  fn validate(&self) -> Result<(&str, DateTime)> {
    let service_id = self
      .service_id
      .as_deref()
      .filter(|id| !id.is_empty())
      .ok_or(Error::MissingField("serviceId"))?;
    let date = self.date.ok_or(Error::MissingField("date"))?;

    for (field, value) in
      [("name", &self.name), ("email", &self.email), ("phone", &self.phone)]
    {
      if value.trim().is_empty() {
        return Err(Error::MissingField(field));
      }
    }

    Ok((service_id, date))
  }
}

pub struct Bookings<'a> {
  store: &'a Store,
  policy: RewardPolicy,
}

impl<'a> Bookings<'a> {
  pub fn new(store: &'a Store, policy: RewardPolicy) -> Self {
    Self { store, policy }
  }

  /// Bookings may be settled or cancelled by their customer or by an admin.
  fn authorize(session: &Session, booking: &Booking) -> Result<()> {
    let user = session.user()?;
    if booking.customer_id != user.id && !user.is_admin() {
      return Err(Error::Forbidden);
    }
    Ok(())
  }

  pub async fn for_customer(&self, customer_id: &str) -> Vec<Booking> {
    self
      .store
      .load_collection(keys::BOOKINGS)
      .await
      .into_iter()
      .filter(|b| b.customer_id == customer_id)
      .collect()
  }

  /// Books a service for the logged in customer, or for the registered
  /// customer owning the form's email.
  pub async fn submit(
    &self,
    session: &Session,
    req: BookingRequest,
  ) -> Result<Booking> {
    let (service_id, date) = req.validate()?;
    let _guard = self.store.lock().await;

    let info = self
      .store
      .load_singleton(keys::BUSINESS_INFO)
      .await
      .ok_or(Error::ServiceNotFound)?;
    let service = info.service(service_id).ok_or(Error::ServiceNotFound)?;

    let customers = self.store.load_collection(keys::CUSTOMERS).await;
    let customer = match &session.current {
      Some(current) => customers.iter().find(|c| c.id == current.id),
      None => customers.iter().find(|c| c.has_email(&req.email)),
    }
    .ok_or(Error::CustomerNotFound)?;

    let now = Utc::now();
    let booking = Booking {
      id: new_id(),
      customer_id: customer.id.clone(),
      service_id: service.id.clone(),
      date,
      duration: service.duration,
      status: BookingStatus::Pending,
      payment_status: PaymentStatus::Unpaid,
      created_at: now,
      updated_at: now,
      price: service.price,
      referrer_id: customer.referrer_id.clone(),
    };

    let mut bookings = self.store.load_collection(keys::BOOKINGS).await;
    bookings.push(booking.clone());
    self.store.save_collection(keys::BOOKINGS, &bookings).await;

    info!(
      "Booking {} of `{}` for {} on {}",
      booking.id, service.name, customer.id, booking.date
    );
    Ok(booking)
  }

  /// Settles a pending booking. Card and cash payments reward the booking's
  /// referrer; `Free` spends the customer's own free hours instead.
  pub async fn confirm_payment(
    &self,
    session: &Session,
    booking_id: &str,
    method: PaymentMethod,
  ) -> Result<Transaction> {
    let guard = self.store.lock().await;

    let mut bookings = self.store.load_collection(keys::BOOKINGS).await;
    let booking = bookings
      .iter_mut()
      .find(|b| b.id == booking_id)
      .ok_or(Error::BookingNotFound)?;
    Self::authorize(session, booking)?;

    if booking.status == BookingStatus::Cancelled {
      return Err(Error::InvalidArgs("Booking is cancelled".into()));
    }
    if booking.payment_status != PaymentStatus::Unpaid {
      return Err(Error::InvalidArgs("Booking is already paid".into()));
    }

    let mut customers = self.store.load_collection(keys::CUSTOMERS).await;
    let customer_idx = customers
      .iter()
      .position(|c| c.id == booking.customer_id)
      .ok_or(Error::CustomerNotFound)?;

    let (amount, reward, referrer) = match method {
      PaymentMethod::Free => {
        let hours = booking.duration as f64 / 60.0;
        let customer = &mut customers[customer_idx];
        if customer.free_hours + HOURS_EPS < hours {
          return Err(Error::InsufficientFreeHours);
        }
        customer.free_hours = (customer.free_hours - hours).max(0.0);
        booking.payment_status = PaymentStatus::Free;
        (0.0, Reward::default(), None)
      }
      PaymentMethod::Card | PaymentMethod::Cash => {
        booking.payment_status = PaymentStatus::Paid;

        let referrer = booking
          .referrer_id
          .as_deref()
          .and_then(|id| customers.iter().position(|c| c.id == id));

        match referrer {
          Some(idx) => {
            let reward = self.policy.reward(booking.price);
            customers[idx].free_hours += reward.hours;
            (booking.price, reward, Some(customers[idx].id.clone()))
          }
          None => (booking.price, Reward::default(), None),
        }
      }
    };

    let now = Utc::now();
    booking.status = BookingStatus::Confirmed;
    booking.updated_at = now;

    let transaction = Transaction {
      id: new_id(),
      customer_id: booking.customer_id.clone(),
      booking_id: booking.id.clone(),
      amount,
      currency: CURRENCY.into(),
      status: TransactionStatus::Completed,
      payment_method: method,
      stripe_payment_id: None,
      created_at: now,
      referrer_id: referrer.clone(),
      reward_amount: reward.amount,
      reward_hours: reward.hours,
    };

    self.store.save_collection(keys::BOOKINGS, &bookings).await;
    self.store.save_collection(keys::CUSTOMERS, &customers).await;

    let mut transactions = self.store.load_collection(keys::TRANSACTIONS).await;
    transactions.push(transaction.clone());
    self.store.save_collection(keys::TRANSACTIONS, &transactions).await;
    // the booking is settled, crediting locks on its own
    drop(guard);

    if let Some(referrer_id) = &referrer {
      Referrals::new(self.store)
        .credit(referrer_id, &transaction.customer_id, ReferralTransaction {
          booking_id: transaction.booking_id.clone(),
          date: now,
          amount,
          free_hours_earned: reward.hours,
        })
        .await;
    }

    info!(
      "Booking {} paid by {:?}, {} {}",
      transaction.booking_id, method, amount, CURRENCY
    );
    Ok(transaction)
  }

  pub async fn cancel(
    &self,
    session: &Session,
    booking_id: &str,
  ) -> Result<Booking> {
    let _guard = self.store.lock().await;

    let mut bookings = self.store.load_collection(keys::BOOKINGS).await;
    let booking = bookings
      .iter_mut()
      .find(|b| b.id == booking_id)
      .ok_or(Error::BookingNotFound)?;
    Self::authorize(session, booking)?;

    if booking.status == BookingStatus::Cancelled {
      return Err(Error::InvalidArgs("Booking is already cancelled".into()));
    }

    booking.status = BookingStatus::Cancelled;
    booking.updated_at = Utc::now();
    let booking = booking.clone();

    self.store.save_collection(keys::BOOKINGS, &bookings).await;

    debug!("Booking {} cancelled", booking.id);
    Ok(booking)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::{Customer, Role, Service},
    sv::test_utils::fixtures,
  };

  const JANE: &str = "jane@example.com";

  fn request(service_id: &str, email: &str) -> BookingRequest {
    BookingRequest {
      service_id: Some(service_id.into()),
      date: Some(Utc::now() + TimeDelta::days(2)),
      name: "Jane Smith".into(),
      email: email.into(),
      phone: "+420 123 456 789".into(),
    }
  }

  async fn customer(store: &Store, id: &str) -> Customer {
    store
      .load_collection(keys::CUSTOMERS)
      .await
      .into_iter()
      .find(|c| c.id == id)
      .unwrap()
  }

  #[tokio::test]
  async fn test_submit_requires_all_fields() {
    let store = fixtures::store().await;
    let bookings = Bookings::new(&store, RewardPolicy::default());
    let (_, session) = fixtures::register(&store, JANE).await;

    let no_phone =
      BookingRequest { phone: " ".into(), ..request("1", JANE) };
    let no_date =
      BookingRequest { date: None, ..request("1", JANE) };

    assert!(matches!(
      bookings.submit(&session, no_phone).await,
      Err(Error::MissingField("phone"))
    ));
    assert!(matches!(
      bookings.submit(&session, no_date).await,
      Err(Error::MissingField("date"))
    ));
    assert!(store.load_collection(keys::BOOKINGS).await.is_empty());
  }

  #[tokio::test]
  async fn test_submit_unknown_service() {
    let store = fixtures::store().await;
    let (_, session) = fixtures::register(&store, JANE).await;

    let result = Bookings::new(&store, RewardPolicy::default())
      .submit(&session, request("42", JANE))
      .await;

    assert!(matches!(result, Err(Error::ServiceNotFound)));
  }

  #[tokio::test]
  async fn test_submit_persists_pending_booking() {
    let store = fixtures::store().await;
    let (referrer, _) = fixtures::register(&store, "john@example.com").await;
    let jane =
      fixtures::register_referred(&store, JANE, &referrer.id)
        .await;

    // guest checkout matched by email
    let booking = Bookings::new(&store, RewardPolicy::default())
      .submit(&Session::default(), request("1", "JANE@example.com"))
      .await
      .unwrap();

    assert_eq!(booking.customer_id, jane.id);
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
    assert_eq!(booking.price, 500.0);
    assert_eq!(booking.duration, 60);
    assert_eq!(booking.referrer_id, Some(referrer.id));
    assert_eq!(store.load_collection(keys::BOOKINGS).await, vec![booking]);
  }

  #[tokio::test]
  async fn test_submit_guest_without_account() {
    let store = fixtures::store().await;

    let result = Bookings::new(&store, RewardPolicy::default())
      .submit(&Session::default(), request("1", "ghost@example.com"))
      .await;

    assert!(matches!(result, Err(Error::CustomerNotFound)));
  }

  #[tokio::test]
  async fn test_card_payment_rewards_referrer() {
    let store = fixtures::store().await;
    let (referrer, _) = fixtures::register(&store, "john@example.com").await;
    fixtures::register_referred(&store, JANE, &referrer.id).await;
    let session =
      Session { current: store.load_singleton(keys::CURRENT_USER).await };
    let bookings = Bookings::new(&store, RewardPolicy::default());

    let first = bookings.submit(&session, request("1", JANE)).await.unwrap();
    let second = bookings.submit(&session, request("2", JANE)).await.unwrap();
    let tx = bookings
      .confirm_payment(&session, &first.id, PaymentMethod::Card)
      .await
      .unwrap();
    bookings
      .confirm_payment(&session, &second.id, PaymentMethod::Cash)
      .await
      .unwrap();

    assert_eq!(tx.amount, 500.0);
    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(tx.reward_amount, 25.0);
    assert_eq!(tx.reward_hours, 0.5);
    assert_eq!(tx.referrer_id.as_ref(), Some(&referrer.id));

    let referrer = customer(&store, &referrer.id).await;
    assert!((referrer.free_hours - 0.8).abs() < 1e-9);

    let referrals = store.load_collection(keys::REFERRALS).await;
    assert_eq!(referrals.len(), 1);
    assert_eq!(referrals[0].total_paid, 800.0);
    assert_eq!(referrals[0].transactions.len(), 2);
    assert!(referrals[0].is_consistent());

    let stored = store.load_collection(keys::BOOKINGS).await;
    assert!(stored.iter().all(|b| b.status == BookingStatus::Confirmed
      && b.payment_status == PaymentStatus::Paid));
    assert_eq!(store.load_collection(keys::TRANSACTIONS).await.len(), 2);
    assert_eq!(store.load_collection(keys::NOTIFICATIONS).await.len(), 2);
  }

  #[tokio::test]
  async fn test_payment_without_referrer_has_no_reward() {
    let store = fixtures::store().await;
    let (_, session) = fixtures::register(&store, JANE).await;
    let bookings = Bookings::new(&store, RewardPolicy::default());

    let booking = bookings.submit(&session, request("2", JANE)).await.unwrap();
    let tx = bookings
      .confirm_payment(&session, &booking.id, PaymentMethod::Card)
      .await
      .unwrap();

    assert_eq!(tx.amount, 300.0);
    assert_eq!(tx.reward_amount, 0.0);
    assert!(store.load_collection(keys::REFERRALS).await.is_empty());
    assert!(store.load_collection(keys::NOTIFICATIONS).await.is_empty());
  }

  #[tokio::test]
  async fn test_free_payment_spends_hours() {
    let store = fixtures::store().await;
    let (jane, session) = fixtures::register(&store, JANE).await;
    let bookings = Bookings::new(&store, RewardPolicy::default());

    let booking = bookings.submit(&session, request("2", JANE)).await.unwrap();
    assert!(matches!(
      bookings
        .confirm_payment(&session, &booking.id, PaymentMethod::Free)
        .await,
      Err(Error::InsufficientFreeHours)
    ));

    let mut customers = store.load_collection(keys::CUSTOMERS).await;
    customers[0].free_hours = 1.5;
    store.save_collection(keys::CUSTOMERS, &customers).await;

    let tx = bookings
      .confirm_payment(&session, &booking.id, PaymentMethod::Free)
      .await
      .unwrap();

    assert_eq!(tx.amount, 0.0);
    assert_eq!(tx.payment_method, PaymentMethod::Free);
    assert_eq!(customer(&store, &jane.id).await.free_hours, 1.0);

    let stored = store.load_collection(keys::BOOKINGS).await;
    assert_eq!(stored[0].payment_status, PaymentStatus::Free);
  }

  #[tokio::test]
  async fn test_free_hours_tolerate_rounding() {
    let store = Store::memory();
    let mut business = fixtures::business();
    business.services.push(Service {
      id: "3".into(),
      name: "Short massage".into(),
      price: 400.0,
      duration: 48,
    });
    store.save_singleton(keys::BUSINESS_INFO, &business).await;
    let (jane, session) = fixtures::register(&store, JANE).await;
    let bookings = Bookings::new(&store, RewardPolicy::default());
    let booking = bookings.submit(&session, request("3", JANE)).await.unwrap();

    // two rewards summing to just under the 0.8h the booking costs
    let earned = 0.7 + 0.1;
    assert!(earned < 0.8);
    let mut customers = store.load_collection(keys::CUSTOMERS).await;
    customers[0].free_hours = earned;
    store.save_collection(keys::CUSTOMERS, &customers).await;

    bookings
      .confirm_payment(&session, &booking.id, PaymentMethod::Free)
      .await
      .unwrap();

    assert_eq!(customer(&store, &jane.id).await.free_hours, 0.0);
  }

  #[tokio::test]
  async fn test_cannot_pay_twice_or_after_cancel() {
    let store = fixtures::store().await;
    let (_, session) = fixtures::register(&store, JANE).await;
    let bookings = Bookings::new(&store, RewardPolicy::default());

    let paid = bookings.submit(&session, request("1", JANE)).await.unwrap();
    bookings
      .confirm_payment(&session, &paid.id, PaymentMethod::Card)
      .await
      .unwrap();
    assert!(matches!(
      bookings.confirm_payment(&session, &paid.id, PaymentMethod::Card).await,
      Err(Error::InvalidArgs(_))
    ));

    let pending = bookings.submit(&session, request("1", JANE)).await.unwrap();
    let cancelled = bookings.cancel(&session, &pending.id).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert!(matches!(
      bookings
        .confirm_payment(&session, &cancelled.id, PaymentMethod::Cash)
        .await,
      Err(Error::InvalidArgs(_))
    ));
    assert!(matches!(
      bookings.confirm_payment(&session, "missing", PaymentMethod::Cash).await,
      Err(Error::BookingNotFound)
    ));
  }

  #[tokio::test]
  async fn test_only_owner_or_admin_settles() {
    let store = fixtures::store().await;
    let (_, jane) = fixtures::register(&store, JANE).await;
    let (_, john) = fixtures::register(&store, "john@example.com").await;
    let admin = Session {
      current: Some(Customer {
        role: Role::Admin,
        ..fixtures::customer("admin@example.com")
      }),
    };
    let bookings = Bookings::new(&store, RewardPolicy::default());
    let booking = bookings.submit(&jane, request("1", JANE)).await.unwrap();

    assert!(matches!(
      bookings
        .confirm_payment(&Session::default(), &booking.id, PaymentMethod::Card)
        .await,
      Err(Error::NotLoggedIn)
    ));
    assert!(matches!(
      bookings.confirm_payment(&john, &booking.id, PaymentMethod::Free).await,
      Err(Error::Forbidden)
    ));
    assert!(matches!(
      bookings.cancel(&john, &booking.id).await,
      Err(Error::Forbidden)
    ));
    let stored = store.load_collection(keys::BOOKINGS).await;
    assert_eq!(stored[0].status, BookingStatus::Pending);

    let cancelled = bookings.cancel(&admin, &booking.id).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_concurrent_payments_settle_once() {
    let store = fixtures::store().await;
    let (referrer, _) = fixtures::register(&store, "john@example.com").await;
    fixtures::register_referred(&store, JANE, &referrer.id).await;
    let session =
      Session { current: store.load_singleton(keys::CURRENT_USER).await };
    let booking = Bookings::new(&store, RewardPolicy::default())
      .submit(&session, request("1", JANE))
      .await
      .unwrap();

    let attempts: Vec<_> = (0..8)
      .map(|_| {
        let store = store.clone();
        let session = session.clone();
        let id = booking.id.clone();
        tokio::spawn(async move {
          Bookings::new(&store, RewardPolicy::default())
            .confirm_payment(&session, &id, PaymentMethod::Card)
            .await
        })
      })
      .collect();

    let mut settled = 0;
    for attempt in attempts {
      if attempt.await.unwrap().is_ok() {
        settled += 1;
      }
    }

    assert_eq!(settled, 1);
    assert_eq!(store.load_collection(keys::TRANSACTIONS).await.len(), 1);
    let referrals = store.load_collection(keys::REFERRALS).await;
    assert_eq!(referrals[0].transactions.len(), 1);
    let referrer = customer(&store, &referrer.id).await;
    assert!((referrer.free_hours - 0.5).abs() < 1e-9);
  }
}
