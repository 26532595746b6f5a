//! Demo data for a fresh store: a wellness studio, an admin, three
//! customers chained by referrals and their bookings.

use crate::{
  config::Config,
  entity::*,
  prelude::*,
  sv::referral::RewardPolicy,
};

pub fn sample_business() -> BusinessInfo {
  let service = |id: &str, name: &str, price: f64, duration: u32| Service {
    id: id.into(),
    name: name.into(),
    price,
    duration,
  };
  let hours = |day: &str, from: &str, to: &str| WorkingHour {
    day: day.into(),
    from: from.into(),
    to: to.into(),
  };

  BusinessInfo {
    id: "1".into(),
    name: "M.M Masáže a terapie".into(),
    description: "Místo pro váš odpočinek, ať už hledáte úlevu od bolesti, \
                  stresu nebo jen chvíli pro sebe."
      .into(),
    services: vec![
      service("1", "Masáž celková/částečná", 777.0, 60),
      service("2", "Masáž břicha", 300.0, 20),
      service("3", "Kraniosakrální terapie/biodynamika", 888.0, 60),
      service("4", "Somatoemocionální uvolnění", 777.0, 40),
    ],
    contact: Contact {
      phone: "+420 777 697 545".into(),
      email: "ma.mour@seznam.cz".into(),
      address: "Třebeň 31, Třebeň".into(),
    },
    working_hours: vec![
      hours("Pondělí", "9:00", "19:00"),
      hours("Úterý", "9:00", "19:00"),
      hours("Středa", "9:00", "19:00"),
      hours("Čtvrtek", "9:00", "19:00"),
      hours("Pátek", "9:00", "20:00"),
      hours("Sobota", "10:00", "15:00"),
    ],
    logo: None,
  }
}

/// Business info as served to clients. Stored on first use so every
/// advertised service can be booked.
pub async fn ensure_business(store: &Store) -> BusinessInfo {
  let _guard = store.lock().await;
  if let Some(info) = store.load_singleton(keys::BUSINESS_INFO).await {
    return info;
  }

  let info = sample_business();
  store.save_singleton(keys::BUSINESS_INFO, &info).await;
  info!("Stored default business info");
  info
}

/// Writes the demo data unless customers already exist.
/// Returns whether anything was written.
pub async fn sample_data(store: &Store, config: &Config) -> Result<bool> {
  let password = config
    .seed_password
    .as_deref()
    .ok_or(Error::MissingField("SEED_PASSWORD"))?;
  let _guard = store.lock().await;

  if !store.load_collection(keys::CUSTOMERS).await.is_empty() {
    debug!("Store already populated, skipping sample data");
    return Ok(false);
  }

  info!("Initializing sample data...");

  let now = Utc::now();
  let base = &config.referral_base_url;
  let customer = |email: &str, first: &str, last: &str, age: i64| {
    let created = now - TimeDelta::days(age);
    Customer {
      id: new_id(),
      email: email.into(),
      first_name: first.into(),
      last_name: last.into(),
      description: None,
      age: None,
      occupation: None,
      created_at: created,
      updated_at: created,
      is_verified: true,
      qr_code_url: None,
      free_hours: 0.0,
      referrer_id: None,
      role: Role::Customer,
    }
  };

  let admin = Customer {
    role: Role::Admin,
    description: Some("Wellness center administrator".into()),
    ..customer("admin@example.com", "Admin", "User", 0)
  };
  let mut john = Customer {
    description: Some("Regular wellness enthusiast".into()),
    age: Some(35),
    occupation: Some("Software Developer".into()),
    ..customer("john@example.com", "John", "Doe", 30)
  };
  let mut jane = Customer {
    description: Some("Loves massages and facials".into()),
    age: Some(28),
    occupation: Some("Marketing Manager".into()),
    referrer_id: Some(john.id.clone()),
    ..customer("jane@example.com", "Jane", "Smith", 15)
  };
  let mike = Customer {
    description: Some("New to wellness treatments".into()),
    age: Some(42),
    occupation: Some("Architect".into()),
    referrer_id: Some(jane.id.clone()),
    ..customer("mike@example.com", "Mike", "Johnson", 5)
  };

  let business = sample_business();
  let booking = |who: &Customer, service: &Service, days: i64, paid: bool| {
    let created = now - TimeDelta::days(days.abs() + 2);
    Booking {
      id: new_id(),
      customer_id: who.id.clone(),
      service_id: service.id.clone(),
      date: now - TimeDelta::days(days),
      duration: service.duration,
      status: if paid {
        BookingStatus::Confirmed
      } else {
        BookingStatus::Pending
      },
      payment_status: if paid {
        PaymentStatus::Paid
      } else {
        PaymentStatus::Unpaid
      },
      created_at: created,
      updated_at: created,
      price: service.price,
      referrer_id: who.referrer_id.clone(),
    }
  };
  let bookings = vec![
    booking(&jane, &business.services[0], 12, true),
    booking(&jane, &business.services[2], 5, true),
    booking(&mike, &business.services[1], -2, false),
  ];

  let policy: RewardPolicy = config.rewards;
  let mut transactions = Vec::new();
  let mut jane_referral = Referral {
    created_at: jane.created_at,
    ..Referral::new(&john.id, &jane.id)
  };

  let paid =
    bookings.iter().filter(|b| b.payment_status == PaymentStatus::Paid);
  for booking in paid {
    let reward = policy.reward(booking.price);
    transactions.push(Transaction {
      id: new_id(),
      customer_id: booking.customer_id.clone(),
      booking_id: booking.id.clone(),
      amount: booking.price,
      currency: "CZK".into(),
      status: TransactionStatus::Completed,
      payment_method: PaymentMethod::Card,
      stripe_payment_id: None,
      created_at: booking.created_at,
      referrer_id: booking.referrer_id.clone(),
      reward_amount: reward.amount,
      reward_hours: reward.hours,
    });
    jane_referral.record(ReferralTransaction {
      booking_id: booking.id.clone(),
      date: booking.created_at,
      amount: booking.price,
      free_hours_earned: reward.hours,
    });
    john.free_hours += reward.hours;
  }

  let mike_referral = Referral {
    created_at: mike.created_at,
    ..Referral::new(&jane.id, &mike.id)
  };

  let qr = |who: &mut Customer, scans: u32| {
    let url = format!("{base}/ref/{}", who.id);
    who.qr_code_url = Some(url.clone());
    QrCode {
      id: new_id(),
      customer_id: who.id.clone(),
      image_url: format!(
        "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data={}",
        crate::utils::percent_encode(&url)
      ),
      url,
      created_at: who.created_at,
      scans_count: scans,
      last_scanned: Some(now - TimeDelta::days(5)),
    }
  };
  let qr_codes = vec![qr(&mut john, 3), qr(&mut jane, 1)];

  let customers = vec![admin, john, jane, mike];

  let mut credentials = Vec::with_capacity(customers.len());
  for customer in &customers {
    credentials.push(Credential {
      customer_id: customer.id.clone(),
      password_hash: bcrypt::hash(password, config.hash_cost)?,
    });
  }

  store.save_collection(keys::CUSTOMERS, &customers).await;
  store.save_collection(keys::CREDENTIALS, &credentials).await;
  store.save_singleton(keys::BUSINESS_INFO, &business).await;
  store.save_collection(keys::QR_CODES, &qr_codes).await;
  store.save_collection(keys::BOOKINGS, &bookings).await;
  store.save_collection(keys::TRANSACTIONS, &transactions).await;
  store
    .save_collection(keys::REFERRALS, &[jane_referral, mike_referral])
    .await;

  info!("Sample data initialized successfully");
  Ok(true)
}
