//! Shared test utilities: in-memory store and record fixtures

#[cfg(test)]
pub mod fixtures {
  use crate::{
    entity::*,
    prelude::*,
    sv::{Auth, Session, auth::Registration},
  };

  /// Lowest cost bcrypt accepts, keeps hashing fast in tests
  pub const HASH_COST: u32 = 4;

  pub fn customer(email: &str) -> Customer {
    let now = Utc::now();
    Customer {
      id: new_id(),
      email: email.to_string(),
      first_name: "Test".into(),
      last_name: "Customer".into(),
      description: None,
      age: None,
      occupation: None,
      created_at: now,
      updated_at: now,
      is_verified: false,
      qr_code_url: None,
      free_hours: 0.0,
      referrer_id: None,
      role: Role::Customer,
    }
  }

  pub fn registration(email: &str, password: &str) -> Registration {
    Registration {
      email: email.to_string(),
      first_name: "Jane".into(),
      last_name: "Smith".into(),
      password: password.to_string(),
      confirm_password: password.to_string(),
      ..Default::default()
    }
  }

  pub fn business() -> BusinessInfo {
    BusinessInfo {
      id: "1".into(),
      name: "Test Studio".into(),
      description: "Massages".into(),
      services: vec![
        Service {
          id: "1".into(),
          name: "Full body massage".into(),
          price: 500.0,
          duration: 60,
        },
        Service {
          id: "2".into(),
          name: "Abdominal massage".into(),
          price: 300.0,
          duration: 30,
        },
      ],
      contact: Contact {
        phone: "+420 000 000 000".into(),
        email: "studio@example.com".into(),
        address: "Main St 1".into(),
      },
      working_hours: vec![WorkingHour {
        day: "Monday".into(),
        from: "9:00".into(),
        to: "19:00".into(),
      }],
      logo: None,
    }
  }

  /// Store preloaded with the business info
  pub async fn store() -> Store {
    let store = Store::memory();
    store.save_singleton(keys::BUSINESS_INFO, &business()).await;
    store
  }

  /// Registers a customer through the auth flow, leaving them logged in
  pub async fn register(store: &Store, email: &str) -> (Customer, Session) {
    let mut session = Session::default();
    let customer = Auth::new(store, HASH_COST)
      .register(&mut session, registration(email, "secret"))
      .await
      .unwrap();
    (customer, session)
  }

  /// Registers a customer referred by `referrer_id`
  pub async fn register_referred(
    store: &Store,
    email: &str,
    referrer_id: &str,
  ) -> Customer {
    let mut session = Session::default();
    Auth::new(store, HASH_COST)
      .register(
        &mut session,
        Registration {
          referrer_id: Some(referrer_id.to_string()),
          ..registration(email, "secret")
        },
      )
      .await
      .unwrap()
  }
}
