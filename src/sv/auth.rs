use serde::Deserialize;

use crate::{
  entity::{Credential, Customer, Role, new_id},
  prelude::*,
  sv::Referrals,
};

/// Who is logged in. Starts empty, filled by login/registration and emptied
/// again by logout.
#[derive(Debug, Default, Clone)]
pub struct Session {
  pub current: Option<Customer>,
}

impl Session {
  pub fn user(&self) -> Result<&Customer> {
    self.current.as_ref().ok_or(Error::NotLoggedIn)
  }

  pub fn require_admin(&self) -> Result<&Customer> {
    let user = self.user()?;
    if !user.is_admin() {
      return Err(Error::Forbidden);
    }
    Ok(user)
  }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
  pub email: String,
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name: String,
  pub age: Option<u32>,
  pub occupation: Option<String>,
  pub description: Option<String>,
  pub referrer_id: Option<String>,
  pub password: String,
  pub confirm_password: String,
}

/// Editable profile fields, absent ones are left untouched.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
  pub email: Option<String>,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub age: Option<u32>,
  pub occupation: Option<String>,
  pub description: Option<String>,
}

pub struct Auth<'a> {
  store: &'a Store,
  hash_cost: u32,
}

impl<'a> Auth<'a> {
  pub fn new(store: &'a Store, hash_cost: u32) -> Self {
    Self { store, hash_cost }
  }

  /// Session persisted by a previous run, if any.
  pub async fn restore(&self) -> Session {
    Session { current: self.store.load_singleton(keys::CURRENT_USER).await }
  }

  pub async fn register(
    &self,
    session: &mut Session,
    form: Registration,
  ) -> Result<Customer> {
    let email = form.email.trim();
    if email.is_empty() {
      return Err(Error::MissingField("email"));
    }
    if form.password.is_empty() {
      return Err(Error::MissingField("password"));
    }
    if form.password != form.confirm_password {
      return Err(Error::PasswordMismatch);
    }

    let password_hash = bcrypt::hash(&form.password, self.hash_cost)?;
    let guard = self.store.lock().await;

    let mut customers = self.store.load_collection(keys::CUSTOMERS).await;
    if customers.iter().any(|c| c.has_email(email)) {
      warn!("Registration rejected, email {email} already in use");
      return Err(Error::EmailTaken);
    }

    let referrer_id = match form.referrer_id.filter(|id| !id.is_empty()) {
      Some(id) if customers.iter().any(|c| c.id == id) => Some(id),
      Some(id) => {
        warn!("Ignoring unknown referrer {id} for {email}");
        None
      }
      None => None,
    };

    let now = Utc::now();
    let customer = Customer {
      id: new_id(),
      email: email.to_string(),
      first_name: form.first_name.trim().to_string(),
      last_name: form.last_name.trim().to_string(),
      description: form.description,
      age: form.age,
      occupation: form.occupation,
      created_at: now,
      updated_at: now,
      is_verified: false,
      qr_code_url: None,
      free_hours: 0.0,
      referrer_id,
      role: Role::Customer,
    };

    customers.push(customer.clone());
    self.store.save_collection(keys::CUSTOMERS, &customers).await;

    let mut credentials = self.store.load_collection(keys::CREDENTIALS).await;
    credentials
      .push(Credential { customer_id: customer.id.clone(), password_hash });
    self.store.save_collection(keys::CREDENTIALS, &credentials).await;
    drop(guard);

    if let Some(referrer_id) = &customer.referrer_id {
      Referrals::new(self.store).link(referrer_id, &customer.id).await;
    }

    self.sign_in(session, customer.clone()).await;

    info!("Registered customer {} ({})", customer.id, customer.email);
    Ok(customer)
  }

  pub async fn login(
    &self,
    session: &mut Session,
    email: &str,
    password: &str,
  ) -> Result<Customer> {
    let customer = self
      .store
      .load_collection(keys::CUSTOMERS)
      .await
      .into_iter()
      .find(|c| c.has_email(email))
      .ok_or(Error::CustomerNotFound)?;

    let credential = self
      .store
      .load_collection(keys::CREDENTIALS)
      .await
      .into_iter()
      .find(|cred| cred.customer_id == customer.id);

    let verified = match credential {
      Some(cred) => bcrypt::verify(password, &cred.password_hash)?,
      None => false,
    };

    if !verified {
      warn!("Failed login attempt for {}", customer.email);
      return Err(Error::InvalidCredentials);
    }

    self.sign_in(session, customer.clone()).await;

    info!("Customer {} logged in", customer.id);
    Ok(customer)
  }

  pub async fn logout(&self, session: &mut Session) {
    if let Some(customer) = session.current.take() {
      debug!("Customer {} logged out", customer.id);
    }
    self.store.clear_singleton(keys::CURRENT_USER).await;
  }

  /// Re-reads the logged in customer from the collection, picking up changes
  /// made by others (rewards, admin adjustments).
  pub async fn refresh(&self, session: &mut Session) -> Result<Customer> {
    let id = session.user()?.id.clone();

    let customer = self
      .store
      .load_collection(keys::CUSTOMERS)
      .await
      .into_iter()
      .find(|c| c.id == id)
      .ok_or(Error::CustomerNotFound)?;

    self.sign_in(session, customer.clone()).await;
    Ok(customer)
  }

  pub async fn update_profile(
    &self,
    session: &mut Session,
    patch: ProfilePatch,
  ) -> Result<Customer> {
    let current = session.user()?.clone();
    let _guard = self.store.lock().await;
    let mut customers = self.store.load_collection(keys::CUSTOMERS).await;

    // merge onto the stored record so rewards credited meanwhile survive
    let mut updated = customers
      .iter()
      .find(|c| c.id == current.id)
      .cloned()
      .unwrap_or(current);

    if let Some(email) = patch.email {
      let email = email.trim();
      if email.is_empty() {
        return Err(Error::MissingField("email"));
      }
      if customers.iter().any(|c| c.id != updated.id && c.has_email(email)) {
        return Err(Error::EmailTaken);
      }
      updated.email = email.to_string();
    }
    if let Some(first_name) = patch.first_name {
      updated.first_name = first_name;
    }
    if let Some(last_name) = patch.last_name {
      updated.last_name = last_name;
    }
    if patch.age.is_some() {
      updated.age = patch.age;
    }
    if patch.occupation.is_some() {
      updated.occupation = patch.occupation;
    }
    if patch.description.is_some() {
      updated.description = patch.description;
    }
    updated.updated_at = Utc::now();

    match customers.iter_mut().find(|c| c.id == updated.id) {
      Some(slot) => *slot = updated.clone(),
      None => warn!("Customer {} missing from collection", updated.id),
    }
    self.store.save_collection(keys::CUSTOMERS, &customers).await;

    self.sign_in(session, updated.clone()).await;

    debug!("Profile of {} updated", updated.id);
    Ok(updated)
  }

  async fn sign_in(&self, session: &mut Session, customer: Customer) {
    self.store.save_singleton(keys::CURRENT_USER, &customer).await;
    session.current = Some(customer);
  }
}
