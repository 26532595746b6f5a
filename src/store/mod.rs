//! Key-value persistence of named collections and singleton slots.
//!
//! Every collection or slot lives under one fixed string key and is stored as
//! a JSON document. Reads never fail: a missing or unreadable payload is
//! logged and treated as empty. Writes are fire-and-forget: failures are
//! logged and otherwise ignored. There is no atomicity across keys, so
//! services hold [`Store::lock`] around every load-modify-save sequence.

mod memory;
mod sqlite;

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::{Mutex, MutexGuard};

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use crate::prelude::*;

/// Raw string storage under string keys.
#[async_trait]
pub trait Backend: Send + Sync {
  async fn get(&self, key: &str) -> Result<Option<String>>;

  async fn set(&self, key: &str, value: String) -> Result<()>;

  async fn remove(&self, key: &str) -> Result<()>;
}

/// Storage key bound to the record type stored under it.
pub struct Key<T> {
  name: &'static str,
  _record: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
  pub const fn new(name: &'static str) -> Self {
    Self { name, _record: PhantomData }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }
}

impl<T> Clone for Key<T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for Key<T> {}

pub mod keys {
  use super::Key;
  use crate::entity::*;

  pub const CUSTOMERS: Key<Customer> = Key::new("affiliate-customers");
  pub const BUSINESS_INFO: Key<BusinessInfo> =
    Key::new("affiliate-business-info");
  pub const BOOKINGS: Key<Booking> = Key::new("affiliate-bookings");
  pub const QR_CODES: Key<QrCode> = Key::new("affiliate-qr-codes");
  pub const REFERRALS: Key<Referral> = Key::new("affiliate-referrals");
  pub const TRANSACTIONS: Key<Transaction> =
    Key::new("affiliate-transactions");
  pub const NOTIFICATIONS: Key<Notification> =
    Key::new("affiliate-notifications");
  pub const ADMIN_ACTIONS: Key<AdminAction> =
    Key::new("affiliate-admin-actions");
  pub const CURRENT_USER: Key<Customer> = Key::new("affiliate-current-user");
  pub const CREDENTIALS: Key<Credential> = Key::new("affiliate-credentials");
  pub const TASKS: Key<Task> = Key::new("tasks");
}

#[derive(Clone)]
pub struct Store {
  backend: Arc<dyn Backend>,
  writes: Arc<Mutex<()>>,
}

impl Store {
  pub fn new(backend: impl Backend + 'static) -> Self {
    Self { backend: Arc::new(backend), writes: Arc::default() }
  }

  pub fn memory() -> Self {
    Self::new(MemoryBackend::default())
  }

  #[cfg(test)]
  pub fn backend(&self) -> &dyn Backend {
    self.backend.as_ref()
  }

  /// Serializes writers. Not reentrant: a holder must not call into another
  /// operation that locks.
  pub async fn lock(&self) -> MutexGuard<'_, ()> {
    self.writes.lock().await
  }

  pub async fn load_collection<T: DeserializeOwned>(
    &self,
    key: Key<T>,
  ) -> Vec<T> {
    self.load::<Vec<T>>(key.name()).await.unwrap_or_default()
  }

  pub async fn save_collection<T: Serialize>(
    &self,
    key: Key<T>,
    records: &[T],
  ) {
    self.save(key.name(), records).await;
  }

  pub async fn load_singleton<T: DeserializeOwned>(
    &self,
    key: Key<T>,
  ) -> Option<T> {
    self.load::<T>(key.name()).await
  }

  pub async fn save_singleton<T: Serialize>(&self, key: Key<T>, value: &T) {
    self.save(key.name(), value).await;
  }

  pub async fn clear_singleton<T>(&self, key: Key<T>) {
    if let Err(err) = self.backend.remove(key.name()).await {
      error!("Error clearing `{}` from storage: {err}", key.name());
    }
  }

  async fn load<V: DeserializeOwned>(&self, name: &str) -> Option<V> {
    let raw = match self.backend.get(name).await {
      Ok(raw) => raw?,
      Err(err) => {
        error!("Error loading `{name}` from storage: {err}");
        return None;
      }
    };

    // a stored `null` reads the same as an unset key
    match json::from_str::<Option<V>>(&raw) {
      Ok(value) => value,
      Err(err) => {
        error!("Error parsing `{name}` from storage: {err}");
        None
      }
    }
  }

  async fn save<V: Serialize + ?Sized>(&self, name: &str, value: &V) {
    let raw = match json::to_string(value) {
      Ok(raw) => raw,
      Err(err) => {
        error!("Error serializing `{name}`: {err}");
        return;
      }
    };

    if let Err(err) = self.backend.set(name, raw).await {
      error!("Error saving `{name}` to storage: {err}");
    }
  }
}
