use tokio::sync::Mutex;

use crate::{
  config::Config,
  prelude::*,
  store::SqliteBackend,
  sv::{self, Session},
};

pub struct AppState {
  pub store: Store,
  pub config: Config,
  /// The one local session, like a single browser tab
  pub session: Mutex<Session>,
}

impl AppState {
  pub async fn new(config: Config) -> Result<Self> {
    let store = match config.database_url.as_str() {
      "memory" => {
        warn!("Using in-memory storage, nothing survives a restart");
        Store::memory()
      }
      url => Store::new(SqliteBackend::connect(url).await?),
    };
    Ok(Self::with_store(store, config).await)
  }

  pub async fn with_store(store: Store, config: Config) -> Self {
    let session = sv::Auth::new(&store, config.hash_cost).restore().await;
    if let Some(user) = &session.current {
      info!("Restored session of {}", user.email);
    }

    Self { store, config, session: Mutex::new(session) }
  }

  pub fn auth(&self) -> sv::Auth<'_> {
    sv::Auth::new(&self.store, self.config.hash_cost)
  }

  pub fn bookings(&self) -> sv::Bookings<'_> {
    sv::Bookings::new(&self.store, self.config.rewards)
  }

  pub fn referrals(&self) -> sv::Referrals<'_> {
    sv::Referrals::new(&self.store)
  }

  pub fn stats(&self) -> sv::Stats<'_> {
    sv::Stats::new(&self.store)
  }

  pub fn admin(&self) -> sv::Admin<'_> {
    sv::Admin::new(&self.store)
  }

  pub fn tasks(&self) -> sv::Tasks<'_> {
    sv::Tasks::new(&self.store)
  }
}
