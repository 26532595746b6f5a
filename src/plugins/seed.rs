use std::sync::Arc;

use async_trait::async_trait;

use crate::{prelude::*, state::AppState, sv};

/// Stores the studio's business info and, when enabled, the demo customers.
pub struct Plugin;

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    sv::seed::ensure_business(&app.store).await;

    if !app.config.seed_sample_data {
      info!("Sample data disabled via config");
      return Ok(());
    }

    sv::seed::sample_data(&app.store, &app.config).await?;
    Ok(())
  }
}
