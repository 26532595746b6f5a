use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use sea_orm::sea_query::OnConflict;

use super::Backend;
use crate::{entity::kv, prelude::*};

/// Durable backend: a single `kv_entries` table in SQLite.
pub struct SqliteBackend {
  db: DatabaseConnection,
}

impl SqliteBackend {
  pub async fn connect(url: &str) -> Result<Self> {
    let db = Database::connect(url).await?;
    Migrator::up(&db, None).await?;

    info!("Storage ready at {url}");
    Ok(Self { db })
  }
}

#[async_trait]
impl Backend for SqliteBackend {
  async fn get(&self, key: &str) -> Result<Option<String>> {
    let entry = kv::Entity::find_by_id(key.to_string()).one(&self.db).await?;
    Ok(entry.map(|entry| entry.value))
  }

  async fn set(&self, key: &str, value: String) -> Result<()> {
    let now = Utc::now().naive_utc();

    kv::Entity::insert(kv::ActiveModel {
      key: Set(key.to_string()),
      value: Set(value),
      updated_at: Set(now),
    })
    .on_conflict(
      OnConflict::column(kv::Column::Key)
        .update_columns([kv::Column::Value, kv::Column::UpdatedAt])
        .to_owned(),
    )
    .exec(&self.db)
    .await?;

    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<()> {
    kv::Entity::delete_by_id(key.to_string()).exec(&self.db).await?;
    Ok(())
  }
}
