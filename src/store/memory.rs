use async_trait::async_trait;

use super::Backend;
use crate::prelude::*;

/// Process-local backend, the stand-in for page-local storage.
#[derive(Clone, Default)]
pub struct MemoryBackend {
  entries: Arc<DashMap<String, String>>,
  /// Byte limit across all values, `None` means unbounded
  quota: Option<usize>,
}

impl MemoryBackend {
  #[cfg(test)]
  pub fn with_quota(bytes: usize) -> Self {
    Self { quota: Some(bytes), ..Default::default() }
  }

  fn used_without(&self, key: &str) -> usize {
    self
      .entries
      .iter()
      .filter(|entry| entry.key() != key)
      .map(|entry| entry.value().len())
      .sum()
  }
}

#[async_trait]
impl Backend for MemoryBackend {
  async fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.entries.get(key).map(|value| value.clone()))
  }

  async fn set(&self, key: &str, value: String) -> Result<()> {
    if let Some(quota) = self.quota
      && self.used_without(key) + value.len() > quota
    {
      return Err(Error::QuotaExceeded(key.to_string()));
    }

    self.entries.insert(key.to_string(), value);
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<()> {
    self.entries.remove(key);
    Ok(())
  }
}
