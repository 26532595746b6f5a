pub use std::sync::Arc;

pub use chrono::{TimeDelta, Utc};
pub use dashmap::DashMap;
pub use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};
pub use tracing::{debug, error, info, warn};

pub use crate::{
  error::{Error, Result},
  store::{Store, keys},
};

/// Wall-clock timestamp carried by every record, serialized as RFC 3339.
pub type DateTime = chrono::DateTime<Utc>;
