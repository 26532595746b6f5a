use std::{env, str::FromStr};

use crate::{prelude::*, sv::referral::RewardPolicy};

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  /// Prefix of shareable referral links, `{base}/ref/{customer_id}`
  pub referral_base_url: String,
  pub rewards: RewardPolicy,
  pub hash_cost: u32,
  pub seed_sample_data: bool,
  /// Password of every seeded account, required once seeding is enabled
  pub seed_password: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: "sqlite:affiliate.db?mode=rwc".into(),
      port: 3000,
      referral_base_url: "https://example.com".into(),
      rewards: RewardPolicy::default(),
      hash_cost: bcrypt::DEFAULT_COST,
      seed_sample_data: false,
      seed_password: None,
    }
  }
}

impl Config {
  pub fn from_env() -> Result<Self> {
    Self::from_lookup(|name| env::var(name).ok())
  }

  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let default = Self::default();

    let config = Self {
      database_url: lookup("DATABASE_URL").unwrap_or(default.database_url),
      port: parse(&lookup, "PORT", default.port)?,
      referral_base_url: lookup("REFERRAL_BASE_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or(default.referral_base_url),
      rewards: RewardPolicy {
        percent: parse(&lookup, "REWARD_PERCENT", default.rewards.percent)?,
        unit_per_hour: parse(
          &lookup,
          "REWARD_UNIT_PER_HOUR",
          default.rewards.unit_per_hour,
        )?,
      },
      hash_cost: parse(&lookup, "HASH_COST", default.hash_cost)?,
      seed_sample_data: parse(
        &lookup,
        "SEED_SAMPLE_DATA",
        default.seed_sample_data,
      )?,
      seed_password: lookup("SEED_PASSWORD")
        .filter(|password| !password.is_empty())
        .or(default.seed_password),
    };

    if config.rewards.unit_per_hour <= 0.0 {
      return Err(Error::InvalidArgs(
        "REWARD_UNIT_PER_HOUR must be positive".into(),
      ));
    }
    if !(4..=31).contains(&config.hash_cost) {
      return Err(Error::InvalidArgs("HASH_COST must be within 4..=31".into()));
    }
    if config.seed_sample_data && config.seed_password.is_none() {
      return Err(Error::InvalidArgs(
        "SEED_PASSWORD is required when SEED_SAMPLE_DATA is enabled".into(),
      ));
    }

    Ok(config)
  }
}

fn parse<T: FromStr>(
  lookup: &impl Fn(&str) -> Option<String>,
  name: &str,
  default: T,
) -> Result<T> {
  match lookup(name) {
    Some(raw) => raw
      .trim()
      .parse()
      .map_err(|_| {
        Error::InvalidArgs(format!("{name} has invalid value `{raw}`"))
      }),
    None => Ok(default),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lookup(
    pairs: &'static [(&'static str, &'static str)],
  ) -> impl Fn(&str) -> Option<String> {
    move |name: &str| {
      pairs.iter().find(|(key, _)| *key == name).map(|(_, v)| v.to_string())
    }
  }

  #[test]
  fn test_defaults_when_unset() {
    let config = Config::from_lookup(lookup(&[])).unwrap();

    assert_eq!(config.port, 3000);
    assert_eq!(config.rewards.percent, 5.0);
    assert_eq!(config.rewards.unit_per_hour, 50.0);
    assert!(!config.seed_sample_data);
    assert_eq!(config.seed_password, None);
  }

  #[test]
  fn test_overrides() {
    let config = Config::from_lookup(lookup(&[
      ("PORT", "8080"),
      ("REFERRAL_BASE_URL", "https://mm-masaze.cz/"),
      ("REWARD_PERCENT", "10"),
      ("SEED_SAMPLE_DATA", "false"),
    ]))
    .unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.referral_base_url, "https://mm-masaze.cz");
    assert_eq!(config.rewards.percent, 10.0);
    assert!(!config.seed_sample_data);
  }

  #[test]
  fn test_invalid_values_rejected() {
    assert!(matches!(
      Config::from_lookup(lookup(&[("PORT", "http")])),
      Err(Error::InvalidArgs(_))
    ));
    assert!(matches!(
      Config::from_lookup(lookup(&[("REWARD_UNIT_PER_HOUR", "0")])),
      Err(Error::InvalidArgs(_))
    ));
    assert!(matches!(
      Config::from_lookup(lookup(&[("HASH_COST", "2")])),
      Err(Error::InvalidArgs(_))
    ));
  }

  #[test]
  fn test_seeding_requires_password() {
    assert!(matches!(
      Config::from_lookup(lookup(&[("SEED_SAMPLE_DATA", "true")])),
      Err(Error::InvalidArgs(_))
    ));
    assert!(matches!(
      Config::from_lookup(lookup(&[
        ("SEED_SAMPLE_DATA", "true"),
        ("SEED_PASSWORD", ""),
      ])),
      Err(Error::InvalidArgs(_))
    ));

    let config = Config::from_lookup(lookup(&[
      ("SEED_SAMPLE_DATA", "true"),
      ("SEED_PASSWORD", "hunter2"),
    ]))
    .unwrap();
    assert!(config.seed_sample_data);
    assert_eq!(config.seed_password.as_deref(), Some("hunter2"));
  }
}
