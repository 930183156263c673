//! Runtime settings for the screens.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is
//! a valid configuration.

use std::{
  fs,
  path::{Path, PathBuf},
  time::Duration,
};

use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const EMOJI_URL_ENV: &str = "RXSCREENS_EMOJI_URL";
pub const CREATURE_URL_ENV: &str = "RXSCREENS_CREATURE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid config JSON: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("invalid setting `{field}`: {message}")]
  Invalid { field: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenConfig {
  pub clock_period_ms: u64,
  /// strftime pattern for the clock label.
  pub clock_format: String,
  pub emoji_url: String,
  pub emoji_poll_ms: u64,
  /// Prefix the lower-cased search term is appended to.
  pub creature_url: String,
  pub search_debounce_ms: u64,
  pub http_timeout_ms: u64,
}

impl Default for ScreenConfig {
  fn default() -> Self {
    ScreenConfig {
      clock_period_ms: 1_000,
      clock_format: "%H:%M:%S".to_owned(),
      emoji_url: "https://ios-emoji-picker.herokuapp.com/".to_owned(),
      emoji_poll_ms: 3_000,
      creature_url: "https://pokeapi.co/api/v2/pokemon/".to_owned(),
      search_debounce_ms: 500,
      http_timeout_ms: 10_000,
    }
  }
}

impl ScreenConfig {
  pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
    let config: ScreenConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
  }

  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let json =
      fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    Self::from_json_str(&json)
  }

  /// Replace the endpoints with `RXSCREENS_EMOJI_URL` and
  /// `RXSCREENS_CREATURE_URL` when they are set.
  pub fn with_env_overrides(self) -> Self { self.with_overrides(|key| std::env::var(key).ok()) }

  fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
    if let Some(url) = lookup(EMOJI_URL_ENV) {
      self.emoji_url = url;
    }
    if let Some(url) = lookup(CREATURE_URL_ENV) {
      self.creature_url = url;
    }
    self
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    let positive = [
      ("clock_period_ms", self.clock_period_ms),
      ("emoji_poll_ms", self.emoji_poll_ms),
      ("http_timeout_ms", self.http_timeout_ms),
    ];
    for (field, value) in positive {
      if value == 0 {
        return Err(ConfigError::Invalid { field, message: "must be greater than zero".into() });
      }
    }
    if StrftimeItems::new(&self.clock_format).any(|item| matches!(item, Item::Error)) {
      return Err(ConfigError::Invalid {
        field: "clock_format",
        message: format!("`{}` is not a strftime pattern", self.clock_format),
      });
    }
    endpoint("emoji_url", &self.emoji_url)?;
    self.creature_base()?;
    Ok(())
  }

  /// The creature endpoint as a URL that search terms can be appended to.
  pub fn creature_base(&self) -> Result<Url, ConfigError> {
    let url = endpoint("creature_url", &self.creature_url)?;
    if url.cannot_be_a_base() {
      return Err(ConfigError::Invalid { field: "creature_url", message: "cannot take a path segment".into() });
    }
    Ok(url)
  }

  pub fn clock_period(&self) -> Duration { Duration::from_millis(self.clock_period_ms) }

  pub fn emoji_poll_period(&self) -> Duration { Duration::from_millis(self.emoji_poll_ms) }

  pub fn search_debounce(&self) -> Duration { Duration::from_millis(self.search_debounce_ms) }

  pub fn http_timeout(&self) -> Duration { Duration::from_millis(self.http_timeout_ms) }
}

fn endpoint(field: &'static str, value: &str) -> Result<Url, ConfigError> {
  Url::parse(value).map_err(|e| ConfigError::Invalid { field, message: format!("`{value}`: {e}") })
}
