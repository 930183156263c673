//! Remote data: the fetch collaborator, its failures, and the payload records
//! the screens decode.

#[cfg(feature = "http")]
use std::time::Duration;

use futures::future::LocalBoxFuture;
#[cfg(feature = "http")]
use futures::FutureExt;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
#[cfg(feature = "http")]
use tracing::{debug, trace};

/// Why a remote request produced no record.
#[derive(Debug, Error)]
pub enum FetchError {
  /// Connection, DNS or timeout failure.
  #[error("transport error: {0}")]
  Transport(String),

  #[error("unexpected response status: {0}")]
  BadStatus(u16),

  #[error("payload does not match the expected shape: {0}")]
  Decode(#[from] serde_json::Error),
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for FetchError {
  fn from(err: reqwest::Error) -> Self { FetchError::Transport(err.to_string()) }
}

/// Asynchronous GET returning the raw body.
///
/// Futures run on a single execution context and need not be `Send`.
pub trait Fetch: 'static {
  fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, FetchError>>;
}

impl<F: Fetch + ?Sized> Fetch for std::rc::Rc<F> {
  fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, FetchError>> { (**self).fetch(url) }
}

/// Decode a JSON body into `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, FetchError> { Ok(serde_json::from_slice(bytes)?) }

/// [`Fetch`] over HTTP. Only `200 OK` counts as success.
#[cfg(feature = "http")]
#[derive(Clone, Debug)]
pub struct HttpFetcher {
  client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
  pub fn new(timeout: Duration) -> Result<Self, FetchError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(HttpFetcher { client })
  }
}

#[cfg(feature = "http")]
impl Fetch for HttpFetcher {
  fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, FetchError>> {
    let request = self.client.get(url);
    let url = url.to_owned();
    async move {
      trace!(%url, "GET");
      let response = request.send().await?;
      let status = response.status();
      if status != reqwest::StatusCode::OK {
        debug!(%url, %status, "request rejected");
        return Err(FetchError::BadStatus(status.as_u16()));
      }
      let body = response.bytes().await?;
      Ok(body.to_vec())
    }
    .boxed_local()
  }
}

// ==================== Payload records ====================

/// Body of the emoji endpoint: `{"emojis": ["😀", ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmojiPayload {
  pub emojis: Vec<String>,
}

/// One cell of the emoji grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emoji {
  /// Position in the received list.
  pub id: usize,
  pub emoji: String,
}

impl EmojiPayload {
  /// Number the entries by position.
  pub fn into_emojis(self) -> Vec<Emoji> {
    self.emojis.into_iter().enumerate().map(|(id, emoji)| Emoji { id, emoji }).collect()
  }
}

/// A creature as the search screen shows it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "CreatureWire")]
pub struct CreatureRecord {
  pub name: String,
  pub id: u32,
  pub sprite_url: String,
}

#[derive(Deserialize)]
struct CreatureWire {
  name: String,
  id: u32,
  sprites: Sprites,
}

#[derive(Deserialize)]
struct Sprites {
  front_default: String,
}

impl From<CreatureWire> for CreatureRecord {
  fn from(wire: CreatureWire) -> Self {
    CreatureRecord { name: wire.name, id: wire.id, sprite_url: wire.sprites.front_default }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_creature_and_ignores_extra_fields() {
    let body = br#"{
      "name": "pikachu",
      "id": 25,
      "height": 4,
      "sprites": { "front_default": "https://img.example/25.png", "back_default": null }
    }"#;
    let record: CreatureRecord = decode(body).unwrap();
    assert_eq!(
      record,
      CreatureRecord { name: "pikachu".into(), id: 25, sprite_url: "https://img.example/25.png".into() }
    );
  }

  #[test]
  fn missing_field_is_a_decode_error() {
    let err = decode::<CreatureRecord>(br#"{"name": "ditto", "id": 132}"#).unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
  }

  #[test]
  fn emojis_are_numbered_by_position() {
    let payload: EmojiPayload = decode(r#"{"emojis": ["🐶", "🐱"]}"#.as_bytes()).unwrap();
    assert_eq!(
      payload.into_emojis(),
      vec![Emoji { id: 0, emoji: "🐶".into() }, Emoji { id: 1, emoji: "🐱".into() }]
    );
  }

  #[test]
  fn bad_status_message() {
    assert_eq!(FetchError::BadStatus(404).to_string(), "unexpected response status: 404");
  }
}
