use futures::{future::LocalBoxFuture, FutureExt};
use tracing::debug;
use url::Url;

use crate::{
  bridge::{AsyncBridge, BridgeState},
  config::{ConfigError, ScreenConfig},
  fetch::{decode, CreatureRecord, Fetch, FetchError},
  observable::{ObservableExt, Relay},
  published::{Observed, Published},
  scheduler::Scheduler,
  subscription::SubscriptionSet,
};

type Lookup = Box<dyn Fn(String) -> LocalBoxFuture<'static, Result<CreatureRecord, FetchError>>>;

/// Search-as-you-type lookup of a single creature.
///
/// Keystrokes go through `set_search_text`. Once the text has been stable for
/// the configured debounce period, the lower-cased term is looked up; a newer
/// term supersedes a lookup still in flight. Failed lookups keep the last
/// creature on screen.
pub struct CreatureSearchController<Sch> {
  search_text: Published<String>,
  input: Relay<String>,
  current_creature: Published<Option<CreatureRecord>>,
  bridge: AsyncBridge<Lookup, Sch>,
  subscriptions: SubscriptionSet,
}

impl<Sch: Scheduler> CreatureSearchController<Sch> {
  /// Fails when `config` does not [validate](ScreenConfig::validate).
  pub fn new<Fe: Fetch>(config: &ScreenConfig, fetcher: Fe, scheduler: Sch) -> Result<Self, ConfigError> {
    config.validate()?;
    let base_url = config.creature_base()?;
    let lookup: Lookup = Box::new(move |term: String| {
      let body = fetcher.fetch(creature_url(&base_url, &term).as_str());
      async move { body.await.and_then(|bytes| decode::<CreatureRecord>(&bytes)) }.boxed_local()
    });
    let bridge = AsyncBridge::new(lookup, scheduler.clone());

    let input = Relay::new();
    let current_creature = Published::new(None);
    let subscriptions = SubscriptionSet::default();

    let (requests, target) = (bridge.clone(), current_creature.clone());
    let search = input
      .clone()
      .debounce(config.search_debounce(), scheduler)
      .map(|text: String| text.trim().to_lowercase())
      .filter(|term: &String| !term.is_empty())
      .subscribe(move |term: String| {
        debug!(%term, "looking up creature");
        requests.request(term).map(Some).assign(&target);
      });
    subscriptions.add(search);

    Ok(CreatureSearchController {
      search_text: Published::default(),
      input,
      current_creature,
      bridge,
      subscriptions,
    })
  }

  pub fn set_search_text(&self, text: impl Into<String>) {
    let text = text.into();
    self.search_text.set(text.clone());
    self.input.push(text);
  }

  pub fn search_text(&self) -> Observed<String> { self.search_text.observe() }

  pub fn current_creature(&self) -> Observed<Option<CreatureRecord>> { self.current_creature.observe() }

  pub fn lookup_state(&self) -> BridgeState { self.bridge.state() }

  pub fn teardown(&self) {
    self.subscriptions.cancel_all();
    self.bridge.cancel();
  }
}

/// `base` with `term` appended as one percent-encoded path segment.
fn creature_url(base: &Url, term: &str) -> Url {
  let mut url = base.clone();
  if let Ok(mut segments) = url.path_segments_mut() {
    segments.pop_if_empty().push(term);
  }
  url
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn term_stays_inside_one_path_segment() {
    let base = Url::parse("https://pokeapi.co/api/v2/pokemon/").unwrap();
    assert_eq!(creature_url(&base, "mr. mime").as_str(), "https://pokeapi.co/api/v2/pokemon/mr.%20mime");
    assert_eq!(creature_url(&base, "a/b?c#d").as_str(), "https://pokeapi.co/api/v2/pokemon/a%2Fb%3Fc%23d");

    let bare = Url::parse("http://localhost:8080/creature").unwrap();
    assert_eq!(creature_url(&bare, "ditto").as_str(), "http://localhost:8080/creature/ditto");
  }
}
