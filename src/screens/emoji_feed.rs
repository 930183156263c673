use futures::{future::LocalBoxFuture, FutureExt};
use tracing::{debug, trace};

use crate::{
  bridge::{AsyncBridge, BridgeState},
  config::{ConfigError, ScreenConfig},
  fetch::{decode, Emoji, EmojiPayload, Fetch, FetchError},
  observable::{self, ObservableExt},
  published::{Observed, Published},
  scheduler::Scheduler,
  subscription::SubscriptionSet,
};

type Lookup = Box<dyn Fn(()) -> LocalBoxFuture<'static, Result<Vec<Emoji>, FetchError>>>;

/// A grid of emojis refreshed from the server on a fixed poll period.
///
/// The first fetch starts on construction. Each poll tick issues a new fetch
/// that supersedes one still in flight; failures keep the current grid.
pub struct EmojiFeedController<Sch> {
  emojis: Published<Vec<Emoji>>,
  bridge: AsyncBridge<Lookup, Sch>,
  subscriptions: SubscriptionSet,
}

impl<Sch: Scheduler> EmojiFeedController<Sch> {
  /// Fails when `config` does not [validate](ScreenConfig::validate); nothing
  /// is fetched or scheduled in that case.
  pub fn new<Fe: Fetch>(config: &ScreenConfig, fetcher: Fe, scheduler: Sch) -> Result<Self, ConfigError> {
    config.validate()?;
    let url = config.emoji_url.clone();
    let lookup: Lookup = Box::new(move |()| {
      let body = fetcher.fetch(&url);
      async move { body.await.and_then(|bytes| decode::<EmojiPayload>(&bytes)).map(EmojiPayload::into_emojis) }
        .boxed_local()
    });

    let controller = EmojiFeedController {
      emojis: Published::default(),
      bridge: AsyncBridge::new(lookup, scheduler.clone()),
      subscriptions: SubscriptionSet::default(),
    };
    controller.fetch_emojis();

    let (requests, target) = (controller.bridge.clone(), controller.emojis.clone());
    let poll = observable::interval(config.emoji_poll_period(), |tick| tick, scheduler).subscribe(move |tick| {
      trace!(tick, "polling emojis");
      requests.request(()).assign(&target);
    });
    controller.subscriptions.add(poll);
    debug!(period = ?config.emoji_poll_period(), "emoji feed started");

    Ok(controller)
  }

  /// Fetch now, superseding a fetch still in flight.
  pub fn fetch_emojis(&self) { self.bridge.request(()).assign(&self.emojis); }

  pub fn emojis(&self) -> Observed<Vec<Emoji>> { self.emojis.observe() }

  pub fn fetch_state(&self) -> BridgeState { self.bridge.state() }

  pub fn teardown(&self) {
    self.subscriptions.cancel_all();
    self.bridge.cancel();
  }
}
