use std::{collections::VecDeque, convert::Infallible};

use super::{Observable, ObservableType};
use crate::{
  observer::{BoxedObserver, Observer},
  rc::{MutRc, RcDeref, RcDerefMut},
  subscription::Subscription,
};

/// A push source with a single subscriber.
///
/// A relay stands in for an input property a controller publishes (a text
/// field, a toggle): the controller pushes values in, one pipeline reads them.
/// Subscribing again replaces the previous subscriber, which is dropped
/// without a completion. Values pushed while nobody is subscribed are lost.
pub struct Relay<Item, Err = Infallible>(MutRc<RelayState<Item, Err>>);

struct RelayState<Item, Err> {
  subscriber: Option<BoxedObserver<'static, Item, Err>>,
  /// Identifies the current subscriber so a stale handle cannot detach a
  /// newer one.
  generation: usize,
  completed: bool,
  /// Set while the subscriber is out of the cell running `next`.
  delivering: bool,
  /// Events raised from inside `next`, delivered in order once it returns.
  queued: VecDeque<Event<Item, Err>>,
}

enum Event<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

impl<Item, Err> Clone for Relay<Item, Err> {
  fn clone(&self) -> Self { Relay(self.0.clone()) }
}

impl<Item, Err> Default for Relay<Item, Err> {
  fn default() -> Self {
    Relay(MutRc::own(RelayState {
      subscriber: None,
      generation: 0,
      completed: false,
      delivering: false,
      queued: VecDeque::new(),
    }))
  }
}

impl<Item, Err> Relay<Item, Err> {
  pub fn new() -> Self { Self::default() }

  /// Deliver `value` to the current subscriber, if any.
  ///
  /// A push made from inside the subscriber's own `next` is queued and
  /// delivered right after it returns.
  pub fn push(&self, value: Item) { self.deliver(value, false) }

  fn deliver(&self, value: Item, replaying: bool) {
    let (mut subscriber, generation) = {
      let mut state = self.0.rc_deref_mut();
      if state.completed && !replaying {
        return;
      }
      if state.delivering {
        state.queued.push_back(Event::Next(value));
        return;
      }
      let Some(subscriber) = state.subscriber.take() else { return };
      state.delivering = true;
      (subscriber, state.generation)
    };

    subscriber.next(value);
    loop {
      let mut state = self.0.rc_deref_mut();
      let current = state.generation == generation && state.subscriber.is_none();
      if !current || subscriber.is_closed() {
        state.delivering = false;
        let leftover = std::mem::take(&mut state.queued);
        drop(state);
        drop(subscriber);
        self.replay(leftover);
        return;
      }
      let event = state.queued.pop_front();
      match event {
        None => {
          state.delivering = false;
          state.subscriber = Some(subscriber);
          return;
        }
        Some(Event::Next(value)) => {
          drop(state);
          subscriber.next(value);
        }
        Some(Event::Error(err)) => {
          state.delivering = false;
          state.queued.clear();
          drop(state);
          subscriber.error(err);
          return;
        }
        Some(Event::Complete) => {
          state.delivering = false;
          state.queued.clear();
          drop(state);
          subscriber.complete();
          return;
        }
      }
    }
  }

  /// Complete the current subscriber. Later subscribers complete at once.
  pub fn complete(&self) {
    let taken = {
      let mut state = self.0.rc_deref_mut();
      if state.completed {
        return;
      }
      state.completed = true;
      if state.delivering {
        state.queued.push_back(Event::Complete);
        return;
      }
      state.subscriber.take()
    };
    if let Some(subscriber) = taken {
      subscriber.complete();
    }
  }

  /// Fail the current subscriber and detach it.
  pub fn error(&self, err: Err) {
    let taken = {
      let mut state = self.0.rc_deref_mut();
      if state.delivering {
        state.queued.push_back(Event::Error(err));
        return;
      }
      state.subscriber.take()
    };
    if let Some(subscriber) = taken {
      subscriber.error(err);
    }
  }

  // events queued for a subscriber that went away mid-delivery go to
  // whoever is subscribed now
  fn replay(&self, events: VecDeque<Event<Item, Err>>) {
    for event in events {
      match event {
        Event::Next(value) => self.deliver(value, true),
        Event::Error(err) => self.error(err),
        Event::Complete => {
          let taken = self.0.rc_deref_mut().subscriber.take();
          if let Some(subscriber) = taken {
            subscriber.complete();
          }
        }
      }
    }
  }

  pub fn has_subscriber(&self) -> bool { self.0.rc_deref().subscriber.is_some() }
}

impl<Item, Err> ObservableType for Relay<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err, O> Observable<O> for Relay<Item, Err>
where
  O: Observer<Item, Err> + 'static,
  Item: 'static,
  Err: 'static,
{
  type Unsub = RelaySubscription<Item, Err>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let mut state = self.0.rc_deref_mut();
    if state.completed {
      drop(state);
      observer.complete();
      return RelaySubscription { relay: self.0, generation: None };
    }
    state.generation += 1;
    state.subscriber = Some(Box::new(observer));
    let generation = Some(state.generation);
    drop(state);
    RelaySubscription { relay: self.0, generation }
  }
}

/// Handle detaching one subscriber from a [`Relay`].
pub struct RelaySubscription<Item, Err> {
  relay: MutRc<RelayState<Item, Err>>,
  generation: Option<usize>,
}

impl<Item, Err> Subscription for RelaySubscription<Item, Err> {
  fn unsubscribe(self) {
    let detached = {
      let mut state = self.relay.rc_deref_mut();
      if self.generation == Some(state.generation) {
        // retire the generation so a delivery in flight does not reattach it
        state.generation += 1;
        state.subscriber.take()
      } else {
        None
      }
    };
    drop(detached);
  }

  fn is_closed(&self) -> bool {
    let state = self.relay.rc_deref();
    self.generation != Some(state.generation) || (state.subscriber.is_none() && !state.delivering)
  }
}
