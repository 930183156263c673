//! Value sources and the operator chain built on them.
//!
//! An observable is a recipe, not a value: nothing happens until it is
//! subscribed, and each subscription is an independent activation with its own
//! [`Subscription`] handle.

use crate::{
  observer::{FnMutObserver, Sink},
  ops::{
    assign::AssignObserver,
    debounce::DebounceOp,
    filter::FilterOp,
    map::MapOp,
    observe_on::ObserveOnOp,
    throttle_time::{ThrottleEdge, ThrottleTimeOp},
    try_map::TryMapOp,
  },
  published::Published,
  scheduler::{Duration, Scheduler},
  subscription::Subscription,
};

pub mod interval;
pub mod of;
pub mod relay;

pub use interval::{interval, IntervalObservable};
pub use of::{of, Of};
pub use relay::Relay;

/// The value and failure types a source emits.
pub trait ObservableType {
  type Item;
  type Err;
}

/// A source that can be subscribed by an observer of type `O`.
pub trait Observable<O>: ObservableType {
  type Unsub: Subscription;

  /// Start one activation delivering to `observer`.
  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

/// Operator constructors and terminal subscribers, available on every source.
///
/// The set is closed: `map`/`try_map`, `filter`, `debounce`,
/// `throttle_time`, `observe_on`, and the `subscribe`/`subscribe_sink`/
/// `assign` terminals.
pub trait ObservableExt: ObservableType + Sized {
  /// Emit `f(v)` for every upstream value `v`.
  fn map<B, F>(self, f: F) -> MapOp<Self, F>
  where
    F: FnMut(Self::Item) -> B,
  {
    MapOp { source: self, func: f }
  }

  /// Like [`map`](ObservableExt::map) for a partial `f`.
  ///
  /// The first `Err(e)` is delivered downstream as a failure and the upstream
  /// subscription is released; nothing after it is processed. Upstream
  /// failures are converted with `Into`.
  fn try_map<B, E, F>(self, f: F) -> TryMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> Result<B, E>,
    Self::Err: Into<E>,
  {
    TryMapOp { source: self, func: f }
  }

  /// Emit only the values for which `predicate` holds.
  fn filter<F>(self, predicate: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    FilterOp { source: self, filter: predicate }
  }

  /// Emit a value only once `duration` has passed without a newer one.
  ///
  /// ```rust
  /// use rxscreens::prelude::*;
  /// use std::{cell::RefCell, rc::Rc};
  ///
  /// TestScheduler::init();
  /// let relay = Relay::<&str>::new();
  /// let seen = Rc::new(RefCell::new(vec![]));
  /// let s = seen.clone();
  /// relay
  ///   .clone()
  ///   .debounce(Duration::from_millis(500), TestScheduler)
  ///   .subscribe(move |v| s.borrow_mut().push(v));
  ///
  /// relay.push("p");
  /// relay.push("pi");
  /// relay.push("pik");
  /// TestScheduler::advance_by(Duration::from_millis(500));
  /// assert_eq!(*seen.borrow(), vec!["pik"]);
  /// ```
  fn debounce<Sch: Scheduler>(self, duration: Duration, scheduler: Sch) -> DebounceOp<Self, Sch> {
    DebounceOp { source: self, scheduler, duration }
  }

  /// Emit at most one value per `duration` window.
  fn throttle_time<Sch: Scheduler>(
    self, duration: Duration, edge: ThrottleEdge, scheduler: Sch,
  ) -> ThrottleTimeOp<Self, Sch> {
    ThrottleTimeOp { source: self, duration, edge, scheduler }
  }

  /// Re-deliver every event as a task on `scheduler`.
  fn observe_on<Sch: Scheduler>(self, scheduler: Sch) -> ObserveOnOp<Self, Sch> {
    ObserveOnOp { source: self, scheduler }
  }

  /// Subscribe with a value callback; completion and failure are ignored.
  fn subscribe<F>(self, next: F) -> <Self as Observable<FnMutObserver<F>>>::Unsub
  where
    F: FnMut(Self::Item),
    Self: Observable<FnMutObserver<F>>,
  {
    self.actual_subscribe(FnMutObserver(next))
  }

  /// Subscribe with a value callback and a completion callback receiving
  /// `None` on normal completion or `Some(err)` on failure.
  fn subscribe_sink<N, C>(self, on_value: N, on_complete: C) -> <Self as Observable<Sink<N, C>>>::Unsub
  where
    N: FnMut(Self::Item),
    C: FnOnce(Option<Self::Err>),
    Self: Observable<Sink<N, C>>,
  {
    self.actual_subscribe(Sink::new(on_value, on_complete))
  }

  /// Store every value into `target`, the one mutation point of an observed
  /// field.
  fn assign(
    self, target: &Published<<Self as ObservableType>::Item>,
  ) -> <Self as Observable<AssignObserver<<Self as ObservableType>::Item>>>::Unsub
  where
    Self: Observable<AssignObserver<<Self as ObservableType>::Item>>,
  {
    self.actual_subscribe(AssignObserver::new(target.clone()))
  }
}

impl<T: ObservableType> ObservableExt for T {}

