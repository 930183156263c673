//! Observer trait and implementations
//!
//! The Observer trait is the terminal consumer of a pipeline. It receives
//! values through `next` and exactly one terminal notice through either
//! `error` or `complete`.

use crate::rc::{MutRc, RcDeref, RcDerefMut};

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: the consumer of values in a pipeline
///
/// `error` and `complete` take `self` by value, so once a terminal notice has
/// been delivered the observer is gone and no further `next` call can reach
/// it.
pub trait Observer<Item, Err> {
  /// Receive the next value from the source
  fn next(&mut self, value: Item);

  /// Receive a failure. This consumes the observer.
  fn error(self, err: Err);

  /// Receive completion. This consumes the observer.
  fn complete(self);

  /// Checks if the observer is closed.
  ///
  /// Sources that emit repeatedly (like `interval`) poll this before each
  /// emission and stop once it returns `true`.
  fn is_closed(&self) -> bool;
}

// ============================================================================
// DynObserver Trait - Object-safe Observer
// ============================================================================

/// Object-safe mirror of [`Observer`], for sources that store their
/// subscriber behind a `Box` (like [`Relay`](crate::observable::Relay)).
pub trait DynObserver<Item, Err> {
  fn box_next(&mut self, value: Item);
  fn box_error(self: Box<Self>, err: Err);
  fn box_complete(self: Box<Self>);
  fn box_is_closed(&self) -> bool;
}

impl<T, Item, Err> DynObserver<Item, Err> for T
where
  T: Observer<Item, Err>,
{
  fn box_next(&mut self, value: Item) { self.next(value); }
  fn box_error(self: Box<Self>, err: Err) { (*self).error(err); }
  fn box_complete(self: Box<Self>) { (*self).complete(); }
  fn box_is_closed(&self) -> bool { self.is_closed() }
}

/// Boxed observer, single execution context.
pub type BoxedObserver<'a, Item, Err> = Box<dyn DynObserver<Item, Err> + 'a>;

impl<'a, Item, Err> Observer<Item, Err> for BoxedObserver<'a, Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).box_next(value) }

  #[inline]
  fn error(self, err: Err) { self.box_error(err) }

  #[inline]
  fn complete(self) { self.box_complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).box_is_closed() }
}

// ============================================================================
// FnMutObserver - Closure adapter
// ============================================================================

/// A closure used as the `next` handler.
///
/// Completion and failure are ignored, which is the behaviour of a sink with an
/// empty completion handler.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item, Err> Observer<Item, Err> for FnMutObserver<F>
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, v: Item) { (self.0)(v); }

  #[inline]
  fn error(self, _err: Err) {}

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { false }
}

// ============================================================================
// Sink - value and completion callbacks
// ============================================================================

/// A pair of callbacks: `on_value(v)` for every value and
/// `on_complete(reason)` once, with `None` for a normal completion and
/// `Some(err)` for a failure.
///
/// ```rust
/// use rxscreens::prelude::*;
/// use std::convert::Infallible;
///
/// let mut seen = vec![];
/// let mut finished = None;
/// observable::of(3).subscribe_sink(
///   |v| seen.push(v),
///   |reason: Option<Infallible>| finished = Some(reason.is_none()),
/// );
/// assert_eq!(seen, vec![3]);
/// assert_eq!(finished, Some(true));
/// ```
pub struct Sink<N, C> {
  on_value: N,
  on_complete: C,
}

impl<N, C> Sink<N, C> {
  pub fn new(on_value: N, on_complete: C) -> Self { Sink { on_value, on_complete } }
}

impl<Item, Err, N, C> Observer<Item, Err> for Sink<N, C>
where
  N: FnMut(Item),
  C: FnOnce(Option<Err>),
{
  #[inline]
  fn next(&mut self, value: Item) { (self.on_value)(value); }

  #[inline]
  fn error(self, err: Err) { (self.on_complete)(Some(err)); }

  #[inline]
  fn complete(self) { (self.on_complete)(None); }

  #[inline]
  fn is_closed(&self) -> bool { false }
}

// ============================================================================
// Observer implementations for Option and shared Option wrappers
// ============================================================================

/// Option observer - None ignores all events, Some delegates to inner
impl<O, Item, Err> Observer<Item, Err> for Option<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(inner) = self {
      inner.next(value);
    }
  }

  fn error(self, err: Err) {
    if let Some(inner) = self {
      inner.error(err);
    }
  }

  fn complete(self) {
    if let Some(inner) = self {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().map_or(true, Observer::is_closed) }
}

/// Shared ownership observer. Terminal events `take()` the inner observer, so
/// whichever clone delivers the first terminal event closes all of them.
///
/// The inner observer is moved out of the cell while `next` runs, so a
/// downstream callback that re-enters the same pipeline does not hit an
/// outstanding borrow. Events delivered re-entrantly during that window are
/// dropped.
impl<O, Item, Err> Observer<Item, Err> for MutRc<Option<O>>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    let taken = self.rc_deref_mut().take();
    if let Some(mut inner) = taken {
      inner.next(value);
      let mut slot = self.rc_deref_mut();
      if slot.is_none() {
        *slot = Some(inner);
      }
    }
  }

  fn error(self, err: Err) {
    let taken = self.rc_deref_mut().take();
    if let Some(inner) = taken {
      inner.error(err);
    }
  }

  fn complete(self) {
    let taken = self.rc_deref_mut().take();
    if let Some(inner) = taken {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { self.rc_deref().as_ref().map_or(true, Observer::is_closed) }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  struct TestObserver {
    values: Vec<i32>,
  }

  impl Observer<i32, ()> for TestObserver {
    fn next(&mut self, value: i32) { self.values.push(value); }

    fn error(self, _: ()) {}

    fn complete(self) {}

    fn is_closed(&self) -> bool { false }
  }

  #[test]
  fn test_observer_trait() {
    let mut obs = TestObserver { values: vec![] };
    obs.next(1);
    obs.next(2);
    assert_eq!(obs.values, vec![1, 2]);
    assert!(!obs.is_closed());
  }

  #[test]
  fn test_closure_as_observer() {
    let mut count = 0;
    let mut closure_obs = FnMutObserver(|v: i32| {
      count += v;
    });

    Observer::<i32, ()>::next(&mut closure_obs, 10);
    Observer::<i32, ()>::next(&mut closure_obs, 20);
    assert_eq!(count, 30);
  }

  #[test]
  fn sink_reports_reason() {
    let reasons = Rc::new(RefCell::new(vec![]));

    let r = reasons.clone();
    let sink = Sink::new(|_: i32| {}, move |reason: Option<&'static str>| r.borrow_mut().push(reason));
    Observer::<i32, &'static str>::error(sink, "boom");

    let r = reasons.clone();
    let sink = Sink::new(|_: i32| {}, move |reason: Option<&'static str>| r.borrow_mut().push(reason));
    Observer::<i32, &'static str>::complete(sink);

    assert_eq!(*reasons.borrow(), vec![Some("boom"), None]);
  }

  #[test]
  fn shared_observer_closes_all_clones() {
    let hits = Rc::new(RefCell::new(0));
    let h = hits.clone();
    let shared = MutRc::own(Some(FnMutObserver(move |_: i32| *h.borrow_mut() += 1)));
    let mut other = shared.clone();

    Observer::<i32, ()>::complete(shared);
    Observer::<i32, ()>::next(&mut other, 1);

    assert_eq!(*hits.borrow(), 0);
    assert!(Observer::<i32, ()>::is_closed(&other));
  }
}
