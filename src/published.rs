//! Observable state fields.
//!
//! A controller owns the [`Published`] half of a field and is the only one
//! that writes it, usually through [`ObservableExt::assign`]. Presentation
//! code holds the read-only [`Observed`] half: it can read the value, notice
//! that it changed, and register a watcher, but it cannot write.
//!
//! [`ObservableExt::assign`]: crate::observable::ObservableExt::assign

use std::{cell::Cell, rc::Rc};

use crate::{
  rc::{MutRc, RcDeref, RcDerefMut},
  subscription::Subscription,
};

struct FieldState<T> {
  value: T,
  version: u64,
}

struct Watcher<T> {
  alive: Rc<Cell<bool>>,
  notify: Box<dyn FnMut(&T)>,
}

// Watchers live in their own cell so one can register another while the
// value is borrowed for notification.
struct Field<T> {
  state: MutRc<FieldState<T>>,
  watchers: MutRc<Vec<Watcher<T>>>,
}

impl<T> Clone for Field<T> {
  fn clone(&self) -> Self { Field { state: self.state.clone(), watchers: self.watchers.clone() } }
}

/// The writable half of an observable field.
pub struct Published<T>(Field<T>);

impl<T> Clone for Published<T> {
  fn clone(&self) -> Self { Published(self.0.clone()) }
}

impl<T: Default> Default for Published<T> {
  fn default() -> Self { Self::new(T::default()) }
}

impl<T> Published<T> {
  pub fn new(initial: T) -> Self {
    Published(Field {
      state: MutRc::own(FieldState { value: initial, version: 0 }),
      watchers: MutRc::own(vec![]),
    })
  }

  /// Replace the value and notify every watcher.
  ///
  /// Watchers run after the value is stored. They may read the field and
  /// register new watchers through any [`Observed`] handle; a watcher added
  /// this way is first called on the next write. They must not write the
  /// field back.
  pub fn set(&self, value: T) {
    {
      let mut state = self.0.state.rc_deref_mut();
      state.value = value;
      state.version += 1;
    }

    let mut watchers = std::mem::take(&mut *self.0.watchers.rc_deref_mut());
    {
      let state = self.0.state.rc_deref();
      for watcher in watchers.iter_mut().filter(|w| w.alive.get()) {
        (watcher.notify)(&state.value);
      }
    }

    let mut slot = self.0.watchers.rc_deref_mut();
    watchers.append(&mut *slot);
    watchers.retain(|w| w.alive.get());
    *slot = watchers;
  }

  /// A read-only view for presentation code.
  pub fn observe(&self) -> Observed<T> { Observed(self.0.clone()) }
}

/// The read-only half of an observable field.
pub struct Observed<T>(Field<T>);

impl<T> Clone for Observed<T> {
  fn clone(&self) -> Self { Observed(self.0.clone()) }
}

impl<T> Observed<T> {
  pub fn get(&self) -> T
  where
    T: Clone,
  {
    self.0.state.rc_deref().value.clone()
  }

  /// Borrow the current value.
  pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R { f(&self.0.state.rc_deref().value) }

  /// Number of writes so far. Renderers compare it to skip unchanged frames.
  pub fn version(&self) -> u64 { self.0.state.rc_deref().version }

  /// Call `notify` with the new value after every write.
  pub fn watch(&self, notify: impl FnMut(&T) + 'static) -> WatchHandle {
    let alive = Rc::new(Cell::new(true));
    self.0.watchers.rc_deref_mut().push(Watcher { alive: alive.clone(), notify: Box::new(notify) });
    WatchHandle(alive)
  }
}

/// Stops a watcher registered with [`Observed::watch`].
pub struct WatchHandle(Rc<Cell<bool>>);

impl Subscription for WatchHandle {
  fn unsubscribe(self) { self.0.set(false) }

  fn is_closed(&self) -> bool { !self.0.get() }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use super::*;

  #[test]
  fn set_bumps_version_and_notifies() {
    let field = Published::new(String::from("--:--:--"));
    let view = field.observe();
    let seen = Rc::new(RefCell::new(vec![]));
    let s = seen.clone();
    let _watch = view.watch(move |v: &String| s.borrow_mut().push(v.clone()));

    assert_eq!(view.version(), 0);
    field.set("12:00:00".into());
    field.set("12:00:01".into());

    assert_eq!(view.get(), "12:00:01");
    assert_eq!(view.version(), 2);
    assert_eq!(*seen.borrow(), vec!["12:00:00", "12:00:01"]);
  }

  #[test]
  fn watcher_reads_through_view() {
    let field = Published::new(1);
    let view = field.observe();
    let echo = Rc::new(Cell::new(0));
    let (e, v) = (echo.clone(), view.clone());
    let _watch = view.watch(move |_| e.set(v.get() * 100));

    field.set(7);
    assert_eq!(echo.get(), 700);
  }

  #[test]
  fn watcher_can_register_another_watcher() {
    let field = Published::new(0);
    let view = field.observe();
    let inner_hits = Rc::new(RefCell::new(vec![]));
    let (inner, hits) = (view.clone(), inner_hits.clone());
    let _outer = view.watch(move |v: &i32| {
      if *v == 1 {
        let hits = hits.clone();
        // a child view subscribing while the parent re-renders
        let _child = inner.watch(move |v: &i32| hits.borrow_mut().push(*v));
      }
    });

    field.set(1);
    assert!(inner_hits.borrow().is_empty());
    field.set(2);
    assert_eq!(*inner_hits.borrow(), vec![2]);
  }

  #[test]
  fn stopped_watcher_is_not_called() {
    let field = Published::new(0);
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    let watch = field.observe().watch(move |_| h.set(h.get() + 1));

    field.set(1);
    watch.unsubscribe();
    field.set(2);

    assert_eq!(hits.get(), 1);
    assert_eq!(field.observe().with(|v| *v), 2);
  }
}
