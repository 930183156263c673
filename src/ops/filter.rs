use crate::{
  observable::{Observable, ObservableType},
  observer::Observer,
};

/// Emit only those items from a source that pass a predicate test.
///
/// Dropped values cause no emission and no completion.
///
/// ```
/// use rxscreens::prelude::*;
/// use std::{cell::RefCell, rc::Rc};
///
/// let kept = Rc::new(RefCell::new(vec![]));
/// let k = kept.clone();
/// let relay = Relay::<i32>::new();
/// let handle = relay.clone().filter(|v| v % 2 == 0).subscribe(move |v| k.borrow_mut().push(v));
/// for v in 0..6 {
///   relay.push(v);
/// }
/// handle.unsubscribe();
/// assert_eq!(*kept.borrow(), vec![0, 2, 4]);
/// ```
#[derive(Clone)]
pub struct FilterOp<S, F> {
  pub(crate) source: S,
  pub(crate) filter: F,
}

impl<S, F> ObservableType for FilterOp<S, F>
where
  S: ObservableType,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, F, O> Observable<O> for FilterOp<S, F>
where
  S: Observable<FilterObserver<O, F>>,
  F: FnMut(&S::Item) -> bool,
  O: Observer<S::Item, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(FilterObserver { observer, filter: self.filter })
  }
}

pub struct FilterObserver<O, F> {
  observer: O,
  filter: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for FilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  #[inline]
  fn next(&mut self, value: Item) {
    if (self.filter)(&value) {
      self.observer.next(value)
    }
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
