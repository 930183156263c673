use crate::{
  observable::{Observable, ObservableType},
  observer::Observer,
};

/// Applies a total function to every value. See
/// [`ObservableExt::map`](crate::observable::ObservableExt::map).
#[derive(Clone)]
pub struct MapOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S, F, B> ObservableType for MapOp<S, F>
where
  S: ObservableType,
  F: FnMut(S::Item) -> B,
{
  type Item = B;
  type Err = S::Err;
}

impl<S, F, B, O> Observable<O> for MapOp<S, F>
where
  S: Observable<MapObserver<O, F>>,
  F: FnMut(S::Item) -> B,
  O: Observer<B, S::Err>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(MapObserver { observer, map: self.func })
  }
}

pub struct MapObserver<O, F> {
  observer: O,
  map: F,
}

impl<Item, Err, O, F, B> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next((self.map)(value)) }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
