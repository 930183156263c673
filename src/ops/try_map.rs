use crate::{
  observable::{Observable, ObservableType},
  observer::Observer,
  subscription::{BoxedSubscription, ProxySubscription},
};

/// Applies a partial function, failing the stream on the first rejected
/// value. See [`ObservableExt::try_map`](crate::observable::ObservableExt::try_map).
#[derive(Clone)]
pub struct TryMapOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S, F, B, E> ObservableType for TryMapOp<S, F>
where
  S: ObservableType,
  F: FnMut(S::Item) -> Result<B, E>,
{
  type Item = B;
  type Err = E;
}

impl<S, F, B, E, O> Observable<O> for TryMapOp<S, F>
where
  S: Observable<TryMapObserver<O, F>>,
  S::Unsub: 'static,
  S::Err: Into<E>,
  F: FnMut(S::Item) -> Result<B, E>,
  O: Observer<B, E>,
{
  type Unsub = ProxySubscription<BoxedSubscription>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let upstream = ProxySubscription::new();
    let unsub = self.source.actual_subscribe(TryMapObserver {
      observer: Some(observer),
      func: self.func,
      upstream: upstream.clone(),
    });
    upstream.bind(BoxedSubscription::new(unsub));
    upstream
  }
}

pub struct TryMapObserver<O, F> {
  observer: Option<O>,
  func: F,
  upstream: ProxySubscription<BoxedSubscription>,
}

impl<Item, Err, O, F, B, E> Observer<Item, Err> for TryMapObserver<O, F>
where
  O: Observer<B, E>,
  F: FnMut(Item) -> Result<B, E>,
  Err: Into<E>,
{
  fn next(&mut self, value: Item) {
    let Some(observer) = self.observer.as_mut() else { return };
    match (self.func)(value) {
      Ok(v) => observer.next(v),
      Err(err) => {
        if let Some(observer) = self.observer.take() {
          observer.error(err);
        }
        self.upstream.release();
      }
    }
  }

  fn error(self, err: Err) {
    if let Some(observer) = self.observer {
      observer.error(err.into());
    }
  }

  fn complete(self) {
    if let Some(observer) = self.observer {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.as_ref().map_or(true, Observer::is_closed) }
}
