use crate::{
  observable::{Observable, ObservableType},
  observer::Observer,
  rc::{MutRc, RcDerefMut},
  scheduler::{Scheduler, Task, TaskState},
  subscription::{Subscription, SubscriptionSet, TupleSubscription},
};

/// Moves delivery onto a scheduler. See
/// [`ObservableExt::observe_on`](crate::observable::ObservableExt::observe_on).
#[derive(Clone)]
pub struct ObserveOnOp<S, Sch> {
  pub(crate) source: S,
  pub(crate) scheduler: Sch,
}

impl<S: ObservableType, Sch> ObservableType for ObserveOnOp<S, Sch> {
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, Sch, O> Observable<O> for ObserveOnOp<S, Sch>
where
  S: Observable<ObserveOnObserver<O, Sch>>,
  S::Item: 'static,
  S::Err: 'static,
  O: Observer<S::Item, S::Err> + 'static,
  Sch: Scheduler,
{
  type Unsub = TupleSubscription<S::Unsub, ObserveOnHandle<O>>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let observer = MutRc::own(Some(observer));
    let queued = SubscriptionSet::default();
    let unsub = self.source.actual_subscribe(ObserveOnObserver {
      observer: observer.clone(),
      scheduler: self.scheduler,
      queued: queued.clone(),
    });
    TupleSubscription::new(unsub, ObserveOnHandle { observer, queued })
  }
}

pub struct ObserveOnObserver<O, Sch> {
  observer: MutRc<Option<O>>,
  scheduler: Sch,
  queued: SubscriptionSet,
}

impl<Item, Err, O, Sch> Observer<Item, Err> for ObserveOnObserver<O, Sch>
where
  Item: 'static,
  Err: 'static,
  O: Observer<Item, Err> + 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    let task = Task::new((self.observer.clone(), Some(value)), |(observer, value)| {
      if let Some(value) = value.take() {
        Observer::<Item, Err>::next(observer, value);
      }
      TaskState::Finished
    });
    self.queued.add(self.scheduler.schedule(task, None));
  }

  fn error(self, err: Err) {
    let task = Task::new(Some((self.observer, err)), |slot| {
      if let Some((observer, err)) = slot.take() {
        Observer::<Item, Err>::error(observer, err);
      }
      TaskState::Finished
    });
    self.queued.add(self.scheduler.schedule(task, None));
  }

  fn complete(self) {
    let task = Task::new(Some(self.observer), |slot| {
      if let Some(observer) = slot.take() {
        Observer::<Item, Err>::complete(observer);
      }
      TaskState::Finished
    });
    self.queued.add(self.scheduler.schedule(task, None));
  }

  fn is_closed(&self) -> bool { Observer::<Item, Err>::is_closed(&self.observer) }
}

/// Drops every event that was queued but not yet delivered.
pub struct ObserveOnHandle<O> {
  observer: MutRc<Option<O>>,
  queued: SubscriptionSet,
}

impl<O> Subscription for ObserveOnHandle<O> {
  fn unsubscribe(self) {
    self.queued.cancel_all();
    let observer = self.observer.rc_deref_mut().take();
    drop(observer);
  }

  fn is_closed(&self) -> bool { self.queued.is_closed() }
}
