use crate::{
  observable::{Observable, ObservableType},
  observer::Observer,
  rc::{MutRc, RcDeref, RcDerefMut},
  scheduler::{Duration, Scheduler, Task, TaskHandle, TaskState},
  subscription::{Subscription, TupleSubscription},
};

/// Emits the latest value once the source has been quiet for `duration`.
/// See [`ObservableExt::debounce`](crate::observable::ObservableExt::debounce).
#[derive(Clone)]
pub struct DebounceOp<S, Sch> {
  pub(crate) source: S,
  pub(crate) scheduler: Sch,
  pub(crate) duration: Duration,
}

impl<S: ObservableType, Sch> ObservableType for DebounceOp<S, Sch> {
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, Sch, O> Observable<O> for DebounceOp<S, Sch>
where
  S: Observable<DebounceObserver<O, <S as ObservableType>::Item, Sch>>,
  <S as ObservableType>::Item: 'static,
  <S as ObservableType>::Err: 'static,
  O: Observer<<S as ObservableType>::Item, <S as ObservableType>::Err> + 'static,
  Sch: Scheduler,
{
  type Unsub = TupleSubscription<S::Unsub, DebounceHandle<O, <S as ObservableType>::Item>>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let state = MutRc::own(DebounceState { observer: Some(observer), trailing: None, timer: None, closed: false });
    let unsub = self.source.actual_subscribe(DebounceObserver {
      state: state.clone(),
      scheduler: self.scheduler,
      duration: self.duration,
    });
    TupleSubscription::new(unsub, DebounceHandle(state))
  }
}

struct DebounceState<O, Item> {
  observer: Option<O>,
  trailing: Option<Item>,
  timer: Option<TaskHandle>,
  closed: bool,
}

pub struct DebounceObserver<O, Item, Sch> {
  state: MutRc<DebounceState<O, Item>>,
  scheduler: Sch,
  duration: Duration,
}

impl<O, Item, Err, Sch> Observer<Item, Err> for DebounceObserver<O, Item, Sch>
where
  O: Observer<Item, Err> + 'static,
  Item: 'static,
  Err: 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    let stale = {
      let mut state = self.state.rc_deref_mut();
      if state.closed {
        return;
      }
      state.trailing = Some(value);
      state.timer.take()
    };
    if let Some(timer) = stale {
      timer.cancel();
    }

    let handle =
      self.scheduler.schedule(Task::new(self.state.clone(), debounce_task::<O, Item, Err>), Some(self.duration));
    self.state.rc_deref_mut().timer = Some(handle);
  }

  fn error(self, err: Err) {
    let (observer, timer) = {
      let mut state = self.state.rc_deref_mut();
      state.closed = true;
      state.trailing = None;
      (state.observer.take(), state.timer.take())
    };
    if let Some(timer) = timer {
      timer.cancel();
    }
    if let Some(observer) = observer {
      observer.error(err);
    }
  }

  fn complete(self) {
    let (observer, trailing, timer) = {
      let mut state = self.state.rc_deref_mut();
      state.closed = true;
      (state.observer.take(), state.trailing.take(), state.timer.take())
    };
    if let Some(timer) = timer {
      timer.cancel();
    }
    if let Some(mut observer) = observer {
      if let Some(value) = trailing {
        observer.next(value);
      }
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool {
    let state = self.state.rc_deref();
    state.closed || state.observer.as_ref().is_some_and(Observer::is_closed)
  }
}

fn debounce_task<O, Item, Err>(state: &mut MutRc<DebounceState<O, Item>>) -> TaskState
where
  O: Observer<Item, Err>,
{
  let ready = {
    let mut state = state.rc_deref_mut();
    state.timer = None;
    match state.trailing.take() {
      Some(value) => state.observer.take().map(|observer| (observer, value)),
      None => None,
    }
  };
  if let Some((mut observer, value)) = ready {
    observer.next(value);
    let mut state = state.rc_deref_mut();
    if !state.closed {
      state.observer = Some(observer);
    }
  }
  TaskState::Finished
}

/// Cancels the pending timer and drops the held value and observer.
pub struct DebounceHandle<O, Item>(MutRc<DebounceState<O, Item>>);

impl<O, Item> Subscription for DebounceHandle<O, Item> {
  fn unsubscribe(self) {
    let (timer, observer, trailing) = {
      let mut state = self.0.rc_deref_mut();
      state.closed = true;
      (state.timer.take(), state.observer.take(), state.trailing.take())
    };
    if let Some(timer) = timer {
      timer.cancel();
    }
    drop((observer, trailing));
  }

  fn is_closed(&self) -> bool { self.0.rc_deref().closed }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  fn ms(n: u64) -> Duration { Duration::from_millis(n) }

  #[test]
  fn emits_after_quiet_period() {
    TestScheduler::init();
    let relay = Relay::<i32>::new();
    let seen = Rc::new(RefCell::new(vec![]));
    let s = seen.clone();
    relay.clone().debounce(ms(100), TestScheduler).subscribe(move |v| s.borrow_mut().push((TestScheduler::now(), v)));

    relay.push(1);
    TestScheduler::advance_by(ms(20));
    relay.push(2);
    TestScheduler::advance_by(ms(99));
    assert!(seen.borrow().is_empty());

    TestScheduler::advance_by(ms(1));
    assert_eq!(*seen.borrow(), vec![(ms(120), 2)]);

    relay.push(3);
    TestScheduler::advance_by(ms(200));
    assert_eq!(*seen.borrow(), vec![(ms(120), 2), (ms(220), 3)]);
  }

  #[test]
  fn completion_flushes_trailing_value() {
    TestScheduler::init();
    let relay = Relay::<i32>::new();
    let seen = Rc::new(RefCell::new(vec![]));
    let s = seen.clone();
    let done = Rc::new(RefCell::new(false));
    let d = done.clone();
    relay
      .clone()
      .debounce(ms(100), TestScheduler)
      .subscribe_sink(move |v| s.borrow_mut().push(v), move |_| *d.borrow_mut() = true);

    relay.push(7);
    relay.complete();
    assert_eq!(*seen.borrow(), vec![7]);
    assert!(*done.borrow());
    assert_eq!(TestScheduler::pending_count(), 0);
  }

  #[test]
  fn unsubscribe_drops_pending_value() {
    TestScheduler::init();
    let relay = Relay::<i32>::new();
    let seen = Rc::new(RefCell::new(vec![]));
    let s = seen.clone();
    let handle = relay.clone().debounce(ms(100), TestScheduler).subscribe(move |v| s.borrow_mut().push(v));

    relay.push(1);
    handle.unsubscribe();
    TestScheduler::flush();

    assert!(seen.borrow().is_empty());
    assert!(!relay.has_subscriber());
  }
}
