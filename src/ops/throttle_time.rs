use crate::{
  observable::{Observable, ObservableType},
  observer::Observer,
  rc::{MutRc, RcDeref, RcDerefMut},
  scheduler::{Duration, Scheduler, Task, TaskHandle, TaskState},
  subscription::{Subscription, TupleSubscription},
};

/// Which value of a throttle window gets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThrottleEdge {
  /// The first value, emitted immediately; the rest of the window is dropped.
  #[default]
  Leading,
  /// The latest value, emitted when the window closes.
  Trailing,
}

/// Emits at most one value per `duration` window. See
/// [`ObservableExt::throttle_time`](crate::observable::ObservableExt::throttle_time).
#[derive(Clone)]
pub struct ThrottleTimeOp<S, Sch> {
  pub(crate) source: S,
  pub(crate) duration: Duration,
  pub(crate) edge: ThrottleEdge,
  pub(crate) scheduler: Sch,
}

impl<S: ObservableType, Sch> ObservableType for ThrottleTimeOp<S, Sch> {
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, Sch, O> Observable<O> for ThrottleTimeOp<S, Sch>
where
  S: Observable<ThrottleObserver<O, <S as ObservableType>::Item, Sch>>,
  <S as ObservableType>::Item: 'static,
  <S as ObservableType>::Err: 'static,
  O: Observer<<S as ObservableType>::Item, <S as ObservableType>::Err> + 'static,
  Sch: Scheduler,
{
  type Unsub = TupleSubscription<S::Unsub, ThrottleHandle<O, <S as ObservableType>::Item>>;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    let state = MutRc::own(ThrottleState {
      observer: Some(observer),
      trailing: None,
      window: None,
      edge: self.edge,
      closed: false,
    });
    let unsub = self.source.actual_subscribe(ThrottleObserver {
      state: state.clone(),
      scheduler: self.scheduler,
      duration: self.duration,
    });
    TupleSubscription::new(unsub, ThrottleHandle(state))
  }
}

struct ThrottleState<O, Item> {
  observer: Option<O>,
  trailing: Option<Item>,
  window: Option<TaskHandle>,
  edge: ThrottleEdge,
  closed: bool,
}

pub struct ThrottleObserver<O, Item, Sch> {
  state: MutRc<ThrottleState<O, Item>>,
  scheduler: Sch,
  duration: Duration,
}

impl<O, Item, Err, Sch> Observer<Item, Err> for ThrottleObserver<O, Item, Sch>
where
  O: Observer<Item, Err> + 'static,
  Item: 'static,
  Err: 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    let (open_window, immediate) = {
      let mut state = self.state.rc_deref_mut();
      if state.closed {
        return;
      }
      let open_window = state.window.is_none();
      match (state.edge, open_window) {
        (ThrottleEdge::Leading, true) => (true, Some(value)),
        (ThrottleEdge::Leading, false) => (false, None),
        (ThrottleEdge::Trailing, _) => {
          state.trailing = Some(value);
          (open_window, None)
        }
      }
    };

    if open_window {
      let handle =
        self.scheduler.schedule(Task::new(self.state.clone(), window_task::<O, Item, Err>), Some(self.duration));
      self.state.rc_deref_mut().window = Some(handle);
    }
    if let Some(value) = immediate {
      emit::<O, Item, Err>(&self.state, value);
    }
  }

  fn error(self, err: Err) {
    let (observer, window) = {
      let mut state = self.state.rc_deref_mut();
      state.closed = true;
      state.trailing = None;
      (state.observer.take(), state.window.take())
    };
    if let Some(window) = window {
      window.cancel();
    }
    if let Some(observer) = observer {
      observer.error(err);
    }
  }

  fn complete(self) {
    let (observer, trailing, window) = {
      let mut state = self.state.rc_deref_mut();
      state.closed = true;
      (state.observer.take(), state.trailing.take(), state.window.take())
    };
    if let Some(window) = window {
      window.cancel();
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

fn emit<O, Item, Err>(state: &MutRc<ThrottleState<O, Item>>, value: Item)
where
  O: Observer<Item, Err>,
{
  let taken = state.rc_deref_mut().observer.take();
  if let Some(mut observer) = taken {
    observer.next(value);
    let mut state = state.rc_deref_mut();
    if !state.closed {
      state.observer = Some(observer);
    }
  }
}

fn window_task<O, Item, Err>(state: &mut MutRc<ThrottleState<O, Item>>) -> TaskState
where
  O: Observer<Item, Err>,
{
  let trailing = {
    let mut state = state.rc_deref_mut();
    state.window = None;
    state.trailing.take()
  };
  if let Some(value) = trailing {
    emit::<O, Item, Err>(state, value);
  }
  TaskState::Finished
}

/// Closes the current window and drops whatever it held.
pub struct ThrottleHandle<O, Item>(MutRc<ThrottleState<O, Item>>);

impl<O, Item> Subscription for ThrottleHandle<O, Item> {
  fn unsubscribe(self) {
    let (window, observer, trailing) = {
      let mut state = self.0.rc_deref_mut();
      state.closed = true;
      (state.window.take(), state.observer.take(), state.trailing.take())
    };
    if let Some(window) = window {
      window.cancel();
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

  fn throttled(edge: ThrottleEdge) -> (Relay<i32>, Rc<RefCell<Vec<(Duration, i32)>>>) {
    TestScheduler::init();
    let relay = Relay::new();
    let seen = Rc::new(RefCell::new(vec![]));
    let s = seen.clone();
    relay
      .clone()
      .throttle_time(ms(100), edge, TestScheduler)
      .subscribe(move |v| s.borrow_mut().push((TestScheduler::now(), v)));
    (relay, seen)
  }

  #[test]
  fn leading_edge_passes_first_of_window() {
    let (relay, seen) = throttled(ThrottleEdge::Leading);
    relay.push(1);
    TestScheduler::advance_by(ms(30));
    relay.push(2);
    TestScheduler::advance_by(ms(70));
    relay.push(3);

    assert_eq!(*seen.borrow(), vec![(ms(0), 1), (ms(100), 3)]);
  }

  #[test]
  fn trailing_edge_passes_latest_at_window_end() {
    let (relay, seen) = throttled(ThrottleEdge::Trailing);
    relay.push(1);
    TestScheduler::advance_by(ms(30));
    relay.push(2);
    TestScheduler::advance_by(ms(70));

    assert_eq!(*seen.borrow(), vec![(ms(100), 2)]);
  }
}
