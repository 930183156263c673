use std::convert::Infallible;

use super::{Observable, ObservableType};
use crate::{
  observer::Observer,
  scheduler::{Duration, Scheduler, Task, TaskHandle, TaskState},
};

/// Creates a periodic source.
///
/// The first tick fires one `period` after subscribing and then every
/// `period`, each emitting `payload(seq)` with `seq` counting from zero.
/// The source never completes; cancelling its handle stops it silently.
/// `period` must be non-zero: a zero period re-runs the tick without ever
/// letting virtual or wall-clock time advance.
pub fn interval<F, Item, Sch>(period: Duration, payload: F, scheduler: Sch) -> IntervalObservable<F, Sch>
where
  F: FnMut(usize) -> Item,
  Sch: Scheduler,
{
  IntervalObservable { period, payload, scheduler }
}

#[derive(Clone)]
pub struct IntervalObservable<F, Sch> {
  period: Duration,
  payload: F,
  scheduler: Sch,
}

impl<F, Item, Sch> ObservableType for IntervalObservable<F, Sch>
where
  F: FnMut(usize) -> Item,
{
  type Item = Item;
  type Err = Infallible;
}

impl<F, Item, Sch, O> Observable<O> for IntervalObservable<F, Sch>
where
  F: FnMut(usize) -> Item + 'static,
  Sch: Scheduler,
  O: Observer<Item, Infallible> + 'static,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, observer: O) -> TaskHandle {
    let Self { period, payload, scheduler } = self;
    let state = IntervalState { observer, payload, period, seq: 0 };
    scheduler.schedule(Task::new(state, interval_task::<O, F, Item>), Some(period))
  }
}

struct IntervalState<O, F> {
  observer: O,
  payload: F,
  period: Duration,
  seq: usize,
}

fn interval_task<O, F, Item>(state: &mut IntervalState<O, F>) -> TaskState
where
  O: Observer<Item, Infallible>,
  F: FnMut(usize) -> Item,
{
  if state.observer.is_closed() {
    return TaskState::Finished;
  }
  let value = (state.payload)(state.seq);
  state.seq += 1;
  state.observer.next(value);
  if state.observer.is_closed() { TaskState::Finished } else { TaskState::Sleeping(state.period) }
}
