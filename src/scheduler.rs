//! Execution contexts
//!
//! A [`Scheduler`] is the single execution context a pipeline delivers on.
//! Timer-driven sources, debounce timers and the async bridge all hand their
//! work to one, so every emission of a subscription happens on the same
//! logical timeline.
//!
//! Two contexts ship with the crate:
//!
//! - [`LocalScheduler`] (feature `tokio-scheduler`): a tokio `LocalSet`, the
//!   main loop of an application.
//! - [`TestScheduler`](test_scheduler::TestScheduler): virtual time for
//!   deterministic tests.

use std::{
  cell::{Cell, RefCell},
  future::Future,
  pin::Pin,
  rc::Rc,
  task::{Context, Poll},
};

pub use std::time::Duration;

use futures::ready;
use pin_project_lite::pin_project;

use crate::subscription::Subscription;

#[cfg(feature = "tokio-scheduler")]
mod local_scheduler;
pub mod test_scheduler;

#[cfg(feature = "tokio-scheduler")]
pub use local_scheduler::LocalScheduler;
pub use test_scheduler::TestScheduler;

// ==================== Task ====================

/// What a task wants after one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
  /// Done; never step again.
  Finished,
  /// Step again as soon as possible.
  Yield,
  /// Step again after the duration.
  Sleeping(Duration),
}

/// A unit of scheduled work: some state and the function that advances it.
pub struct Task<S> {
  state: S,
  handler: fn(&mut S) -> TaskState,
}

impl<S> Task<S> {
  pub fn new(state: S, handler: fn(&mut S) -> TaskState) -> Self { Task { state, handler } }

  pub fn step(&mut self) -> TaskState { (self.handler)(&mut self.state) }
}

// ==================== TaskHandle ====================

/// Cancellation token for one scheduled task or spawned future.
///
/// Clones share the same token. Cancelling any of them guarantees the task is
/// never stepped (or the future never polled) again; further calls are no-ops.
#[derive(Clone, Default)]
pub struct TaskHandle(Rc<HandleInner>);

#[derive(Default)]
struct HandleInner {
  closed: Cell<bool>,
  abort: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  /// A handle for work that already completed.
  pub fn finished() -> Self {
    let handle = Self::new();
    handle.mark_finished();
    handle
  }

  /// Close the handle because the work completed on its own.
  pub fn mark_finished(&self) {
    self.0.closed.set(true);
    self.0.abort.borrow_mut().clear();
  }

  /// Register an action to run on cancellation. Actions run in registration
  /// order; none run if the work finishes first.
  pub fn on_abort(&self, abort: impl FnOnce() + 'static) {
    if !self.0.closed.get() {
      self.0.abort.borrow_mut().push(Box::new(abort));
    }
  }

  pub fn cancel(&self) {
    if self.0.closed.replace(true) {
      return;
    }
    let actions = std::mem::take(&mut *self.0.abort.borrow_mut());
    for abort in actions {
      abort();
    }
  }

  pub fn ptr_eq(&self, other: &TaskHandle) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl Subscription for TaskHandle {
  #[inline]
  fn unsubscribe(self) { self.cancel() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.closed.get() }
}

// ==================== Scheduler ====================

/// An execution context.
///
/// Both methods return immediately; the work runs on later turns of the
/// context, never inside the call.
pub trait Scheduler: Clone + 'static {
  /// Step `task` after `delay`, then keep stepping it for as long as it
  /// returns [`TaskState::Yield`] or [`TaskState::Sleeping`].
  fn schedule<S: 'static>(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle;

  /// Drive `future` to completion on this context.
  fn spawn<F>(&self, future: F) -> TaskHandle
  where
    F: Future<Output = ()> + 'static;
}

/// Sleep capability native to a scheduler.
///
/// Fetch futures that need to wait (retries, stubs in tests) sleep through
/// this so they follow the scheduler's clock, virtual or real.
pub trait SleepProvider {
  type SleepFuture: Future<Output = ()> + 'static;

  fn sleep(&self, duration: Duration) -> Self::SleepFuture;
}

pin_project! {
  /// Adapts a [`Task`] into a future, sleeping through a [`SleepProvider`]
  /// between steps.
  pub struct TaskFuture<S, P: SleepProvider> {
    task: Task<S>,
    provider: P,
    #[pin]
    sleep: Option<P::SleepFuture>,
  }
}

impl<S, P: SleepProvider> TaskFuture<S, P> {
  pub fn new(task: Task<S>, provider: P, delay: Option<Duration>) -> Self {
    let sleep = delay.map(|d| provider.sleep(d));
    TaskFuture { task, provider, sleep }
  }
}

impl<S, P: SleepProvider> Future for TaskFuture<S, P> {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
    let mut this = self.project();
    loop {
      if let Some(sleep) = this.sleep.as_mut().as_pin_mut() {
        ready!(sleep.poll(cx));
        this.sleep.set(None);
      }
      match this.task.step() {
        TaskState::Finished => return Poll::Ready(()),
        TaskState::Yield => {
          cx.waker().wake_by_ref();
          return Poll::Pending;
        }
        TaskState::Sleeping(duration) => this.sleep.set(Some(this.provider.sleep(duration))),
      }
    }
  }
}

pin_project! {
  /// Resolves early, without polling `future` again, once `handle` closes.
  pub struct Cancellable<F> {
    #[pin]
    future: F,
    handle: TaskHandle,
  }
}

impl<F> Cancellable<F> {
  pub fn new(future: F, handle: TaskHandle) -> Self { Cancellable { future, handle } }
}

impl<F: Future<Output = ()>> Future for Cancellable<F> {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
    let this = self.project();
    if this.handle.is_closed() {
      return Poll::Ready(());
    }
    this.future.poll(cx)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cancel_runs_abort_once() {
    let hits = Rc::new(Cell::new(0));
    let handle = TaskHandle::new();
    let h = hits.clone();
    handle.on_abort(move || h.set(h.get() + 1));

    handle.cancel();
    handle.clone().unsubscribe();
    handle.cancel();

    assert_eq!(hits.get(), 1);
    assert!(handle.is_closed());
  }

  #[test]
  fn finished_handle_never_aborts() {
    let hits = Rc::new(Cell::new(0));
    let handle = TaskHandle::new();
    let h = hits.clone();
    handle.on_abort(move || h.set(h.get() + 1));
    handle.mark_finished();
    handle.cancel();
    assert_eq!(hits.get(), 0);

    let h = hits.clone();
    TaskHandle::finished().on_abort(move || h.set(h.get() + 1));
    assert_eq!(hits.get(), 0);
  }

  #[test]
  fn task_step_runs_handler() {
    let mut task = Task::new(0, |n| {
      *n += 1;
      if *n < 2 { TaskState::Yield } else { TaskState::Finished }
    });
    assert_eq!(task.step(), TaskState::Yield);
    assert_eq!(task.step(), TaskState::Finished);
  }
}
