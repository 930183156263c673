//! The tokio-backed main loop.

use std::future::Future;

use futures::FutureExt;
use tokio::time::Sleep;

use super::{Cancellable, Duration, Scheduler, SleepProvider, Task, TaskFuture, TaskHandle};

/// Runs work on the current thread's tokio `LocalSet`.
///
/// All scheduling goes through `tokio::task::spawn_local`, so this scheduler
/// must be used from inside `LocalSet::run_until` (or a task spawned on a
/// `LocalSet`); tokio panics otherwise. Cancelling a handle aborts the tokio
/// task.
#[derive(Clone, Copy, Default, Debug)]
pub struct LocalScheduler;

impl SleepProvider for LocalScheduler {
  type SleepFuture = Sleep;

  fn sleep(&self, duration: Duration) -> Sleep { tokio::time::sleep(duration) }
}

impl Scheduler for LocalScheduler {
  fn schedule<S: 'static>(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle {
    self.spawn(TaskFuture::new(task, *self, delay))
  }

  fn spawn<F>(&self, future: F) -> TaskHandle
  where
    F: Future<Output = ()> + 'static,
  {
    let handle = TaskHandle::new();
    let done = handle.clone();
    let join = tokio::task::spawn_local(
      Cancellable::new(future, handle.clone()).map(move |_| done.mark_finished()),
    );
    handle.on_abort(move || join.abort());
    handle
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use tokio::task::LocalSet;

  use super::*;
  use crate::{scheduler::TaskState, subscription::Subscription};

  #[tokio::test(flavor = "current_thread", start_paused = true)]
  async fn repeating_task_sleeps_between_steps() {
    LocalSet::new()
      .run_until(async {
        let seen = Rc::new(RefCell::new(vec![]));
        let s = seen.clone();
        let handle = LocalScheduler.schedule(
          Task::new((s, 0), |(s, n)| {
            *n += 1;
            s.borrow_mut().push(*n);
            if *n < 3 { TaskState::Sleeping(Duration::from_millis(10)) } else { TaskState::Finished }
          }),
          Some(Duration::from_millis(5)),
        );

        tokio::time::sleep(Duration::from_millis(6)).await;
        assert_eq!(*seen.borrow(), vec![1]);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
        assert!(handle.is_closed());
      })
      .await;
  }

  #[tokio::test(flavor = "current_thread", start_paused = true)]
  async fn cancelled_future_never_resumes() {
    LocalSet::new()
      .run_until(async {
        let hit = Rc::new(RefCell::new(false));
        let h = hit.clone();
        let handle = LocalScheduler.spawn(async move {
          tokio::time::sleep(Duration::from_millis(10)).await;
          *h.borrow_mut() = true;
        });
        tokio::time::sleep(Duration::from_millis(1)).await;
        handle.clone().unsubscribe();
        handle.unsubscribe();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!*hit.borrow());
      })
      .await;
  }
}
