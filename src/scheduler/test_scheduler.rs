//! Test Scheduler for deterministic testing of time-based pipelines.
//!
//! Provides virtual time that only advances when explicitly instructed,
//! enabling deterministic testing of `debounce`, `interval`, the async bridge
//! and the screen controllers.
//!
//! # Usage
//!
//! ```rust
//! use rxscreens::prelude::*;
//! use std::{cell::RefCell, rc::Rc};
//!
//! // Initialize the test scheduler (required before use)
//! TestScheduler::init();
//!
//! let ticks = Rc::new(RefCell::new(vec![]));
//! let t = ticks.clone();
//! let handle = observable::interval(Duration::from_millis(100), |n| n, TestScheduler)
//!   .subscribe(move |n| t.borrow_mut().push(n));
//!
//! TestScheduler::advance_by(Duration::from_millis(250));
//! assert_eq!(*ticks.borrow(), vec![0, 1]);
//! handle.unsubscribe();
//! ```
//!
//! # Thread Safety
//!
//! State lives in thread-local storage, so each test thread has its own
//! independent virtual time and task queue.

use std::{
  cell::{Cell, RefCell},
  cmp::Ordering,
  collections::BinaryHeap,
  future::Future,
  pin::Pin,
  task::{Context, Poll},
};

use super::{Duration, Scheduler, SleepProvider, Task, TaskHandle, TaskState};
use crate::subscription::Subscription;

// ==================== Internal State ====================

#[derive(Default)]
struct TestSchedulerState {
  virtual_time: Duration,
  task_queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
  initialized: bool,
}

struct ScheduledTask {
  scheduled_time: Duration,
  task_id: usize,
  task: Box<dyn FnMut() -> TaskState>,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool {
    self.scheduled_time == other.scheduled_time && self.task_id == other.task_id
  }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .scheduled_time
      .cmp(&self.scheduled_time)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

thread_local! {
  static TEST_SCHEDULER_STATE: RefCell<TestSchedulerState>
    = RefCell::new(TestSchedulerState::default());
  /// Set by `TestSleep` so the polling task knows when to wake the future again
  static PENDING_SLEEP: Cell<Option<Duration>> = const { Cell::new(None) };
}

// ==================== TestScheduler ====================

/// A virtual time scheduler for deterministic testing.
///
/// This is a zero-sized type that accesses thread-local state.
/// All instances in the same thread share the same virtual time and task queue.
#[derive(Clone, Copy, Default, Debug)]
pub struct TestScheduler;

impl TestScheduler {
  /// Initialize or reset the test scheduler state.
  ///
  /// Must be called at the start of each test. Resets virtual time to zero
  /// and drops every queued task.
  pub fn init() {
    TEST_SCHEDULER_STATE.with(|state| {
      let mut state = state.borrow_mut();
      state.virtual_time = Duration::ZERO;
      state.task_queue.clear();
      state.next_task_id = 0;
      state.initialized = true;
    });
  }

  fn ensure_initialized() {
    TEST_SCHEDULER_STATE.with(|state| {
      assert!(
        state.borrow().initialized,
        "TestScheduler::init() must be called before using the scheduler"
      );
    });
  }

  /// Current virtual time, measured from the last `init()`.
  pub fn now() -> Duration {
    Self::ensure_initialized();
    TEST_SCHEDULER_STATE.with(|state| state.borrow().virtual_time)
  }

  /// Number of queued tasks whose handle is still open.
  pub fn pending_count() -> usize {
    Self::ensure_initialized();
    TEST_SCHEDULER_STATE
      .with(|state| state.borrow().task_queue.iter().filter(|t| !t.handle.is_closed()).count())
  }

  pub fn is_empty() -> bool { Self::pending_count() == 0 }

  fn execute_tasks_until(target_time: Option<Duration>) {
    loop {
      let task = TEST_SCHEDULER_STATE.with(|state| {
        let mut state = state.borrow_mut();

        let should_stop = state
          .task_queue
          .peek()
          .map_or(true, |peek| target_time.is_some_and(|limit| peek.scheduled_time > limit));
        if should_stop {
          return None;
        }

        let scheduled_task = state.task_queue.pop()?;
        state.virtual_time = scheduled_task.scheduled_time;
        Some(scheduled_task)
      });

      let Some(mut scheduled_task) = task else {
        break;
      };

      let result = if scheduled_task.handle.is_closed() {
        TaskState::Finished
      } else {
        (scheduled_task.task)()
      };

      TEST_SCHEDULER_STATE.with(|state| {
        let mut state = state.borrow_mut();
        match result {
          TaskState::Finished => scheduled_task.handle.mark_finished(),
          TaskState::Yield => Self::reschedule_task(&mut state, scheduled_task, Duration::ZERO),
          TaskState::Sleeping(sleep_duration) => {
            Self::reschedule_task(&mut state, scheduled_task, sleep_duration)
          }
        }
      });
    }
  }

  fn reschedule_task(
    state: &mut TestSchedulerState, scheduled_task: ScheduledTask, delay: Duration,
  ) {
    let task_id = state.next_task_id;
    state.next_task_id += 1;
    state.task_queue.push(ScheduledTask {
      scheduled_time: state.virtual_time + delay,
      task_id,
      task: scheduled_task.task,
      handle: scheduled_task.handle,
    });
  }

  fn enqueue(task: Box<dyn FnMut() -> TaskState>, delay: Option<Duration>) -> TaskHandle {
    Self::ensure_initialized();
    TEST_SCHEDULER_STATE.with(|state| {
      let mut state = state.borrow_mut();
      let handle = TaskHandle::new();
      let task_id = state.next_task_id;
      state.next_task_id += 1;
      let scheduled_time = state.virtual_time + delay.unwrap_or(Duration::ZERO);
      state.task_queue.push(ScheduledTask { scheduled_time, task_id, task, handle: handle.clone() });
      handle
    })
  }

  /// Advance virtual time by `duration`, running every task due on the way.
  ///
  /// Tasks run in order of their scheduled time, FIFO for equal times. A task
  /// that yields or sleeps back into the window runs again before this
  /// returns.
  pub fn advance_by(duration: Duration) {
    Self::ensure_initialized();
    let target_time = TEST_SCHEDULER_STATE.with(|state| state.borrow().virtual_time + duration);

    Self::execute_tasks_until(Some(target_time));

    TEST_SCHEDULER_STATE.with(|state| {
      state.borrow_mut().virtual_time = target_time;
    });
  }

  /// Run until the queue is empty, jumping virtual time to each deadline.
  ///
  /// Never returns while a repeating task (an uncancelled `interval`) is
  /// queued.
  pub fn flush() {
    Self::ensure_initialized();
    Self::execute_tasks_until(None);
  }
}

impl Scheduler for TestScheduler {
  fn schedule<S: 'static>(&self, mut task: Task<S>, delay: Option<Duration>) -> TaskHandle {
    Self::enqueue(Box::new(move || task.step()), delay)
  }

  fn spawn<F>(&self, future: F) -> TaskHandle
  where
    F: Future<Output = ()> + 'static,
  {
    let mut future = Box::pin(future);
    Self::enqueue(
      Box::new(move || {
        PENDING_SLEEP.with(|cell| cell.set(None));

        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        match future.as_mut().poll(&mut cx) {
          Poll::Ready(()) => TaskState::Finished,
          // A future parked on anything but `TestSleep` is polled again on the
          // next turn.
          Poll::Pending => PENDING_SLEEP.with(|cell| cell.take().map_or(TaskState::Yield, TaskState::Sleeping)),
        }
      }),
      None,
    )
  }
}

// ==================== Virtual sleep ====================

/// A sleep on the virtual clock, see [`SleepProvider`].
pub struct TestSleep {
  deadline: Duration,
}

impl Future for TestSleep {
  type Output = ();

  fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
    let now = TestScheduler::now();
    if now >= self.deadline {
      Poll::Ready(())
    } else {
      let remaining = self.deadline - now;
      PENDING_SLEEP.with(|cell| {
        let shortest = cell.get().map_or(remaining, |d| d.min(remaining));
        cell.set(Some(shortest));
      });
      Poll::Pending
    }
  }
}

impl SleepProvider for TestScheduler {
  type SleepFuture = TestSleep;

  fn sleep(&self, duration: Duration) -> TestSleep { TestSleep { deadline: Self::now() + duration } }
}

#[cfg(test)]
mod tests {
  use std::{mem, rc::Rc};

  use super::*;

  #[test]
  fn test_zero_sized_and_copy() {
    assert_eq!(mem::size_of::<TestScheduler>(), 0);

    let s1 = TestScheduler;
    let _s2 = s1;
    let _s3 = s1;
  }

  #[test]
  fn test_init_and_reset() {
    TestScheduler::init();
    assert_eq!(TestScheduler::now(), Duration::ZERO);
    assert!(TestScheduler::is_empty());

    TestScheduler::advance_by(Duration::from_millis(100));
    assert_eq!(TestScheduler::now(), Duration::from_millis(100));

    TestScheduler::init();
    assert_eq!(TestScheduler::now(), Duration::ZERO);
  }

  #[test]
  #[should_panic(expected = "TestScheduler::init() must be called")]
  fn test_panics_without_init() {
    TEST_SCHEDULER_STATE.with(|s| s.borrow_mut().initialized = false);
    TestScheduler::now();
  }

  #[test]
  fn test_schedule_immediate_and_delayed() {
    TestScheduler::init();

    let results = Rc::new(RefCell::new(Vec::new()));

    let r = results.clone();
    TestScheduler.schedule(
      Task::new(r, |v| {
        v.borrow_mut().push("immediate");
        TaskState::Finished
      }),
      None,
    );

    let r = results.clone();
    TestScheduler.schedule(
      Task::new(r, |v| {
        v.borrow_mut().push("delayed");
        TaskState::Finished
      }),
      Some(Duration::from_millis(100)),
    );

    assert_eq!(TestScheduler::pending_count(), 2);

    TestScheduler::advance_by(Duration::ZERO);
    assert_eq!(*results.borrow(), vec!["immediate"]);

    TestScheduler::advance_by(Duration::from_millis(100));
    assert_eq!(*results.borrow(), vec!["immediate", "delayed"]);
  }

  #[test]
  fn test_task_cancellation() {
    TestScheduler::init();

    let executed = Rc::new(Cell::new(false));
    let e = executed.clone();

    let handle = TestScheduler.schedule(
      Task::new(e, |v| {
        v.set(true);
        TaskState::Finished
      }),
      Some(Duration::from_millis(100)),
    );

    handle.unsubscribe();
    assert!(TestScheduler::is_empty());
    TestScheduler::advance_by(Duration::from_millis(150));

    assert!(!executed.get());
  }

  #[test]
  fn test_fifo_ordering_same_time() {
    TestScheduler::init();

    let order = Rc::new(RefCell::new(Vec::new()));

    for i in 0..5 {
      let o = order.clone();
      TestScheduler.schedule(
        Task::new((o, i), |(v, id)| {
          v.borrow_mut().push(*id);
          TaskState::Finished
        }),
        Some(Duration::from_millis(100)),
      );
    }

    TestScheduler::advance_by(Duration::from_millis(100));
    assert_eq!(*order.borrow(), vec![0, 1, 2, 3, 4]);
  }

  #[test]
  fn test_sleeping_task_reschedules() {
    TestScheduler::init();

    let count = Rc::new(Cell::new(0));
    let c = count.clone();

    TestScheduler.schedule(
      Task::new(c, |v| {
        v.set(v.get() + 1);
        if v.get() < 3 { TaskState::Sleeping(Duration::from_millis(10)) } else { TaskState::Finished }
      }),
      None,
    );

    TestScheduler::advance_by(Duration::from_millis(10));
    assert_eq!(count.get(), 2);
    TestScheduler::flush();
    assert_eq!(count.get(), 3);
    assert_eq!(TestScheduler::now(), Duration::from_millis(20));
    assert!(TestScheduler::is_empty());
  }

  #[test]
  fn test_tasks_beyond_target_time_not_discarded() {
    TestScheduler::init();

    let executed = Rc::new(RefCell::new(Vec::new()));

    for at in [50, 150] {
      let e = executed.clone();
      TestScheduler.schedule(
        Task::new((e, at), |(v, at)| {
          v.borrow_mut().push(*at);
          TaskState::Finished
        }),
        Some(Duration::from_millis(at)),
      );
    }

    TestScheduler::advance_by(Duration::from_millis(100));
    assert_eq!(*executed.borrow(), vec![50]);
    assert_eq!(TestScheduler::pending_count(), 1);

    TestScheduler::advance_by(Duration::from_millis(50));
    assert_eq!(*executed.borrow(), vec![50, 150]);
    assert!(TestScheduler::is_empty());
  }

  #[test]
  fn test_spawned_future_follows_virtual_sleep() {
    TestScheduler::init();

    let done = Rc::new(Cell::new(false));
    let d = done.clone();
    TestScheduler.spawn(async move {
      TestScheduler.sleep(Duration::from_millis(100)).await;
      d.set(true);
    });

    TestScheduler::advance_by(Duration::from_millis(99));
    assert!(!done.get());
    TestScheduler::advance_by(Duration::from_millis(1));
    assert!(done.get());
  }

  #[test]
  fn test_cancelled_future_is_not_resumed() {
    TestScheduler::init();

    let done = Rc::new(Cell::new(false));
    let d = done.clone();
    let handle = TestScheduler.spawn(async move {
      TestScheduler.sleep(Duration::from_millis(100)).await;
      d.set(true);
    });

    TestScheduler::advance_by(Duration::from_millis(50));
    handle.unsubscribe();
    TestScheduler::flush();
    assert!(!done.get());
  }
}
