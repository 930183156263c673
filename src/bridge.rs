//! Async bridge
//!
//! Turns an asynchronous request function into a value source. Every
//! activation of a [`BridgeRequest`] supersedes the previous one issued
//! through the same [`AsyncBridge`]: the older request is cancelled, and if
//! its result is already on the way it is dropped before it reaches the
//! observer. A bridge-driven pipeline therefore never shows a stale response.
//!
//! ```rust
//! use rxscreens::prelude::*;
//! use std::{cell::RefCell, rc::Rc};
//!
//! TestScheduler::init();
//! let bridge = AsyncBridge::new(
//!   |(term, latency): (&'static str, u64)| async move {
//!     TestScheduler.sleep(Duration::from_millis(latency)).await;
//!     Ok::<_, FetchError>(term.to_uppercase())
//!   },
//!   TestScheduler,
//! );
//!
//! let seen = Rc::new(RefCell::new(vec![]));
//! let s = seen.clone();
//! bridge.request(("slow", 200)).subscribe(move |v| s.borrow_mut().push(v));
//! let s = seen.clone();
//! bridge.request(("fast", 50)).subscribe(move |v| s.borrow_mut().push(v));
//!
//! TestScheduler::flush();
//! assert_eq!(*seen.borrow(), vec!["FAST"]);
//! ```

use std::{future::Future, rc::Rc};

use tracing::{debug, trace};

use crate::{
  fetch::FetchError,
  observable::{Observable, ObservableType},
  observer::Observer,
  rc::{MutRc, RcDeref, RcDerefMut},
  scheduler::{Scheduler, TaskHandle},
  subscription::Subscription,
};

/// What a bridge does with a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
  /// Log the failure and complete without a value. Screens keep showing
  /// their last good state.
  #[default]
  Suppress,
  /// Deliver the failure through `Observer::error`.
  Surface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
  Success,
  Failure,
}

/// Lifecycle of the bridge's current request.
///
/// `Settled` is the resting state after a request resolves and reports the
/// last outcome. It leaves through [`AsyncBridge::cancel`] (back to `Idle`)
/// or through a new request (to `Pending`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BridgeState {
  #[default]
  Idle,
  Pending,
  Settled(Settlement),
}

#[derive(Default)]
struct Slot {
  generation: u64,
  current: Option<TaskHandle>,
  state: BridgeState,
}

/// Adapter from an async request function to value sources with
/// supersession. Clones share the same current-request slot.
pub struct AsyncBridge<F, Sch> {
  request_fn: Rc<F>,
  scheduler: Sch,
  policy: FailurePolicy,
  slot: MutRc<Slot>,
}

impl<F, Sch: Clone> Clone for AsyncBridge<F, Sch> {
  fn clone(&self) -> Self {
    AsyncBridge {
      request_fn: self.request_fn.clone(),
      scheduler: self.scheduler.clone(),
      policy: self.policy,
      slot: self.slot.clone(),
    }
  }
}

impl<F, Sch: Scheduler> AsyncBridge<F, Sch> {
  pub fn new(request_fn: F, scheduler: Sch) -> Self {
    AsyncBridge {
      request_fn: Rc::new(request_fn),
      scheduler,
      policy: FailurePolicy::default(),
      slot: MutRc::own(Slot::default()),
    }
  }

  pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
    self.policy = policy;
    self
  }

  /// A lazy source for one request. Nothing is sent until it is subscribed.
  pub fn request<In>(&self, input: In) -> BridgeRequest<F, Sch, In> {
    BridgeRequest {
      request_fn: self.request_fn.clone(),
      scheduler: self.scheduler.clone(),
      policy: self.policy,
      slot: self.slot.clone(),
      input,
    }
  }

  /// Cancel the current request, if any, and return to `Idle`.
  pub fn cancel(&self) {
    let current = {
      let mut slot = self.slot.rc_deref_mut();
      slot.generation += 1;
      slot.state = BridgeState::Idle;
      slot.current.take()
    };
    if let Some(handle) = current {
      handle.cancel();
    }
  }

  pub fn state(&self) -> BridgeState { self.slot.rc_deref().state }
}

/// One request through an [`AsyncBridge`]. See [`AsyncBridge::request`].
pub struct BridgeRequest<F, Sch, In> {
  request_fn: Rc<F>,
  scheduler: Sch,
  policy: FailurePolicy,
  slot: MutRc<Slot>,
  input: In,
}

impl<F, Fut, T, Sch, In> ObservableType for BridgeRequest<F, Sch, In>
where
  F: Fn(In) -> Fut,
  Fut: Future<Output = Result<T, FetchError>>,
{
  type Item = T;
  type Err = FetchError;
}

impl<F, Fut, T, Sch, In, O> Observable<O> for BridgeRequest<F, Sch, In>
where
  F: Fn(In) -> Fut,
  Fut: Future<Output = Result<T, FetchError>> + 'static,
  T: 'static,
  Sch: Scheduler,
  O: Observer<T, FetchError> + 'static,
{
  type Unsub = TaskHandle;

  fn actual_subscribe(self, observer: O) -> TaskHandle {
    let (superseded, generation) = {
      let mut slot = self.slot.rc_deref_mut();
      slot.generation += 1;
      slot.state = BridgeState::Pending;
      (slot.current.take(), slot.generation)
    };
    if let Some(previous) = superseded {
      if !previous.is_closed() {
        debug!(generation, "superseding pending request");
      }
      previous.cancel();
    }

    let pending = (self.request_fn)(self.input);
    let slot = self.slot.clone();
    let policy = self.policy;
    let handle = self.scheduler.spawn(async move {
      let result = pending.await;
      if !settle(&slot, generation, &result) {
        trace!(generation, "dropping stale response");
        return;
      }
      deliver(observer, result, policy);
    });

    let mut slot = self.slot.rc_deref_mut();
    if slot.generation == generation && !handle.is_closed() {
      slot.current = Some(handle.clone());
    }
    drop(slot);

    let slot = self.slot.clone();
    handle.on_abort(move || {
      let mut slot = slot.rc_deref_mut();
      if slot.generation == generation {
        slot.current = None;
        slot.state = BridgeState::Idle;
      }
    });
    handle
  }
}

/// Record the outcome if `generation` is still current. Returns whether the
/// result may be delivered.
fn settle<T>(slot: &MutRc<Slot>, generation: u64, result: &Result<T, FetchError>) -> bool {
  let mut slot = slot.rc_deref_mut();
  if slot.generation != generation {
    return false;
  }
  slot.current = None;
  slot.state = BridgeState::Settled(match result {
    Ok(_) => Settlement::Success,
    Err(_) => Settlement::Failure,
  });
  true
}

fn deliver<T, O>(mut observer: O, result: Result<T, FetchError>, policy: FailurePolicy)
where
  O: Observer<T, FetchError>,
{
  match (result, policy) {
    (Ok(value), _) => {
      observer.next(value);
      observer.complete();
    }
    (Err(err), FailurePolicy::Suppress) => {
      debug!(error = %err, "request failed, keeping last value");
      observer.complete();
    }
    (Err(err), FailurePolicy::Surface) => observer.error(err),
  }
}
