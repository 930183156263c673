//! Cancellable handles
//!
//! Every `subscribe` returns a [`Subscription`]. Cancelling it is the only way
//! to release the timers and in-flight requests a pipeline holds: dropping a
//! handle does not cancel anything.

mod boxed;
mod proxy;
mod set;
mod tuple;

pub use boxed::*;
pub use proxy::*;
pub use set::*;
pub use tuple::*;

/// A handle to one active subscription or in-flight operation.
///
/// `unsubscribe` consumes the handle. Handles that can be cloned (like
/// [`TaskHandle`](crate::scheduler::TaskHandle)) must treat every call after
/// the first as a no-op.
pub trait Subscription {
  /// Stop delivering events and release the resources held for them.
  fn unsubscribe(self);

  /// Whether this handle has been cancelled or the work behind it finished.
  fn is_closed(&self) -> bool;
}

/// Subscription of a source that finished inside `subscribe`.
impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<S: Subscription> Subscription for Option<S> {
  #[inline]
  fn unsubscribe(self) {
    if let Some(s) = self {
      s.unsubscribe()
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.as_ref().map_or(true, Subscription::is_closed) }
}

#[cfg(test)]
pub(crate) mod test_util {
  use std::{cell::Cell, rc::Rc};

  use super::Subscription;

  /// A mock subscription counting how often it was cancelled.
  pub struct MockSubscription {
    pub cancels: Rc<Cell<usize>>,
  }

  impl MockSubscription {
    pub fn new() -> (Self, Rc<Cell<usize>>) {
      let cancels = Rc::new(Cell::new(0));
      (Self { cancels: cancels.clone() }, cancels)
    }
  }

  impl Subscription for MockSubscription {
    fn unsubscribe(self) { self.cancels.set(self.cancels.get() + 1); }

    fn is_closed(&self) -> bool { self.cancels.get() > 0 }
  }
}
