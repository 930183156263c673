use super::Subscription;

/// Helper trait for calling unsubscribe on boxed trait objects
///
/// Since `Subscription::unsubscribe(self)` requires `Sized`, we need this
/// workaround trait to enable `Box<dyn Subscription>` to call unsubscribe.
pub trait BoxedSubscriptionInner {
  fn boxed_unsubscribe(self: Box<Self>);
  fn boxed_is_closed(&self) -> bool;
}

impl<T: Subscription> BoxedSubscriptionInner for T {
  #[inline]
  fn boxed_unsubscribe(self: Box<Self>) { (*self).unsubscribe() }

  #[inline]
  fn boxed_is_closed(&self) -> bool { self.is_closed() }
}

/// A type-erased subscription.
///
/// Controllers keep handles of unrelated pipeline types side by side, so they
/// store them boxed. Boxed handles are `'static`: they are control handles,
/// not views into borrowed data.
///
/// ```rust
/// use rxscreens::prelude::*;
///
/// let subs: Vec<BoxedSubscription> = vec![BoxedSubscription::new(()), BoxedSubscription::new(())];
/// for sub in subs {
///   sub.unsubscribe();
/// }
/// ```
pub struct BoxedSubscription(Box<dyn BoxedSubscriptionInner>);

impl BoxedSubscription {
  #[inline]
  pub fn new(subscription: impl Subscription + 'static) -> Self { Self(Box::new(subscription)) }
}

impl Subscription for BoxedSubscription {
  #[inline]
  fn unsubscribe(self) { self.0.boxed_unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.boxed_is_closed() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::subscription::test_util::MockSubscription;

  #[test]
  fn test_local_boxed_subscription() {
    let (mock, closed) = MockSubscription::new();
    let boxed = BoxedSubscription::new(mock);

    assert!(!boxed.is_closed());
    boxed.unsubscribe();
    assert_eq!(closed.get(), 1);
  }

  #[test]
  fn test_local_boxed_subscription_with_unit() {
    let boxed = BoxedSubscription::new(());
    assert!(boxed.is_closed());
    boxed.unsubscribe();
  }
}
