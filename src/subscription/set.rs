use smallvec::SmallVec;

use super::{BoxedSubscription, Subscription};
use crate::rc::{MutRc, RcDeref, RcDerefMut};

/// The set of handles a controller owns.
///
/// Cancelling the set cancels every member exactly once. A handle added after
/// the set was cancelled is cancelled on the spot, so a callback that races
/// with teardown cannot leave an orphaned timer behind.
#[derive(Clone, Default)]
pub struct SubscriptionSet(MutRc<Inner>);

#[derive(Default)]
struct Inner {
  closed: bool,
  teardown: SmallVec<[BoxedSubscription; 2]>,
}

impl SubscriptionSet {
  pub fn add(&self, subscription: impl Subscription + 'static) {
    let mut inner = self.0.rc_deref_mut();
    if inner.closed {
      drop(inner);
      subscription.unsubscribe();
    } else {
      inner.teardown.retain(|s| !s.is_closed());
      inner.teardown.push(BoxedSubscription::new(subscription));
    }
  }

  /// Number of members that are still live.
  pub fn len(&self) -> usize { self.0.rc_deref().teardown.iter().filter(|s| !s.is_closed()).count() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// Cancel every member. Later calls are no-ops.
  pub fn cancel_all(&self) {
    let teardown = {
      let mut inner = self.0.rc_deref_mut();
      if inner.closed {
        return;
      }
      inner.closed = true;
      std::mem::take(&mut inner.teardown)
    };
    for s in teardown {
      s.unsubscribe();
    }
  }
}

impl Subscription for SubscriptionSet {
  #[inline]
  fn unsubscribe(self) { self.cancel_all() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.rc_deref().closed }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::subscription::test_util::MockSubscription;

  #[test]
  fn cancels_every_member_once() {
    let set = SubscriptionSet::default();
    let (m1, c1) = MockSubscription::new();
    let (m2, c2) = MockSubscription::new();
    set.add(m1);
    set.add(m2);
    assert_eq!(set.len(), 2);

    set.cancel_all();
    set.cancel_all();
    set.clone().unsubscribe();

    assert_eq!((c1.get(), c2.get()), (1, 1));
    assert!(set.is_closed());
  }

  #[test]
  fn add_after_cancel_cancels_immediately() {
    let set = SubscriptionSet::default();
    set.cancel_all();

    let (m, c) = MockSubscription::new();
    set.add(m);
    assert_eq!(c.get(), 1);
    assert!(set.is_empty());
  }

  #[test]
  fn finished_members_are_pruned() {
    let set = SubscriptionSet::default();
    set.add(());
    set.add(());
    assert!(set.is_empty());
  }
}
