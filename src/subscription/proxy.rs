use super::Subscription;
use crate::rc::{MutRc, RcDeref, RcDerefMut};

/// A late-bound handle to an upstream subscription.
///
/// A stage that has to release its upstream from inside a callback hands a
/// clone of the proxy to its observer before the upstream handle exists.
/// Releasing before the handle is bound marks the proxy, and the handle is
/// cancelled as soon as it arrives.
pub struct ProxySubscription<U>(MutRc<ProxyState<U>>);

struct ProxyState<U> {
  released: bool,
  inner: Option<U>,
}

impl<U> Clone for ProxySubscription<U> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<U> Default for ProxySubscription<U> {
  fn default() -> Self { Self(MutRc::own(ProxyState { released: false, inner: None })) }
}

impl<U: Subscription> ProxySubscription<U> {
  pub fn new() -> Self { Self::default() }

  /// Bind the upstream handle.
  pub fn bind(&self, subscription: U) {
    let mut state = self.0.rc_deref_mut();
    if state.released {
      drop(state);
      subscription.unsubscribe();
    } else {
      state.inner = Some(subscription);
    }
  }

  /// Cancel the upstream, now or once it is bound.
  pub fn release(&self) {
    let inner = {
      let mut state = self.0.rc_deref_mut();
      state.released = true;
      state.inner.take()
    };
    inner.unsubscribe();
  }
}

impl<U: Subscription> Subscription for ProxySubscription<U> {
  fn unsubscribe(self) { self.release() }

  fn is_closed(&self) -> bool { self.0.rc_deref().released }
}
