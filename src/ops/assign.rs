use crate::{observer::Observer, published::Published};

/// Writes every value into a [`Published`] field.
///
/// Terminal notices leave the field at its last value.
pub struct AssignObserver<T> {
  target: Published<T>,
}

impl<T> AssignObserver<T> {
  pub fn new(target: Published<T>) -> Self { AssignObserver { target } }
}

impl<T, Err> Observer<T, Err> for AssignObserver<T> {
  #[inline]
  fn next(&mut self, value: T) { self.target.set(value) }

  #[inline]
  fn error(self, _: Err) {}

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { false }
}
