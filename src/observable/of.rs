use std::convert::Infallible;

use super::{Observable, ObservableType};
use crate::observer::Observer;

/// Creates a single-shot source.
///
/// Each subscription emits the value once and then completes, synchronously
/// inside `subscribe`. Never emits an error.
///
/// ```
/// use rxscreens::prelude::*;
///
/// let mut doubled = 0;
/// observable::of("21")
///   .filter(|s| s.parse::<i32>().is_ok())
///   .map(|s| s.parse::<i32>().unwrap_or_default() * 2)
///   .subscribe(|v| doubled = v);
/// assert_eq!(doubled, 42);
/// ```
pub fn of<Item>(v: Item) -> Of<Item> { Of(v) }

/// A single value, see [`of`]. Clone it to subscribe more than once; every
/// clone is an independent emission.
#[derive(Clone)]
pub struct Of<Item>(pub(crate) Item);

impl<Item> ObservableType for Of<Item> {
  type Item = Item;
  type Err = Infallible;
}

impl<Item, O> Observable<O> for Of<Item>
where
  O: Observer<Item, Infallible>,
{
  type Unsub = ();

  fn actual_subscribe(self, mut observer: O) {
    observer.next(self.0);
    observer.complete();
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use crate::prelude::*;

  #[test]
  fn emits_once_then_completes() {
    let events = RefCell::new(vec![]);
    let handle = observable::of(7).subscribe_sink(
      |v| events.borrow_mut().push(format!("value {v}")),
      |reason: Option<std::convert::Infallible>| {
        events.borrow_mut().push(format!("complete {}", reason.is_none()))
      },
    );

    assert_eq!(*events.borrow(), vec!["value 7", "complete true"]);
    assert!(handle.is_closed());
  }

  #[test]
  fn each_subscription_is_independent() {
    let mut sum = 0;
    let source = observable::of(5);
    source.clone().subscribe(|v| sum += v);
    source.subscribe(|v| sum += v);
    assert_eq!(sum, 10);
  }
}
