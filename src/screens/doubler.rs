use crate::{
  observable::{self, ObservableExt},
  published::{Observed, Published},
  subscription::SubscriptionSet,
};

/// "Just x 2": doubles the typed number when asked to publish.
#[derive(Default)]
pub struct DoublerController {
  input: Published<String>,
  doubled: Published<i64>,
  subscriptions: SubscriptionSet,
}

impl DoublerController {
  pub fn new() -> Self { Self::default() }

  pub fn set_input(&self, text: impl Into<String>) { self.input.set(text.into()) }

  /// Run the current input through a single-shot pipeline. Input that is not
  /// an integer (or whose double overflows) leaves `doubled` unchanged.
  pub fn publish(&self) {
    let handle = observable::of(self.input.observe().get())
      .filter(|text| parse_doubled(text).is_some())
      .map(|text| parse_doubled(&text).unwrap_or_default())
      .assign(&self.doubled);
    self.subscriptions.add(handle);
  }

  pub fn input(&self) -> Observed<String> { self.input.observe() }

  pub fn doubled(&self) -> Observed<i64> { self.doubled.observe() }

  pub fn teardown(&self) { self.subscriptions.cancel_all() }
}

fn parse_doubled(text: &str) -> Option<i64> { text.parse::<i64>().ok()?.checked_mul(2) }
