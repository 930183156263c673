use std::fmt::Write;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, warn};

use crate::{
  config::{ConfigError, ScreenConfig},
  observable::{self, ObservableExt},
  published::{Observed, Published},
  scheduler::Scheduler,
  subscription::SubscriptionSet,
};

/// A label showing the wall-clock time, refreshed every clock period.
pub struct ClockController {
  current_time: Published<String>,
  subscriptions: SubscriptionSet,
}

impl ClockController {
  /// Fails when `config` does not [validate](ScreenConfig::validate).
  pub fn new<Sch: Scheduler>(config: &ScreenConfig, scheduler: Sch) -> Result<Self, ConfigError> {
    Self::with_clock(config, scheduler, || Local::now().naive_local())
  }

  /// Like [`new`](Self::new) with a custom time source.
  pub fn with_clock<Sch, C>(config: &ScreenConfig, scheduler: Sch, clock: C) -> Result<Self, ConfigError>
  where
    Sch: Scheduler,
    C: Fn() -> NaiveDateTime + 'static,
  {
    config.validate()?;
    let format = config.clock_format.clone();
    let current_time = Published::new(format_time(clock(), &format));
    let subscriptions = SubscriptionSet::default();

    let ticks = observable::interval(config.clock_period(), move |_| format_time(clock(), &format), scheduler)
      .assign(&current_time);
    subscriptions.add(ticks);
    debug!(period = ?config.clock_period(), "clock started");

    Ok(ClockController { current_time, subscriptions })
  }

  pub fn current_time(&self) -> Observed<String> { self.current_time.observe() }

  pub fn teardown(&self) { self.subscriptions.cancel_all() }
}

fn format_time(time: NaiveDateTime, format: &str) -> String {
  let mut label = String::new();
  if write!(label, "{}", time.format(format)).is_err() {
    warn!(%format, "clock format cannot render a local time");
    label.clear();
  }
  label
}
