//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Sources and the operator chain
pub use crate::observable::{self, Observable, ObservableExt, ObservableType, Relay};
// Observers
pub use crate::observer::{FnMutObserver, Observer, Sink};
// Operators
pub use crate::ops::throttle_time::ThrottleEdge;
// Observed state
pub use crate::published::{Observed, Published, WatchHandle};
// Scheduler Core types
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::LocalScheduler;
pub use crate::scheduler::{
  Duration, Scheduler, SleepProvider, Task, TaskHandle, TaskState, TestScheduler,
};
// Subscription
pub use crate::subscription::*;
// Remote data and the async bridge
#[cfg(feature = "http")]
pub use crate::fetch::HttpFetcher;
pub use crate::{
  bridge::{AsyncBridge, BridgeState, FailurePolicy, Settlement},
  config::{ConfigError, ScreenConfig},
  fetch::{decode, CreatureRecord, Emoji, EmojiPayload, Fetch, FetchError},
  screens::{ClockController, CreatureSearchController, DoublerController, EmojiFeedController},
};
