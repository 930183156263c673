//! # rxscreens: reactive pipelines for small UI screens
//!
//! A single-context reactive core (sources, operators, sinks and cancellable
//! handles) and four screen controllers built on it: a clock, a "Just x 2"
//! doubler, a debounced creature search and a polling emoji feed.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxscreens::prelude::*;
//!
//! let mut total = 0;
//! observable::of("21")
//!   .filter(|s| s.parse::<i32>().is_ok())
//!   .map(|s| s.parse::<i32>().unwrap_or_default() * 2)
//!   .subscribe(|v| total += v);
//! assert_eq!(total, 42);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A lazy source; `subscribe` starts one activation |
//! | [`Observer`] | Consumes `next`, then one of `error` or `complete` |
//! | [`Subscription`] | Handle that cancels an activation, idempotently |
//! | [`Scheduler`] | The single execution context all emissions run on |
//! | [`AsyncBridge`] | Async request as a source; newer requests supersede older ones |
//! | [`Published`] / [`Observed`] | A controller's field and its read-only view |
//!
//! ## Feature Flags
//!
//! - **`tokio-scheduler`** (default): [`LocalScheduler`] on a tokio `LocalSet`
//! - **`http`** (default): [`HttpFetcher`] on reqwest
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Scheduler`]: scheduler::Scheduler
//! [`AsyncBridge`]: bridge::AsyncBridge
//! [`Published`]: published::Published
//! [`Observed`]: published::Observed
//! [`LocalScheduler`]: scheduler::LocalScheduler
//! [`HttpFetcher`]: fetch::HttpFetcher

pub mod bridge;
pub mod config;
pub mod fetch;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod published;
pub mod rc;
pub mod scheduler;
pub mod screens;
pub mod subscription;

// Re-export the prelude module
pub use prelude::*;

#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
