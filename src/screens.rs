//! Screen controllers
//!
//! Each controller wires one or two pipelines and exposes the results as
//! [`Observed`](crate::published::Observed) fields for a presentation layer to
//! read. The terminal stage of every pipeline is the only writer of its field.
//!
//! Controllers own their subscriptions and release them in `teardown()`.
//! Dropping a controller without calling it leaves timers registered on the
//! scheduler.

mod clock;
mod creature_search;
mod doubler;
mod emoji_feed;

pub use clock::ClockController;
pub use creature_search::CreatureSearchController;
pub use doubler::DoublerController;
pub use emoji_feed::EmojiFeedController;
