//! Pipeline stages.
//!
//! Each stage wraps an upstream source and is itself a source, so stages
//! compose in any order. A stage never alters its upstream's cancellation:
//! the composed handle it returns cancels the upstream handle plus whatever
//! timer the stage owns.

pub mod assign;
pub mod debounce;
pub mod filter;
pub mod map;
pub mod observe_on;
pub mod throttle_time;
pub mod try_map;
