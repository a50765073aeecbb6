//! A non-recursive blocking monitor: one exclusive lock and one wait/notify
//! channel on top of the platform's pthread primitives.
//!
//! The interesting part is [`LowLevelMonitor::timed_wait`], which bounds a
//! wait with the best [`TimeoutStrategy`] the platform offers and stays
//! correct when the wall clock is stepped.

#[macro_use]
extern crate log;

mod error;
pub mod fallback;
pub mod ffi;
mod monitor;
mod raw;
mod strategy;
pub mod time;

pub use crate::error::MonitorError;
pub use crate::monitor::LowLevelMonitor;
pub use crate::strategy::{TimeoutStrategy, ALL_STRATEGIES};
pub use crate::time::{Clock, SystemClock, Timespec};
