use std::io;

use thiserror::Error;

use crate::strategy::TimeoutStrategy;

/// Failures while constructing a monitor. Nothing is left allocated when one
/// of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonitorError {
    #[error("pthread_mutex_init failed: {}", errno(.0))]
    MutexInit(i32),
    #[error("pthread_condattr_init failed: {}", errno(.0))]
    CondAttrInit(i32),
    #[error("pthread_condattr_setclock(CLOCK_MONOTONIC) failed: {}", errno(.0))]
    SetClock(i32),
    #[error("pthread_cond_init failed: {}", errno(.0))]
    CondInit(i32),
    #[error("the {0} timeout strategy is not supported on this platform")]
    Unsupported(TimeoutStrategy),
}

fn errno(code: &i32) -> io::Error {
    io::Error::from_raw_os_error(*code)
}

impl MonitorError {
    /// The `errno` reported by the failing call, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match *self {
            Self::MutexInit(e) | Self::CondAttrInit(e) | Self::SetClock(e) | Self::CondInit(e) => Some(e),
            Self::Unsupported(_) => None,
        }
    }
}
