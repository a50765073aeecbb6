#[cfg(any(debug_assertions, feature = "debug-checks"))]
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    error::MonitorError,
    fallback,
    raw::{RawCondvar, RawMutex},
    strategy::TimeoutStrategy,
    time::{Clock, SystemClock, Timespec},
};

/// A non-recursive lock paired with a single wait/notify channel.
///
/// All methods take `&self`; the caller is responsible for the lock protocol:
/// `release`, `wait`, `timed_wait` and `signal_and_release` may only be called
/// by the thread that currently holds the lock. Debug builds track the lock
/// state and panic on misuse.
///
/// Dropping the monitor destroys the native primitives. It must be idle: no
/// holder and no waiters.
pub struct LowLevelMonitor {
    // Fields drop in order: the condition is destroyed before its mutex.
    cond: RawCondvar,
    mutex: RawMutex,
    strategy: TimeoutStrategy,
    #[cfg(any(debug_assertions, feature = "debug-checks"))]
    locked: AtomicBool,
}

unsafe impl Send for LowLevelMonitor {}
unsafe impl Sync for LowLevelMonitor {}

impl LowLevelMonitor {
    /// Creates a monitor using the process-wide detected strategy.
    pub fn new() -> Result<Self, MonitorError> {
        Self::with_strategy(TimeoutStrategy::detect())
    }

    pub fn with_strategy(strategy: TimeoutStrategy) -> Result<Self, MonitorError> {
        if !strategy.is_supported() {
            return Err(MonitorError::Unsupported(strategy));
        }
        let mutex = RawMutex::new()?;
        let cond = RawCondvar::new(strategy.binds_monotonic_clock())?;
        if strategy.is_degraded() {
            warn!("monitor created with the {} strategy", strategy);
        } else {
            trace!("monitor created with the {} strategy", strategy);
        }
        Ok(Self {
            cond,
            mutex,
            strategy,
            #[cfg(any(debug_assertions, feature = "debug-checks"))]
            locked: AtomicBool::new(false),
        })
    }

    pub fn strategy(&self) -> TimeoutStrategy {
        self.strategy
    }

    #[cfg(any(debug_assertions, feature = "debug-checks"))]
    fn set_locked(&self, locked: bool) {
        // Only the lock holder writes this flag.
        let was = self.locked.swap(locked, Ordering::Relaxed);
        assert_ne!(
            was, locked,
            "monitor is already {}",
            if locked { "locked" } else { "unlocked" }
        );
    }

    #[cfg(not(any(debug_assertions, feature = "debug-checks")))]
    #[inline(always)]
    fn set_locked(&self, _locked: bool) {}

    pub fn acquire(&self) {
        self.mutex.lock();
        self.set_locked(true);
    }

    pub fn release(&self) {
        self.set_locked(false);
        self.mutex.unlock();
    }

    /// Releases the lock, blocks until signaled, and re-acquires the lock.
    /// Spurious wakeups are passed through to the caller.
    pub fn wait(&self) {
        self.set_locked(false);
        self.cond.wait(&self.mutex);
        self.set_locked(true);
    }

    /// Like [`wait`](Self::wait), but gives up after `timeout_ms`
    /// milliseconds. Returns `true` if signaled and `false` on timeout; the
    /// lock is held again either way.
    pub fn timed_wait(&self, timeout_ms: u32) -> bool {
        self.set_locked(false);
        let signaled = match self.strategy {
            TimeoutStrategy::RelativeMonotonic => {
                let error = self.cond.wait_relative(&self.mutex, Timespec::from_millis(i64::from(timeout_ms)));
                Self::check_timed_wait(error)
            }
            TimeoutStrategy::AbsoluteMonotonic => {
                let deadline = SystemClock.monotonic().add_millis(u64::from(timeout_ms));
                Self::check_timed_wait(self.cond.wait_until(&self.mutex, deadline))
            }
            TimeoutStrategy::MonotonicMeasured => {
                fallback::wait_measured(&SystemClock, timeout_ms, |deadline| {
                    self.cond.wait_until(&self.mutex, deadline)
                })
            }
            TimeoutStrategy::WallClock => {
                let deadline = SystemClock.realtime().add_millis(u64::from(timeout_ms));
                Self::check_timed_wait(self.cond.wait_until(&self.mutex, deadline))
            }
        };
        self.set_locked(true);
        signaled
    }

    fn check_timed_wait(error: libc::c_int) -> bool {
        debug_assert!(
            error == 0 || error == libc::ETIMEDOUT,
            "pthread_cond_timedwait returned {}",
            error
        );
        error == 0
    }

    /// Signals one waiter, then releases the lock.
    pub fn signal_and_release(&self) {
        self.cond.signal();
        self.set_locked(false);
        self.mutex.unlock();
    }
}

impl Drop for LowLevelMonitor {
    fn drop(&mut self) {
        #[cfg(any(debug_assertions, feature = "debug-checks"))]
        assert!(!*self.locked.get_mut(), "monitor destroyed while locked");
        trace!("monitor destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ALL_STRATEGIES;

    #[test]
    fn create_acquire_release_destroy() {
        let monitor = LowLevelMonitor::new().unwrap();
        assert_eq!(monitor.strategy(), TimeoutStrategy::detect());
        monitor.acquire();
        monitor.release();
        monitor.acquire();
        monitor.release();
        drop(monitor);
    }

    #[test]
    fn every_supported_strategy_can_be_built() {
        for strategy in ALL_STRATEGIES {
            match LowLevelMonitor::with_strategy(strategy) {
                Ok(monitor) => {
                    assert!(strategy.is_supported());
                    assert_eq!(monitor.strategy(), strategy);
                }
                Err(e) => {
                    assert!(!strategy.is_supported());
                    assert_eq!(e, MonitorError::Unsupported(strategy));
                }
            }
        }
    }

    #[test]
    fn zero_timeout_reports_timed_out() {
        for strategy in ALL_STRATEGIES.into_iter().filter(|s| s.is_supported()) {
            let monitor = LowLevelMonitor::with_strategy(strategy).unwrap();
            monitor.acquire();
            assert!(!monitor.timed_wait(0), "{}", strategy);
            monitor.release();
        }
    }

    #[cfg(any(debug_assertions, feature = "debug-checks"))]
    #[test]
    #[should_panic(expected = "monitor is already unlocked")]
    fn release_without_acquire_is_fatal() {
        let monitor = LowLevelMonitor::new().unwrap();
        monitor.release();
    }

    #[cfg(any(debug_assertions, feature = "debug-checks"))]
    #[test]
    #[should_panic(expected = "monitor is already unlocked")]
    fn double_release_is_fatal() {
        let monitor = LowLevelMonitor::new().unwrap();
        monitor.acquire();
        monitor.release();
        monitor.release();
    }

    #[cfg(any(debug_assertions, feature = "debug-checks"))]
    #[test]
    #[should_panic(expected = "monitor is already unlocked")]
    fn timed_wait_without_the_lock_is_fatal() {
        let monitor = LowLevelMonitor::new().unwrap();
        monitor.timed_wait(10);
    }
}
