#[macro_use]
extern crate log;

mod event;

use core::{
    cell::UnsafeCell,
    mem,
    ops::{Deref, DerefMut},
    ptr,
};
use std::time::Instant;

pub use event::{AutoResetEvent, ManualResetEvent};
pub use monitor::{LowLevelMonitor, MonitorError, TimeoutStrategy};

/// Remaining budget of a `timeout_ms` wait that began at `start`, or `None`
/// once it is spent.
pub(crate) fn remaining_ms(start: Instant, timeout_ms: u32) -> Option<u32> {
    let elapsed = start.elapsed().as_millis();
    if elapsed >= u128::from(timeout_ms) {
        None
    } else {
        Some(timeout_ms - elapsed as u32)
    }
}

/// Data guarded by a [`LowLevelMonitor`]. Waiting and signaling go through a
/// [`MonitorGuard`], so they can only happen while the lock is held.
pub struct Monitor<T> {
    raw: LowLevelMonitor,
    data: UnsafeCell<T>,
}

unsafe impl<T: Send> Send for Monitor<T> {}
unsafe impl<T: Send> Sync for Monitor<T> {}

impl<T> Monitor<T> {
    pub fn new(value: T) -> Result<Self, MonitorError> {
        Ok(Self {
            raw: LowLevelMonitor::new()?,
            data: UnsafeCell::new(value),
        })
    }

    pub fn with_strategy(value: T, strategy: TimeoutStrategy) -> Result<Self, MonitorError> {
        Ok(Self {
            raw: LowLevelMonitor::with_strategy(strategy)?,
            data: UnsafeCell::new(value),
        })
    }

    pub fn lock<'a>(self: &'a Self) -> MonitorGuard<'a, T> {
        self.raw.acquire();
        MonitorGuard { monitor: self }
    }

    fn check_owner(&self, guard: &MonitorGuard<'_, T>) {
        assert!(ptr::eq(guard.monitor, self), "guard belongs to another monitor");
    }

    pub fn wait<'a>(self: &'a Self, guard: MonitorGuard<'a, T>) -> MonitorGuard<'a, T> {
        self.check_owner(&guard);
        self.raw.wait();
        guard
    }

    /// Returns the guard and whether the wait was signaled.
    pub fn wait_timeout<'a>(
        self: &'a Self,
        guard: MonitorGuard<'a, T>,
        timeout_ms: u32,
    ) -> (MonitorGuard<'a, T>, bool) {
        self.check_owner(&guard);
        let signaled = self.raw.timed_wait(timeout_ms);
        (guard, signaled)
    }

    /// Waits until `condition` is false, absorbing spurious wakeups.
    pub fn wait_while<'a>(
        self: &'a Self,
        mut guard: MonitorGuard<'a, T>,
        mut condition: impl FnMut(&mut T) -> bool,
    ) -> MonitorGuard<'a, T> {
        while condition(&mut guard) {
            guard = self.wait(guard);
        }
        guard
    }

    /// Waits until `condition` is false or `timeout_ms` passes. The returned
    /// flag is `false` if the condition still held at the deadline.
    pub fn wait_while_timeout<'a>(
        self: &'a Self,
        mut guard: MonitorGuard<'a, T>,
        timeout_ms: u32,
        mut condition: impl FnMut(&mut T) -> bool,
    ) -> (MonitorGuard<'a, T>, bool) {
        let start = Instant::now();
        while condition(&mut guard) {
            match remaining_ms(start, timeout_ms) {
                Some(ms) => guard = self.wait_timeout(guard, ms).0,
                None => return (guard, false),
            }
        }
        (guard, true)
    }

    /// Wakes one waiter and unlocks in a single step.
    pub fn signal_and_unlock(&self, guard: MonitorGuard<'_, T>) {
        self.check_owner(&guard);
        mem::forget(guard);
        self.raw.signal_and_release();
    }

    pub fn strategy(&self) -> TimeoutStrategy {
        self.raw.strategy()
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

pub struct MonitorGuard<'a, T: 'a> {
    monitor: &'a Monitor<T>,
}

impl<'a, T: 'a> Deref for MonitorGuard<'a, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        unsafe { &*self.monitor.data.get() }
    }
}

impl<'a, T: 'a> DerefMut for MonitorGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *self.monitor.data.get() }
    }
}

impl<'a, T: 'a> Drop for MonitorGuard<'a, T> {
    fn drop(&mut self) {
        self.monitor.raw.release();
    }
}
