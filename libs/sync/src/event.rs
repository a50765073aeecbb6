use std::time::Instant;

use monitor::MonitorError;

use crate::{remaining_ms, Monitor, MonitorGuard};

struct EventState {
    signaled: bool,
    waiters: usize,
}

/// An event that stays set until reset, releasing every waiter.
///
/// The monitor only wakes one thread per signal, so `set` wakes one waiter
/// and each woken waiter wakes the next while the event is still set. A
/// `reset` that lands before a waiter runs again keeps that waiter blocked.
pub struct ManualResetEvent {
    state: Monitor<EventState>,
}

impl ManualResetEvent {
    pub fn new(initially_set: bool) -> Result<Self, MonitorError> {
        Ok(Self {
            state: Monitor::new(EventState {
                signaled: initially_set,
                waiters: 0,
            })?,
        })
    }

    pub fn set(&self) {
        let mut state = self.state.lock();
        state.signaled = true;
        if state.waiters > 0 {
            trace!("set wakes 1 of {} waiters", state.waiters);
            self.state.signal_and_unlock(state);
        }
    }

    pub fn reset(&self) {
        self.state.lock().signaled = false;
    }

    pub fn is_set(&self) -> bool {
        self.state.lock().signaled
    }

    fn pass_on(&self, state: MonitorGuard<'_, EventState>) {
        if state.signaled && state.waiters > 0 {
            self.state.signal_and_unlock(state);
        }
    }

    pub fn wait(&self) {
        let mut state = self.state.lock();
        if !state.signaled {
            state.waiters += 1;
            while !state.signaled {
                state = self.state.wait(state);
            }
            state.waiters -= 1;
        }
        self.pass_on(state);
    }

    /// Returns whether the event was set before `timeout_ms` passed.
    pub fn wait_timeout(&self, timeout_ms: u32) -> bool {
        let start = Instant::now();
        let mut state = self.state.lock();
        if !state.signaled {
            state.waiters += 1;
            while !state.signaled {
                match remaining_ms(start, timeout_ms) {
                    Some(ms) => state = self.state.wait_timeout(state, ms).0,
                    None => break,
                }
            }
            state.waiters -= 1;
        }
        let signaled = state.signaled;
        self.pass_on(state);
        signaled
    }
}

/// Releases handed out by `set` and not yet taken, against the threads
/// waiting for one. At most one permit exceeds the waiter count.
struct AutoResetState {
    permits: usize,
    waiters: usize,
}

/// An event that releases a single waiter per `set` and resets itself.
/// Sets with nobody left to release coalesce into one.
pub struct AutoResetEvent {
    state: Monitor<AutoResetState>,
}

impl AutoResetEvent {
    pub fn new(initially_set: bool) -> Result<Self, MonitorError> {
        Ok(Self {
            state: Monitor::new(AutoResetState {
                permits: usize::from(initially_set),
                waiters: 0,
            })?,
        })
    }

    pub fn set(&self) {
        let mut state = self.state.lock();
        if state.permits > state.waiters {
            return;
        }
        state.permits += 1;
        if state.permits <= state.waiters {
            self.state.signal_and_unlock(state);
        }
    }

    pub fn wait(&self) {
        let mut state = self.state.lock();
        state.waiters += 1;
        while state.permits == 0 {
            state = self.state.wait(state);
        }
        state.permits -= 1;
        state.waiters -= 1;
    }

    pub fn wait_timeout(&self, timeout_ms: u32) -> bool {
        let start = Instant::now();
        let mut state = self.state.lock();
        state.waiters += 1;
        while state.permits == 0 {
            match remaining_ms(start, timeout_ms) {
                Some(ms) => state = self.state.wait_timeout(state, ms).0,
                None => break,
            }
        }
        state.waiters -= 1;
        let released = state.permits > 0;
        if released {
            state.permits -= 1;
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread, time::Duration};
    use testing::{assert_elapsed, eventually, spawn_all};

    #[test]
    fn initially_set_event_does_not_block() {
        let event = ManualResetEvent::new(true).unwrap();
        assert!(event.is_set());
        event.wait();
        assert!(event.wait_timeout(0));
        assert!(event.is_set());
    }

    #[test]
    fn reset_event_times_out() {
        let event = ManualResetEvent::new(true).unwrap();
        event.reset();
        assert!(!event.is_set());
        let start = Instant::now();
        assert!(!event.wait_timeout(50));
        assert_elapsed!(start.elapsed(), 45, 2_000);
    }

    #[test]
    fn auto_reset_consumes_the_signal() {
        let event = AutoResetEvent::new(false).unwrap();
        event.set();
        event.set();
        assert!(event.wait_timeout(10));
        assert!(!event.wait_timeout(10));
    }

    fn parked(event: &AutoResetEvent) -> usize {
        event.state.lock().waiters
    }

    #[test]
    fn back_to_back_sets_release_two_parked_waiters() {
        for _ in 0..20 {
            let event = Arc::new(AutoResetEvent::new(false).unwrap());
            let handles = {
                let event = event.clone();
                spawn_all("auto", 2, move |_| event.wait_timeout(5_000))
            };
            assert!(eventually(Duration::from_secs(5), || parked(&event) == 2));
            event.set();
            event.set();
            for handle in handles {
                assert!(handle.join().unwrap());
            }
            assert!(!event.wait_timeout(0));
        }
    }

    #[test]
    fn set_after_every_waiter_is_released_is_kept_for_the_next() {
        let event = Arc::new(AutoResetEvent::new(false).unwrap());
        let waiter = {
            let event = event.clone();
            thread::spawn(move || event.wait())
        };
        assert!(eventually(Duration::from_secs(5), || parked(&event) == 1));
        event.set();
        event.set();
        event.set();
        waiter.join().unwrap();
        assert!(event.wait_timeout(0));
        assert!(!event.wait_timeout(0));
    }
}
