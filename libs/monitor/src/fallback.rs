//! Bounded waiting on a condition variable that only understands wall-clock
//! deadlines.
//!
//! A wall-clock deadline handed to the platform is exposed to clock changes,
//! so the wait is cut into slices of at most [`MAX_SLICE_MS`] and the time
//! actually spent is measured on the monotonic clock between slices.

use crate::time::{Clock, Timespec};

/// Upper bound on a single wall-clock sub-wait.
pub const MAX_SLICE_MS: i64 = 100;

/// Waits for up to `timeout_ms` monotonic milliseconds.
///
/// `wait_until` performs one sub-wait with an absolute wall-clock deadline and
/// returns the raw `pthread_cond_timedwait` result. Zero means signaled. Every
/// other result, `ETIMEDOUT` or otherwise, ends the slice and the loop carries
/// on from the monotonic clock. Returns `true` if a sub-wait was signaled.
pub fn wait_measured<C, W>(clock: &C, timeout_ms: u32, mut wait_until: W) -> bool
where
    C: Clock + ?Sized,
    W: FnMut(Timespec) -> libc::c_int,
{
    let timeout_ms = i64::from(timeout_ms);
    let start = clock.monotonic();
    let mut remaining_ms = timeout_ms;
    while remaining_ms > 0 {
        let slice_ms = remaining_ms.min(MAX_SLICE_MS);
        let deadline = clock.realtime().add_millis(slice_ms as u64);
        let error = wait_until(deadline);
        if error == 0 {
            return true;
        }
        if error != libc::ETIMEDOUT {
            debug!("sub-wait failed with {}, counted as a timeout", error);
        }
        let elapsed_ms = clock.monotonic().millis_since(start);
        remaining_ms = timeout_ms - elapsed_ms;
    }
    false
}
