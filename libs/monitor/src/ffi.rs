//! C ABI for hosts that bind by symbol. Handles are heap pointers owned by the
//! caller between `monitor_create` and `monitor_destroy`.

use core::ptr;

use crate::monitor::LowLevelMonitor;

#[no_mangle]
pub extern "C" fn monitor_create() -> *mut LowLevelMonitor {
    match LowLevelMonitor::new() {
        Ok(monitor) => Box::into_raw(Box::new(monitor)),
        Err(e) => {
            debug!("monitor_create: {}", e);
            ptr::null_mut()
        }
    }
}

/// # Safety
///
/// `monitor` must come from `monitor_create`, be idle, and not be used again.
#[no_mangle]
pub unsafe extern "C" fn monitor_destroy(monitor: *mut LowLevelMonitor) {
    debug_assert!(!monitor.is_null());
    drop(Box::from_raw(monitor));
}

/// # Safety
///
/// `monitor` must be a live handle from `monitor_create`.
#[no_mangle]
pub unsafe extern "C" fn monitor_acquire(monitor: *mut LowLevelMonitor) {
    debug_assert!(!monitor.is_null());
    (*monitor).acquire();
}

/// # Safety
///
/// `monitor` must be a live handle held by the calling thread.
#[no_mangle]
pub unsafe extern "C" fn monitor_release(monitor: *mut LowLevelMonitor) {
    debug_assert!(!monitor.is_null());
    (*monitor).release();
}

/// # Safety
///
/// `monitor` must be a live handle held by the calling thread.
#[no_mangle]
pub unsafe extern "C" fn monitor_wait(monitor: *mut LowLevelMonitor) {
    debug_assert!(!monitor.is_null());
    (*monitor).wait();
}

/// Returns 1 if signaled and 0 on timeout.
///
/// # Safety
///
/// `monitor` must be a live handle held by the calling thread, and
/// `timeout_ms` must not be negative.
#[no_mangle]
pub unsafe extern "C" fn monitor_timed_wait(monitor: *mut LowLevelMonitor, timeout_ms: i32) -> i32 {
    debug_assert!(!monitor.is_null());
    debug_assert!(timeout_ms >= 0, "negative timeout {}", timeout_ms);
    (*monitor).timed_wait(timeout_ms.max(0) as u32) as i32
}

/// # Safety
///
/// `monitor` must be a live handle held by the calling thread.
#[no_mangle]
pub unsafe extern "C" fn monitor_signal_and_release(monitor: *mut LowLevelMonitor) {
    debug_assert!(!monitor.is_null());
    (*monitor).signal_and_release();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_round_trip() {
        let handle = monitor_create();
        assert!(!handle.is_null());
        unsafe {
            monitor_acquire(handle);
            assert_eq!(monitor_timed_wait(handle, 1), 0);
            monitor_signal_and_release(handle);
            monitor_acquire(handle);
            monitor_release(handle);
            monitor_destroy(handle);
        }
    }
}
