use core::cell::UnsafeCell;

use crate::{error::MonitorError, time::Timespec};

/// Declares, from one list of target OSes, whether conditions can be bound to
/// `CLOCK_MONOTONIC` and the `pthread_condattr_setclock` used to do it. Other
/// targets get a stand-in that fails with `ENOSYS`.
macro_rules! condattr_setclock_targets {
    ($($os:tt),* $(,)?) => {
        pub(crate) const HAS_CONDATTR_SETCLOCK: bool = cfg!(any($(target_os = $os),*));

        #[cfg(any($(target_os = $os),*))]
        use libc::pthread_condattr_setclock;

        #[cfg(not(any($(target_os = $os),*)))]
        unsafe fn pthread_condattr_setclock(
            _attr: *mut libc::pthread_condattr_t,
            _clock: libc::clockid_t,
        ) -> libc::c_int {
            libc::ENOSYS
        }
    };
}

condattr_setclock_targets!(
    "linux",
    "android",
    "freebsd",
    "dragonfly",
    "netbsd",
    "openbsd",
    "illumos",
    "solaris",
);

#[cfg(target_vendor = "apple")]
extern "C" {
    fn pthread_cond_timedwait_relative_np(
        cond: *mut libc::pthread_cond_t,
        mutex: *mut libc::pthread_mutex_t,
        reltime: *const libc::timespec,
    ) -> libc::c_int;
}

/// A `pthread_mutex_t` at a fixed heap address.
pub struct RawMutex {
    raw: Box<UnsafeCell<libc::pthread_mutex_t>>,
}

impl RawMutex {
    pub fn new() -> Result<Self, MonitorError> {
        let raw = Box::new(UnsafeCell::new(libc::PTHREAD_MUTEX_INITIALIZER));
        let error = unsafe { libc::pthread_mutex_init(raw.get(), core::ptr::null()) };
        if error != 0 {
            return Err(MonitorError::MutexInit(error));
        }
        Ok(Self { raw })
    }

    pub(crate) fn as_ptr(&self) -> *mut libc::pthread_mutex_t {
        self.raw.get()
    }

    pub fn lock(&self) {
        let error = unsafe { libc::pthread_mutex_lock(self.as_ptr()) };
        debug_assert_eq!(error, 0, "pthread_mutex_lock");
    }

    pub fn unlock(&self) {
        let error = unsafe { libc::pthread_mutex_unlock(self.as_ptr()) };
        debug_assert_eq!(error, 0, "pthread_mutex_unlock");
    }
}

impl Drop for RawMutex {
    fn drop(&mut self) {
        let error = unsafe { libc::pthread_mutex_destroy(self.as_ptr()) };
        debug_assert_eq!(error, 0, "pthread_mutex_destroy");
    }
}

/// Condition attributes, destroyed on every exit path of `RawCondvar::new`.
struct CondAttr {
    raw: Box<libc::pthread_condattr_t>,
}

impl CondAttr {
    fn new() -> Result<Self, MonitorError> {
        let mut raw: Box<libc::pthread_condattr_t> = Box::new(unsafe { core::mem::zeroed() });
        let error = unsafe { libc::pthread_condattr_init(&mut *raw) };
        if error != 0 {
            return Err(MonitorError::CondAttrInit(error));
        }
        Ok(Self { raw })
    }

    fn set_monotonic(&mut self) -> Result<(), MonitorError> {
        let error = unsafe { pthread_condattr_setclock(&mut *self.raw, libc::CLOCK_MONOTONIC) };
        if error != 0 {
            return Err(MonitorError::SetClock(error));
        }
        Ok(())
    }
}

impl Drop for CondAttr {
    fn drop(&mut self) {
        let error = unsafe { libc::pthread_condattr_destroy(&mut *self.raw) };
        debug_assert_eq!(error, 0, "pthread_condattr_destroy");
    }
}

/// A `pthread_cond_t` at a fixed heap address, running on either
/// `CLOCK_MONOTONIC` or the platform default (wall) clock.
pub struct RawCondvar {
    raw: Box<UnsafeCell<libc::pthread_cond_t>>,
}

impl RawCondvar {
    pub fn new(monotonic: bool) -> Result<Self, MonitorError> {
        let raw = Box::new(UnsafeCell::new(libc::PTHREAD_COND_INITIALIZER));
        let error = if monotonic {
            let mut attr = CondAttr::new()?;
            attr.set_monotonic()?;
            unsafe { libc::pthread_cond_init(raw.get(), &*attr.raw) }
        } else {
            unsafe { libc::pthread_cond_init(raw.get(), core::ptr::null()) }
        };
        if error != 0 {
            return Err(MonitorError::CondInit(error));
        }
        Ok(Self { raw })
    }

    fn as_ptr(&self) -> *mut libc::pthread_cond_t {
        self.raw.get()
    }

    pub fn wait(&self, mutex: &RawMutex) {
        let error = unsafe { libc::pthread_cond_wait(self.as_ptr(), mutex.as_ptr()) };
        debug_assert_eq!(error, 0, "pthread_cond_wait");
    }

    /// Waits until `deadline` on the clock this condition was created with.
    /// Returns the raw `pthread_cond_timedwait` result.
    pub fn wait_until(&self, mutex: &RawMutex, deadline: Timespec) -> libc::c_int {
        let deadline = deadline.to_libc();
        unsafe { libc::pthread_cond_timedwait(self.as_ptr(), mutex.as_ptr(), &deadline) }
    }

    /// Waits for at most `timeout` measured on the platform's monotonic base.
    #[cfg(target_vendor = "apple")]
    pub fn wait_relative(&self, mutex: &RawMutex, timeout: Timespec) -> libc::c_int {
        let timeout = timeout.to_libc();
        unsafe { pthread_cond_timedwait_relative_np(self.as_ptr(), mutex.as_ptr(), &timeout) }
    }

    #[cfg(not(target_vendor = "apple"))]
    pub fn wait_relative(&self, _mutex: &RawMutex, _timeout: Timespec) -> libc::c_int {
        unreachable!("relative monotonic waits are only available on Apple targets")
    }

    pub fn signal(&self) {
        let error = unsafe { libc::pthread_cond_signal(self.as_ptr()) };
        debug_assert_eq!(error, 0, "pthread_cond_signal");
    }
}

impl Drop for RawCondvar {
    fn drop(&mut self) {
        let error = unsafe { libc::pthread_cond_destroy(self.as_ptr()) };
        debug_assert_eq!(error, 0, "pthread_cond_destroy");
    }
}
