use core::{ffi::c_void, ptr};
use std::panic::{self, AssertUnwindSafe};

use crate::ThreadError;

pub type ThreadEntry = extern "C" fn(*mut c_void) -> *mut c_void;

/// Default stack for threads created with a requested size of zero, matching
/// the Windows default instead of the much smaller Darwin one.
#[cfg(target_vendor = "apple")]
const DEFAULT_STACK_SIZE: usize = 1536 * 1024;

/// The stack size actually requested from pthreads. Zero means "leave the
/// attribute alone".
pub fn effective_stack_size(requested: usize) -> usize {
    #[cfg(target_vendor = "apple")]
    let requested = if requested == 0 {
        DEFAULT_STACK_SIZE
    } else {
        requested
    };
    if requested == 0 {
        0
    } else {
        requested.max(libc::PTHREAD_STACK_MIN)
    }
}

struct ThreadAttr {
    raw: Box<libc::pthread_attr_t>,
}

impl ThreadAttr {
    fn new() -> Result<Self, ThreadError> {
        let mut raw: Box<libc::pthread_attr_t> = Box::new(unsafe { core::mem::zeroed() });
        let error = unsafe { libc::pthread_attr_init(&mut *raw) };
        if error != 0 {
            return Err(ThreadError::AttrInit(error));
        }
        Ok(Self { raw })
    }
}

impl Drop for ThreadAttr {
    fn drop(&mut self) {
        let error = unsafe { libc::pthread_attr_destroy(&mut *self.raw) };
        debug_assert_eq!(error, 0, "pthread_attr_destroy");
    }
}

/// Starts a detached thread running `entry(parameter)`.
///
/// # Safety
///
/// `entry` takes ownership of whatever `parameter` points to; it must be valid
/// to use from another thread for as long as `entry` runs.
pub unsafe fn create_thread(
    stack_size: usize,
    entry: ThreadEntry,
    parameter: *mut c_void,
) -> Result<(), ThreadError> {
    let mut attr = ThreadAttr::new()?;

    let error = libc::pthread_attr_setdetachstate(&mut *attr.raw, libc::PTHREAD_CREATE_DETACHED);
    debug_assert_eq!(error, 0, "pthread_attr_setdetachstate");

    let stack_size = effective_stack_size(stack_size);
    if stack_size > 0 {
        let error = libc::pthread_attr_setstacksize(&mut *attr.raw, stack_size);
        if error != 0 {
            return Err(ThreadError::StackSize {
                size: stack_size,
                errno: error,
            });
        }
    }

    let mut thread: libc::pthread_t = core::mem::zeroed();
    let error = libc::pthread_create(&mut thread, &*attr.raw, entry, parameter);
    if error != 0 {
        return Err(ThreadError::Create(error));
    }
    trace!("started detached thread, stack size {}", stack_size);
    Ok(())
}

extern "C" fn run_boxed<F: FnOnce() + Send + 'static>(parameter: *mut c_void) -> *mut c_void {
    let f = unsafe { *Box::from_raw(parameter.cast::<F>()) };
    if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
        error!("detached thread panicked");
        std::process::abort();
    }
    ptr::null_mut()
}

/// Runs `f` on a new detached thread. There is no handle to join; signal
/// completion through a monitor if it matters.
pub fn spawn_detached<F>(stack_size: usize, f: F) -> Result<(), ThreadError>
where
    F: FnOnce() + Send + 'static,
{
    let parameter = Box::into_raw(Box::new(f)).cast::<c_void>();
    let result = unsafe { create_thread(stack_size, run_boxed::<F>, parameter) };
    if let Err(e) = &result {
        debug!("spawn_detached: {}", e);
        drop(unsafe { Box::from_raw(parameter.cast::<F>()) });
    }
    result
}
