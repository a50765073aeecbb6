use core::ffi::c_void;

use crate::{spawn::ThreadEntry, ThreadError};

/// Returns 1 if the thread was started and 0 otherwise.
///
/// # Safety
///
/// See [`create_thread`](crate::create_thread).
#[no_mangle]
pub unsafe extern "C" fn thread_create(
    stack_size: usize,
    entry: ThreadEntry,
    parameter: *mut c_void,
) -> i32 {
    let result: Result<(), ThreadError> = crate::create_thread(stack_size, entry, parameter);
    result.is_ok() as i32
}

/// Returns -1 when the CPU is unknown.
#[no_mangle]
pub extern "C" fn thread_current_cpu() -> i32 {
    crate::current_cpu().map_or(-1, |cpu| cpu as i32)
}

#[no_mangle]
pub extern "C" fn thread_os_id_u64() -> u64 {
    crate::os_thread_id()
}

/// Returns `u32::MAX` when the id is unknown.
#[no_mangle]
pub extern "C" fn thread_try_os_id_u32() -> u32 {
    crate::try_os_thread_id_u32().unwrap_or(u32::MAX)
}

#[no_mangle]
pub extern "C" fn process_exit(code: i32) -> ! {
    crate::exit(code)
}

#[no_mangle]
pub extern "C" fn process_abort() -> ! {
    crate::abort()
}
