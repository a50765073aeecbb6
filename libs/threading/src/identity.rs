/// The CPU the calling thread is running on, where the platform can tell.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn current_cpu() -> Option<u32> {
    let cpu = unsafe { libc::sched_getcpu() };
    u32::try_from(cpu).ok()
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn current_cpu() -> Option<u32> {
    None
}

/// A non-truncated OS thread id, suitable for diagnostics.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn os_thread_id() -> u64 {
    unsafe { libc::syscall(libc::SYS_gettid) as u64 }
}

#[cfg(target_vendor = "apple")]
pub fn os_thread_id() -> u64 {
    let mut tid = 0u64;
    let error = unsafe { libc::pthread_threadid_np(libc::pthread_self(), &mut tid) };
    debug_assert_eq!(error, 0, "pthread_threadid_np");
    tid
}

#[cfg(target_os = "freebsd")]
pub fn os_thread_id() -> u64 {
    unsafe { libc::pthread_getthreadid_np() as u64 }
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_vendor = "apple",
    target_os = "freebsd"
)))]
pub fn os_thread_id() -> u64 {
    unsafe { libc::pthread_self() as usize as u64 }
}

/// The OS thread id if it fits a non-zero `u32`.
pub fn try_os_thread_id_u32() -> Option<u32> {
    match os_thread_id() as u32 {
        0 => None,
        id => Some(id),
    }
}
