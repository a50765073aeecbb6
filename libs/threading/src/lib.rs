//! Thin wrappers over the platform thread facilities the monitor's users need:
//! detached thread creation, thread identity, and process termination.

#[macro_use]
extern crate log;

pub mod ffi;
mod identity;
mod spawn;

use thiserror::Error;

pub use crate::identity::{current_cpu, os_thread_id, try_os_thread_id_u32};
pub use crate::spawn::{create_thread, effective_stack_size, spawn_detached, ThreadEntry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThreadError {
    #[error("pthread_attr_init failed with errno {0}")]
    AttrInit(i32),
    #[error("pthread_attr_setstacksize({size}) failed with errno {errno}")]
    StackSize { size: usize, errno: i32 },
    #[error("pthread_create failed with errno {0}")]
    Create(i32),
}

pub fn exit(code: i32) -> ! {
    std::process::exit(code)
}

pub fn abort() -> ! {
    std::process::abort()
}
