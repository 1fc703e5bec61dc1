// EMA - ema-platform
// Module: Runtime configuration
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Runtime tunables for the threading layer.
//!
//! Sizing lives in one place, as data: a [`RuntimeConfig`] value that
//! the agent composes at startup and validates once, instead of a set
//! of compile-time switches scattered through the build. The constants
//! here are the defaults and the floors; the const generic parameters
//! of [`Thread`](crate::Thread) and [`ThreadPool`](crate::ThreadPool)
//! default to them.

use ema_error::{Error, Result};

/// Default per-thread stack size in bytes.
pub const DEFAULT_THREAD_STACK_SIZE: usize = 128 * 1024;

/// Default arena size for an embedded entry closure or pool task.
pub const DEFAULT_CALLABLE_SIZE: usize = 256;

/// Default capacity of the thread pool task queue.
pub const DEFAULT_POOL_QUEUE_SIZE: usize = 1024;

/// Default maximum length of a formatted log line.
pub const DEFAULT_LOG_LINE_LEN: usize = 120;

/// Smallest usable thread stack. Below this even a trivial entry
/// closure risks overflow once the libc guard pages are accounted for.
pub const MIN_THREAD_STACK: usize = 16 * 1024;

/// Alignment required of a thread stack base, one page.
pub const THREAD_STACK_ALIGN: usize = 4096;

/// Rounds `value` up to the next multiple of `align`.
///
/// `align` must be a power of two.
#[must_use]
pub const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

/// Threading-layer tunables, validated as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size of each managed thread, in bytes.
    pub thread_stack_size: usize,
    /// Arena size for captured closures, in bytes.
    pub max_callable_size: usize,
    /// Capacity of the pool task queue.
    pub pool_queue_size: usize,
    /// Log verbosity of the runtime.
    pub log_level: log::LevelFilter,
    /// Maximum length of a formatted log line, in bytes.
    pub log_line_len: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            thread_stack_size: DEFAULT_THREAD_STACK_SIZE,
            max_callable_size: DEFAULT_CALLABLE_SIZE,
            pool_queue_size: DEFAULT_POOL_QUEUE_SIZE,
            log_level: log::LevelFilter::Info,
            log_line_len: DEFAULT_LOG_LINE_LEN,
        }
    }
}

impl RuntimeConfig {
    /// Checks the configuration for internal consistency.
    ///
    /// Every violation reports `InvalidArgument` naming the field.
    pub fn validate(&self) -> Result<()> {
        if self.thread_stack_size % THREAD_STACK_ALIGN != 0 {
            return Err(Error::invalid_argument(
                "thread_stack_size must be page aligned",
            ));
        }
        // The closure arena is carved out of the stack allocation.
        let reserved = align_up(self.max_callable_size, THREAD_STACK_ALIGN);
        if self.thread_stack_size < MIN_THREAD_STACK + reserved {
            return Err(Error::invalid_argument(
                "thread_stack_size leaves no usable stack",
            ));
        }
        if self.max_callable_size == 0 {
            return Err(Error::invalid_argument("max_callable_size must be nonzero"));
        }
        if self.pool_queue_size == 0 {
            return Err(Error::invalid_argument("pool_queue_size must be nonzero"));
        }
        if self.log_line_len == 0 {
            return Err(Error::invalid_argument("log_line_len must be nonzero"));
        }
        Ok(())
    }
}
