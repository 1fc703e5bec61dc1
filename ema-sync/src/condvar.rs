// EMA - ema-sync
// Module: Condition variable
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Condition variable over a pthread condition object.

use core::cell::UnsafeCell;

use ema_error::{check_os, Error, Result};

use crate::ffi;
use crate::mutex::RawLock;

/// Condition variable for blocking until guarded state changes.
///
/// The variable is not tied to one mutex at construction; each wait
/// names its mutex through the guard it borrows. All waiters of one
/// logical condition must use the same mutex, which in practice falls
/// out of the guard borrowing the one mutex that guards the state.
pub struct ConditionalVariable {
    raw: UnsafeCell<ffi::pthread_cond_t>,
}

// SAFETY: the pthread condition object is made for cross-thread use;
// every operation on it is internally synchronized by the libc.
unsafe impl Send for ConditionalVariable {}
// SAFETY: as above.
unsafe impl Sync for ConditionalVariable {}

impl ConditionalVariable {
    /// Creates the condition variable.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: UnsafeCell::new(ffi::pthread_cond_t::initializer()),
        }
    }

    /// Atomically releases the guarded lock and blocks until notified,
    /// re-acquiring the lock before returning.
    ///
    /// Fails with `InvalidState` if the guard does not currently hold
    /// its mutex. Spurious wakeups are possible; use
    /// [`ConditionalVariable::wait_until`] to wait for a predicate.
    pub fn wait<L: RawLock>(&self, guard: &mut L) -> Result<()> {
        if !guard.is_locked() {
            return Err(Error::invalid_state("wait requires a held lock"));
        }
        // SAFETY: both objects are valid and initialized, and the guard
        // holds the mutex as pthread_cond_wait requires.
        check_os(unsafe { ffi::pthread_cond_wait(self.raw.get(), guard.raw_mutex().raw()) })
    }

    /// Blocks until `condition` holds, re-checking after every wakeup.
    ///
    /// The lock is held whenever `condition` runs.
    pub fn wait_until<L, F>(&self, guard: &mut L, mut condition: F) -> Result<()>
    where
        L: RawLock,
        F: FnMut() -> bool,
    {
        while !condition() {
            self.wait(guard)?;
        }
        Ok(())
    }

    /// Wakes one waiter.
    pub fn notify_one(&self) -> Result<()> {
        // SAFETY: valid initialized condition object.
        check_os(unsafe { ffi::pthread_cond_signal(self.raw.get()) })
    }

    /// Wakes all waiters.
    pub fn notify_all(&self) -> Result<()> {
        // SAFETY: valid initialized condition object.
        check_os(unsafe { ffi::pthread_cond_broadcast(self.raw.get()) })
    }
}

impl Default for ConditionalVariable {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ConditionalVariable {
    fn drop(&mut self) {
        // Exclusive access means no thread is waiting on it.
        // SAFETY: valid initialized condition object with no waiters.
        let _ = unsafe { ffi::pthread_cond_destroy(self.raw.get()) };
    }
}
