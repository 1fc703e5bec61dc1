// EMA - ema-sync
// Module: Mutex and scope guards
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The [`Mutex`] wrapper and its RAII guards.
//!
//! [`LockGuard`] is the fire-and-forget guard: constructing it takes
//! the lock, dropping it releases. A guard exists only for a lock that
//! was actually taken; if acquisition fails no guard is produced and
//! nothing is released later. [`UniqueLock`] additionally supports
//! explicit re-lock and unlock within its scope, which the condition
//! variable wait loop in the thread pool relies on.

use core::cell::UnsafeCell;

use ema_error::{check_os, Error, Result};

use crate::ffi;

/// Mutual exclusion primitive over a pthread mutex.
///
/// The mutex does not own guarded data. It must not be moved while
/// locked; guards borrow the mutex, so the borrow checker rules that
/// out.
pub struct Mutex {
    raw: UnsafeCell<ffi::pthread_mutex_t>,
}

// SAFETY: the pthread mutex is the sharing point itself; all access to
// the inner object goes through its own locking protocol.
unsafe impl Send for Mutex {}
// SAFETY: as above.
unsafe impl Sync for Mutex {}

impl Mutex {
    /// Creates an unlocked mutex.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: UnsafeCell::new(ffi::pthread_mutex_t::initializer()),
        }
    }

    /// Blocks until the mutex is acquired.
    ///
    /// Prefer the guards; direct use leaves release to the caller.
    pub fn lock(&self) -> Result<()> {
        // SAFETY: the blob is a valid initialized pthread mutex for the
        // lifetime of `self`.
        check_os(unsafe { ffi::pthread_mutex_lock(self.raw.get()) })
    }

    /// Releases the mutex. The caller must hold it.
    pub fn unlock(&self) -> Result<()> {
        // SAFETY: as `lock`.
        check_os(unsafe { ffi::pthread_mutex_unlock(self.raw.get()) })
    }

    /// Raw object pointer, for handing to `pthread_cond_wait`.
    pub(crate) fn raw(&self) -> *mut ffi::pthread_mutex_t {
        self.raw.get()
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Mutex {
    fn drop(&mut self) {
        // Exclusive access here means no guard exists and the mutex is
        // unlocked. The result is unobservable in a destructor.
        // SAFETY: valid initialized mutex, not locked.
        let _ = unsafe { ffi::pthread_mutex_destroy(self.raw.get()) };
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A held lock that a [`ConditionalVariable`](crate::ConditionalVariable)
/// can atomically release and re-acquire.
///
/// Implemented by the two guards; sealed because the contract ("the
/// mutex behind `raw_mutex` is held whenever `is_locked` says so") is
/// not checkable from outside this crate.
pub trait RawLock: sealed::Sealed {
    /// The mutex the guard was taken over.
    #[doc(hidden)]
    fn raw_mutex(&self) -> &Mutex;

    /// Whether the lock is currently held by this guard.
    fn is_locked(&self) -> bool;
}

/// Scope guard holding a [`Mutex`] from construction to drop.
pub struct LockGuard<'m> {
    mutex: &'m Mutex,
}

impl<'m> LockGuard<'m> {
    /// Acquires the mutex and returns the guard.
    ///
    /// On acquisition failure no guard exists, so nothing will be
    /// released on scope exit.
    pub fn new(mutex: &'m Mutex) -> Result<Self> {
        mutex.lock()?;
        Ok(Self { mutex })
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        // Unlocking a lock this guard holds cannot fail on the
        // supported libcs; the result is unobservable here anyway.
        let _ = self.mutex.unlock();
    }
}

impl sealed::Sealed for LockGuard<'_> {}

impl RawLock for LockGuard<'_> {
    fn raw_mutex(&self) -> &Mutex {
        self.mutex
    }

    fn is_locked(&self) -> bool {
        true
    }
}

/// Scope guard with explicit unlock and re-lock.
///
/// Starts out holding the mutex. Dropping it releases the mutex only
/// if it is held at that point.
pub struct UniqueLock<'m> {
    mutex: &'m Mutex,
    held: bool,
}

impl<'m> UniqueLock<'m> {
    /// Acquires the mutex and returns the guard.
    pub fn new(mutex: &'m Mutex) -> Result<Self> {
        mutex.lock()?;
        Ok(Self { mutex, held: true })
    }

    /// Re-acquires the mutex after an explicit [`UniqueLock::unlock`].
    ///
    /// Fails with `InvalidState` if the guard already holds the lock.
    pub fn lock(&mut self) -> Result<()> {
        if self.held {
            return Err(Error::invalid_state("lock already held"));
        }
        self.mutex.lock()?;
        self.held = true;
        Ok(())
    }

    /// Releases the mutex before the guard goes out of scope.
    ///
    /// Fails with `InvalidState` if the guard does not hold the lock.
    pub fn unlock(&mut self) -> Result<()> {
        if !self.held {
            return Err(Error::invalid_state("lock not held"));
        }
        // Clear `held` first so a failed unlock cannot lead to a second
        // unlock from the destructor.
        self.held = false;
        self.mutex.unlock()
    }

    /// Whether the guard currently holds the mutex.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held
    }
}

impl Drop for UniqueLock<'_> {
    fn drop(&mut self) {
        if self.held {
            let _ = self.mutex.unlock();
        }
    }
}

impl sealed::Sealed for UniqueLock<'_> {}

impl RawLock for UniqueLock<'_> {
    fn raw_mutex(&self) -> &Mutex {
        self.mutex
    }

    fn is_locked(&self) -> bool {
        self.held
    }
}
