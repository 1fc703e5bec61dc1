// EMA - ema-sync
// Module: POSIX threads FFI surface
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Hand-declared pthread bindings shared by the mutex and condition
//! variable wrappers.
//!
//! The object types are opaque byte blobs sized to cover glibc and
//! musl on 64-bit Linux targets (glibc: mutex 40, cond 48; musl: mutex
//! 40, cond 48). An all-zero blob is exactly the static initializer on
//! both libcs, which is what lets [`Mutex::new`](crate::Mutex::new)
//! and [`ConditionalVariable::new`](crate::ConditionalVariable::new)
//! be `const fn`s with no init call.

#![allow(non_camel_case_types)]

use core::ffi::c_int;

/// Opaque pthread mutex object, oversized for the supported libcs.
#[repr(C, align(8))]
pub struct pthread_mutex_t {
    size: [u8; 64],
}

impl pthread_mutex_t {
    /// The all-zero blob, equal to `PTHREAD_MUTEX_INITIALIZER`.
    pub const fn initializer() -> Self {
        Self { size: [0; 64] }
    }
}

/// Opaque pthread condition variable object.
#[repr(C, align(8))]
pub struct pthread_cond_t {
    size: [u8; 64],
}

impl pthread_cond_t {
    /// The all-zero blob, equal to `PTHREAD_COND_INITIALIZER`.
    pub const fn initializer() -> Self {
        Self { size: [0; 64] }
    }
}

extern "C" {
    // Mutex operations
    pub fn pthread_mutex_lock(mutex: *mut pthread_mutex_t) -> c_int;
    pub fn pthread_mutex_unlock(mutex: *mut pthread_mutex_t) -> c_int;
    pub fn pthread_mutex_destroy(mutex: *mut pthread_mutex_t) -> c_int;

    // Condition variable operations
    pub fn pthread_cond_wait(cond: *mut pthread_cond_t, mutex: *mut pthread_mutex_t) -> c_int;
    pub fn pthread_cond_signal(cond: *mut pthread_cond_t) -> c_int;
    pub fn pthread_cond_broadcast(cond: *mut pthread_cond_t) -> c_int;
    pub fn pthread_cond_destroy(cond: *mut pthread_cond_t) -> c_int;
}
