// EMA - ema-sync
// Module: EMA Synchronization Library
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! RAII synchronization primitives for the EMA runtime.
//!
//! Thin, allocation-free wrappers over POSIX threads objects:
//! [`Mutex`], the scope guards [`LockGuard`] and [`UniqueLock`], and
//! [`ConditionalVariable`]. Operations report failure as
//! [`Error`](ema_error::Error) values; only guard destructors swallow
//! the (unobservable there) unlock result.
//!
//! The mutex does not own the data it protects. Callers pair a
//! [`Mutex`] with the state it guards and take a guard around each
//! access, the discipline the thread pool in `ema-platform` follows.
//!
//! # Waiting
//!
//! [`ConditionalVariable::wait`] borrows the guard for the duration of
//! the wait instead of holding a reference to the mutex itself. The
//! guard proves which mutex is held and that it is held right now;
//! waiting without the lock is rejected as `InvalidState` rather than
//! being undefined behavior.

#![no_std]
#![allow(unsafe_code)]

#[cfg(test)]
extern crate std;

mod condvar;
mod ffi;
mod mutex;

pub use condvar::ConditionalVariable;
pub use mutex::{LockGuard, Mutex, RawLock, UniqueLock};
