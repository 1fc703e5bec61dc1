// EMA - ema-error
// Module: EMA Error Handling
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Value-based error handling for the EMA runtime toolkit.
//!
//! Every fallible operation in the workspace returns [`Result`], never
//! panics and never unwinds across a component boundary. The error type
//! is `Copy` and allocation-free so it can be produced and propagated on
//! targets without a heap.
//!
//! POSIX error codes reported by OS primitives (`pthread_*`,
//! `clock_gettime`) convert directly into [`Error`] via
//! [`Error::from_os`] or the [`check_os`] helper, so a nonzero return
//! from a syscall wrapper becomes the returned error value.
//!
//! # Usage
//!
//! ```
//! use ema_error::{check_os, Error, ErrorKind, Result};
//!
//! fn grow(len: usize, cap: usize) -> Result<usize> {
//!     if len == cap {
//!         return Err(Error::no_memory("container capacity exceeded"));
//!     }
//!     Ok(len + 1)
//! }
//!
//! assert_eq!(grow(4, 4).unwrap_err().kind(), ErrorKind::NoMemory);
//! assert!(check_os(0).is_ok());
//! ```

#![no_std]

mod error;

pub use error::{check_os, Error, ErrorKind, Result};
