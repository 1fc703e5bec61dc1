// EMA - ema-platform
// Module: EMA Platform Library
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Threading and clock services for the EMA runtime.
//!
//! The platform crate owns everything that touches the OS directly:
//!
//! - [`Thread`]: a POSIX thread running on a caller-owned,
//!   fixed-size stack, with its entry closure embedded in that same
//!   allocation ([`StaticCallable`](ema_foundation::StaticCallable));
//! - [`ThreadPool`]: a fixed set of such threads draining a bounded
//!   task queue;
//! - [`Time`]: nanosecond wall-clock timestamps with ISO 8601
//!   formatting;
//! - [`RuntimeConfig`]: the tunables of the above, validated once at
//!   startup instead of being baked in at compile time.
//!
//! Memory for threads and tasks is acquired when the owning object is
//! constructed and never again: spawning, queuing and running are
//! allocation-free, and exhaustion surfaces as
//! [`NoMemory`](ema_error::ErrorKind::NoMemory) errors.

pub mod config;
pub mod pool;
pub mod thread;
pub mod time;

pub use config::RuntimeConfig;
pub use pool::ThreadPool;
pub use thread::Thread;
pub use time::{Duration, Time};
