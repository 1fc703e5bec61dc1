// EMA - ema-foundation
// Module: Inline closure storage
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![allow(unsafe_code)]

//! Allocation-free storage for a single `FnOnce()` closure.
//!
//! [`StaticCallable`] is the dispatch block of the threading layer: a
//! thread entry point or pool task is captured into a fixed-size inline
//! arena instead of a `Box<dyn FnOnce()>`, so arming and running work
//! never touches the heap. A closure whose captures exceed the arena is
//! rejected with [`NoMemory`](ema_error::ErrorKind::NoMemory) at
//! capture time, not discovered at spawn time.
//!
//! The concrete closure type is erased through two monomorphized
//! function pointers, one to run the closure and one to drop it
//! without running. The value itself lives as raw bytes in the arena;
//! moving the `StaticCallable` moves those bytes, which is sound
//! because no reference into the arena outlives a method call.

use core::mem::MaybeUninit;

use ema_error::{Error, Result};

/// Alignment guaranteed for the captured closure.
pub const CALLABLE_ALIGN: usize = 16;

#[repr(C, align(16))]
struct Arena<const CAP: usize> {
    bytes: [MaybeUninit<u8>; CAP],
}

/// Inline storage for one `FnOnce() + Send` closure of at most `CAP`
/// bytes.
///
/// States: *empty* (fresh, after [`invoke`](Self::invoke) or
/// [`reset`](Self::reset)) and *armed* (after a successful
/// [`capture`](Self::capture)). Invoking consumes the closure; a second
/// invoke reports `NotFound`.
pub struct StaticCallable<const CAP: usize> {
    arena: Arena<CAP>,
    invoke_fn: Option<unsafe fn(*mut u8)>,
    drop_fn: Option<unsafe fn(*mut u8)>,
    size: usize,
}

impl<const CAP: usize> StaticCallable<CAP> {
    /// Creates an empty callable.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arena: Arena {
                bytes: [const { MaybeUninit::uninit() }; CAP],
            },
            invoke_fn: None,
            drop_fn: None,
            size: 0,
        }
    }

    /// Captures `f` into the arena, replacing (and dropping) any
    /// closure armed before.
    ///
    /// Fails with `NoMemory` if the captures of `f` exceed `CAP` bytes
    /// and with `InvalidArgument` if `f` requires more than
    /// [`CALLABLE_ALIGN`]-byte alignment. On failure the callable is
    /// left empty and `f` is dropped.
    pub fn capture<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce() + Send,
    {
        self.reset();
        if core::mem::size_of::<F>() > CAP {
            return Err(Error::no_memory("closure captures exceed arena"));
        }
        if core::mem::align_of::<F>() > CALLABLE_ALIGN {
            return Err(Error::invalid_argument("closure alignment unsupported"));
        }
        // SAFETY: the arena holds at least size_of::<F>() bytes at
        // alignment >= align_of::<F>(); writing takes ownership of `f`.
        unsafe {
            self.arena.bytes.as_mut_ptr().cast::<F>().write(f);
        }
        self.invoke_fn = Some(invoke_erased::<F>);
        self.drop_fn = Some(drop_erased::<F>);
        self.size = core::mem::size_of::<F>();
        Ok(())
    }

    /// Runs the armed closure, consuming it.
    ///
    /// Fails with `NotFound` if the callable is empty. After the call
    /// the callable is empty again and may be re-armed.
    pub fn invoke(&mut self) -> Result<()> {
        let run = self
            .invoke_fn
            .take()
            .ok_or(Error::not_found("no closure armed"))?;
        // Ownership of the bytes passes to the invoker; the drop hook
        // must not fire afterwards, even if the closure panics.
        self.drop_fn = None;
        self.size = 0;
        // SAFETY: the arena holds the closure the hook was
        // monomorphized for, and it is consumed exactly once.
        unsafe { run(self.arena.bytes.as_mut_ptr().cast()) };
        Ok(())
    }

    /// Drops the armed closure without running it. Empty callables are
    /// left as they are.
    pub fn reset(&mut self) {
        self.invoke_fn = None;
        self.size = 0;
        if let Some(drop_hook) = self.drop_fn.take() {
            // SAFETY: a drop hook is present only while the arena holds
            // the matching live closure.
            unsafe { drop_hook(self.arena.bytes.as_mut_ptr().cast()) };
        }
    }

    /// Checks whether a closure is armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.invoke_fn.is_some()
    }

    /// Byte size of the armed closure's captures, `0` when empty.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Arena size in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        CAP
    }
}

impl<const CAP: usize> Default for StaticCallable<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> Drop for StaticCallable<CAP> {
    fn drop(&mut self) {
        self.reset();
    }
}

// SAFETY: the only non-Send field is the raw arena, and `capture`
// admits `F: Send` closures only, so the bytes it holds always belong
// to a Send value.
unsafe impl<const CAP: usize> Send for StaticCallable<CAP> {}

/// Reads the closure out of the arena and runs it.
unsafe fn invoke_erased<F: FnOnce()>(slot: *mut u8) {
    let f = unsafe { slot.cast::<F>().read() };
    f();
}

/// Drops the closure in place without running it.
unsafe fn drop_erased<F>(slot: *mut u8) {
    unsafe { slot.cast::<F>().drop_in_place() };
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ema_error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn invoke_consumes_the_closure() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut callable = StaticCallable::<64>::new();

        let captured = Arc::clone(&counter);
        callable
            .capture(move || {
                captured.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        assert!(callable.is_armed());
        assert!(callable.size() > 0);

        callable.invoke().unwrap();
        assert_eq!(counter.load(Ordering::Relaxed), 1);
        assert!(!callable.is_armed());
        assert_eq!(callable.invoke().unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn oversized_capture_is_rejected() {
        let payload = [0u8; 128];
        let mut callable = StaticCallable::<64>::new();
        let err = callable
            .capture(move || {
                // `let _ = payload` would capture nothing under edition
                // 2021 rules; bind it so the 128 bytes are moved in.
                let _moved = payload;
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMemory);
        assert!(!callable.is_armed());
    }

    #[test]
    fn reset_drops_without_running() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut callable = StaticCallable::<64>::new();

        let captured = Arc::clone(&counter);
        callable
            .capture(move || {
                captured.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        // Dropping the capture releases the Arc clone.
        assert_eq!(Arc::strong_count(&counter), 2);
        callable.reset();
        assert_eq!(Arc::strong_count(&counter), 1);
        assert_eq!(counter.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn recapture_replaces_previous_closure() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut callable = StaticCallable::<64>::new();

        let first = Arc::clone(&counter);
        callable
            .capture(move || {
                first.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        let second = Arc::clone(&counter);
        callable
            .capture(move || {
                second.fetch_add(10, Ordering::Relaxed);
            })
            .unwrap();

        callable.invoke().unwrap();
        assert_eq!(counter.load(Ordering::Relaxed), 10);
    }

    #[test]
    fn moving_an_armed_callable_is_sound() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut callable = StaticCallable::<64>::new();
        let captured = Arc::clone(&counter);
        callable
            .capture(move || {
                captured.fetch_add(7, Ordering::Relaxed);
            })
            .unwrap();

        let mut moved = callable;
        moved.invoke().unwrap();
        assert_eq!(counter.load(Ordering::Relaxed), 7);
    }

    #[test]
    fn drop_releases_unrun_closure() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let mut callable = StaticCallable::<64>::new();
            let captured = Arc::clone(&counter);
            callable
                .capture(move || {
                    captured.fetch_add(1, Ordering::Relaxed);
                })
                .unwrap();
        }
        assert_eq!(Arc::strong_count(&counter), 1);
        assert_eq!(counter.load(Ordering::Relaxed), 0);
    }
}
