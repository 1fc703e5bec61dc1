// EMA - ema-platform
// Module: Threads on caller-owned stacks
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![allow(unsafe_code)]

//! POSIX threads running on fixed, caller-owned stacks.
//!
//! A [`Thread`] owns one page-aligned memory arena for its whole
//! lifetime. The entry closure is captured into a
//! [`StaticCallable`](ema_foundation::StaticCallable) at the base of
//! that arena and the remainder becomes the thread stack, handed to
//! `pthread_attr_setstack`. Spawning therefore performs no allocation,
//! and a closure too large for the arena is rejected with `NoMemory`
//! before any OS object is created.
//!
//! A thread may be re-run after [`Thread::join`]; the arena is reused.
//! Dropping a `Thread` that is still running would free the stack under
//! the running thread's feet, so the destructor treats it as fatal and
//! aborts the process. Join first.

use core::cell::UnsafeCell;
use core::ffi::c_void;
use core::mem::MaybeUninit;

use ema_error::{check_os, Error, Result};
use ema_foundation::StaticCallable;

use crate::config::{
    align_up, DEFAULT_CALLABLE_SIZE, DEFAULT_THREAD_STACK_SIZE, MIN_THREAD_STACK,
    THREAD_STACK_ALIGN,
};

/// FFI declarations for thread creation with an explicit stack.
#[allow(non_camel_case_types)]
mod ffi {
    use core::ffi::{c_int, c_ulong, c_void};

    pub type pthread_t = c_ulong;

    /// Opaque attribute object, oversized for glibc and musl.
    #[repr(C, align(8))]
    pub struct pthread_attr_t {
        pub size: [u8; 64],
    }

    extern "C" {
        pub fn pthread_create(
            thread: *mut pthread_t,
            attr: *const pthread_attr_t,
            start_routine: extern "C" fn(*mut c_void) -> *mut c_void,
            arg: *mut c_void,
        ) -> c_int;
        pub fn pthread_join(thread: pthread_t, retval: *mut *mut c_void) -> c_int;

        pub fn pthread_attr_init(attr: *mut pthread_attr_t) -> c_int;
        pub fn pthread_attr_destroy(attr: *mut pthread_attr_t) -> c_int;
        pub fn pthread_attr_setstack(
            attr: *mut pthread_attr_t,
            stackaddr: *mut c_void,
            stacksize: usize,
        ) -> c_int;
    }
}

/// Page-aligned arena holding the entry closure and the stack.
#[repr(C, align(4096))]
struct StackArena<const STACK_SIZE: usize> {
    bytes: UnsafeCell<[u8; STACK_SIZE]>,
}

/// Byte offset of the stack region within the arena: the entry
/// callable rounded up to page alignment.
const fn stack_offset<const CALLABLE_SIZE: usize>() -> usize {
    align_up(
        core::mem::size_of::<StaticCallable<CALLABLE_SIZE>>(),
        THREAD_STACK_ALIGN,
    )
}

/// A POSIX thread on a fixed, owned stack.
///
/// `STACK_SIZE` is the whole arena size in bytes, `CALLABLE_SIZE` the
/// capture arena of the entry closure; both checked at compile time to
/// leave at least [`MIN_THREAD_STACK`] of usable stack.
pub struct Thread<
    const STACK_SIZE: usize = DEFAULT_THREAD_STACK_SIZE,
    const CALLABLE_SIZE: usize = DEFAULT_CALLABLE_SIZE,
> {
    arena: std::boxed::Box<StackArena<STACK_SIZE>>,
    handle: ffi::pthread_t,
    running: bool,
}

impl<const STACK_SIZE: usize, const CALLABLE_SIZE: usize> Thread<STACK_SIZE, CALLABLE_SIZE> {
    /// Creates an idle thread object, acquiring its arena. This is the
    /// only allocation the thread ever performs.
    #[must_use]
    pub fn new() -> Self {
        const {
            assert!(
                STACK_SIZE % THREAD_STACK_ALIGN == 0,
                "stack size must be page aligned"
            );
            assert!(
                STACK_SIZE >= stack_offset::<CALLABLE_SIZE>() + MIN_THREAD_STACK,
                "stack size leaves no usable stack after the entry callable"
            );
        }
        Self {
            arena: std::boxed::Box::new(StackArena {
                bytes: UnsafeCell::new([0; STACK_SIZE]),
            }),
            handle: 0,
            running: false,
        }
    }

    /// Spawns the thread with entry closure `f`.
    ///
    /// Fails with `InvalidState` if the thread is already running,
    /// `NoMemory` if the captures of `f` exceed `CALLABLE_SIZE`, and
    /// `Os` if thread creation itself fails. On any failure the thread
    /// stays idle and may be retried.
    pub fn run<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        // SAFETY: 'static captures cannot dangle, however late the
        // join happens.
        unsafe { self.spawn(f) }
    }

    /// [`Thread::run`] for closures borrowing local state.
    ///
    /// # Safety
    ///
    /// The caller must join the thread before anything borrowed by `f`
    /// goes out of scope.
    pub unsafe fn run_scoped<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce() + Send,
    {
        unsafe { self.spawn(f) }
    }

    unsafe fn spawn<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce() + Send,
    {
        if self.running {
            return Err(Error::invalid_state("thread already running"));
        }

        let base = self.arena.bytes.get().cast::<u8>();
        let entry = base.cast::<StaticCallable<CALLABLE_SIZE>>();
        // SAFETY: the arena base is 16-byte aligned and the thread is
        // idle, so no other party touches the arena. Any previously
        // embedded callable was consumed or reset, so overwriting it
        // raw drops nothing live.
        unsafe {
            entry.write(StaticCallable::new());
            (*entry).capture(f)?;
        }

        let offset = stack_offset::<CALLABLE_SIZE>();
        // SAFETY: offset < STACK_SIZE by the compile-time check.
        let stack_addr = unsafe { base.add(offset) };
        let stack_size = STACK_SIZE - offset;

        // SAFETY: stack_addr is page aligned, the region is owned by
        // the arena and disjoint from the callable, and `entry` stays
        // valid until the thread is joined.
        let created = unsafe {
            Self::create(
                &mut self.handle,
                stack_addr.cast(),
                stack_size,
                entry.cast(),
            )
        };
        if let Err(err) = created {
            // SAFETY: no thread was created; the callable is ours to
            // disarm.
            unsafe { (*entry).reset() };
            return Err(err);
        }

        self.running = true;
        log::debug!("thread spawned, {stack_size} bytes of stack");
        Ok(())
    }

    unsafe fn create(
        handle: &mut ffi::pthread_t,
        stack_addr: *mut c_void,
        stack_size: usize,
        entry: *mut c_void,
    ) -> Result<()> {
        let mut attr = MaybeUninit::<ffi::pthread_attr_t>::uninit();
        // SAFETY: init before use, destroy after, per the pthread
        // attribute protocol.
        unsafe {
            check_os(ffi::pthread_attr_init(attr.as_mut_ptr()))?;
            let result = check_os(ffi::pthread_attr_setstack(
                attr.as_mut_ptr(),
                stack_addr,
                stack_size,
            ))
            .and_then(|()| {
                check_os(ffi::pthread_create(
                    handle,
                    attr.as_mut_ptr(),
                    thread_entry::<CALLABLE_SIZE>,
                    entry,
                ))
            });
            // Destroy cannot fail on the supported libcs, and the
            // creation outcome must win either way.
            let _ = ffi::pthread_attr_destroy(attr.as_mut_ptr());
            result
        }
    }

    /// Waits for the thread to finish.
    ///
    /// Fails with `InvalidState` if the thread is not running. After a
    /// successful join the thread may be re-run.
    pub fn join(&mut self) -> Result<()> {
        if !self.running {
            return Err(Error::invalid_state("thread not running"));
        }
        let mut retval = core::ptr::null_mut();
        // SAFETY: the handle names a live, unjoined thread.
        check_os(unsafe { ffi::pthread_join(self.handle, &mut retval) })?;
        self.running = false;
        log::debug!("thread joined");
        Ok(())
    }

    /// Whether the thread was spawned and not yet joined.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl<const STACK_SIZE: usize, const CALLABLE_SIZE: usize> Default
    for Thread<STACK_SIZE, CALLABLE_SIZE>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const STACK_SIZE: usize, const CALLABLE_SIZE: usize> Drop
    for Thread<STACK_SIZE, CALLABLE_SIZE>
{
    fn drop(&mut self) {
        if self.running {
            // Freeing the arena now would pull the stack out from
            // under a live thread. Nothing can be unwound past this.
            log::error!("thread dropped while running, aborting");
            std::process::abort();
        }
    }
}

/// Entry trampoline: runs the callable embedded at the arena base.
extern "C" fn thread_entry<const CALLABLE_SIZE: usize>(arg: *mut c_void) -> *mut c_void {
    let entry = arg.cast::<StaticCallable<CALLABLE_SIZE>>();
    // SAFETY: spawn armed the callable and nothing else touches it
    // until the join; it is consumed exactly once, here.
    if unsafe { (*entry).invoke() }.is_err() {
        log::error!("thread entry had no armed closure");
    }
    core::ptr::null_mut()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ema_error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn runs_closure_on_custom_stack() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut thread = Thread::<{ 64 * 1024 }, 128>::new();

        let captured = Arc::clone(&counter);
        thread
            .run(move || {
                // Touch a stack-heavy local to prove the stack works.
                let scratch = [0u8; 8 * 1024];
                captured.fetch_add(scratch.len(), Ordering::Relaxed);
            })
            .unwrap();
        assert!(thread.is_running());
        thread.join().unwrap();
        assert_eq!(counter.load(Ordering::Relaxed), 8 * 1024);
    }

    #[test]
    fn rerun_after_join_reuses_arena() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut thread = Thread::<{ 64 * 1024 }, 128>::new();

        for round in 1..=3 {
            let captured = Arc::clone(&counter);
            thread
                .run(move || {
                    captured.fetch_add(1, Ordering::Relaxed);
                })
                .unwrap();
            thread.join().unwrap();
            assert_eq!(counter.load(Ordering::Relaxed), round);
        }
    }

    #[test]
    fn double_run_is_invalid_state() {
        let mut thread = Thread::<{ 64 * 1024 }, 128>::new();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        thread
            .run(move || {
                let _ = release_rx.recv();
            })
            .unwrap();

        let err = thread.run(|| {}).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        release_tx.send(()).unwrap();
        thread.join().unwrap();
    }

    #[test]
    fn join_without_run_is_invalid_state() {
        let mut thread = Thread::<{ 64 * 1024 }, 128>::new();
        assert_eq!(thread.join().unwrap_err().kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn oversized_entry_closure_is_rejected() {
        let mut thread = Thread::<{ 64 * 1024 }, 64>::new();
        let payload = [0u8; 256];
        let err = thread
            .run(move || {
                // `let _ = payload` would capture nothing under edition
                // 2021 rules; bind it so the 256 bytes are moved in.
                let _moved = payload;
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMemory);
        assert!(!thread.is_running());

        // The thread is still usable after the rejection.
        thread.run(|| {}).unwrap();
        thread.join().unwrap();
    }
}
