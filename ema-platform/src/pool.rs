// EMA - ema-platform
// Module: Fixed-size thread pool
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![allow(unsafe_code)]

//! A thread pool with a fixed worker set and a bounded task queue.
//!
//! All sizing is decided at construction: `WORKERS` threads, a queue
//! of `QUEUE_SIZE` task slots, each task captured inline into
//! `TASK_SIZE` bytes. Submitting to a full queue fails with `NoMemory`
//! instead of blocking or growing, so a producer can shed load.
//!
//! Two condition variables coordinate the pool: one wakes workers when
//! a task (or shutdown) arrives, the other wakes [`ThreadPool::wait`]
//! callers when the count of unfinished tasks reaches zero.

use core::cell::UnsafeCell;

use ema_error::{Error, Result};
use ema_foundation::{StaticCallable, StaticQueue};
use ema_sync::{ConditionalVariable, LockGuard, Mutex, UniqueLock};

use crate::config::{DEFAULT_CALLABLE_SIZE, DEFAULT_THREAD_STACK_SIZE};
use crate::thread::Thread;

/// State guarded by the pool mutex.
struct PoolState<const QUEUE_SIZE: usize, const TASK_SIZE: usize> {
    queue: StaticQueue<StaticCallable<TASK_SIZE>, QUEUE_SIZE>,
    /// Tasks accepted and not yet finished (queued or executing).
    pending: usize,
    shutdown: bool,
}

/// The block shared between the pool handle and its workers.
struct PoolShared<const QUEUE_SIZE: usize, const TASK_SIZE: usize> {
    mutex: Mutex,
    task_ready: ConditionalVariable,
    all_done: ConditionalVariable,
    state: UnsafeCell<PoolState<QUEUE_SIZE, TASK_SIZE>>,
}

// SAFETY: `state` is only accessed while `mutex` is held.
unsafe impl<const QUEUE_SIZE: usize, const TASK_SIZE: usize> Sync
    for PoolShared<QUEUE_SIZE, TASK_SIZE>
{
}

/// Raw pointer to the shared block, movable into a worker closure.
struct SharedRef<const QUEUE_SIZE: usize, const TASK_SIZE: usize>(
    *const PoolShared<QUEUE_SIZE, TASK_SIZE>,
);

impl<const QUEUE_SIZE: usize, const TASK_SIZE: usize> Clone for SharedRef<QUEUE_SIZE, TASK_SIZE> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<const QUEUE_SIZE: usize, const TASK_SIZE: usize> Copy for SharedRef<QUEUE_SIZE, TASK_SIZE> {}

// SAFETY: the pointee is Sync and the pool keeps it alive until every
// worker holding a SharedRef has been joined.
unsafe impl<const QUEUE_SIZE: usize, const TASK_SIZE: usize> Send
    for SharedRef<QUEUE_SIZE, TASK_SIZE>
{
}

/// Fixed-size thread pool over [`Thread`] workers.
///
/// The pool is constructed idle; [`ThreadPool::run`] spawns the
/// workers and [`ThreadPool::shutdown`] (also run by the destructor)
/// discards queued tasks, lets executing ones finish and joins every
/// worker.
pub struct ThreadPool<
    const WORKERS: usize,
    const QUEUE_SIZE: usize = { crate::config::DEFAULT_POOL_QUEUE_SIZE },
    const TASK_SIZE: usize = DEFAULT_CALLABLE_SIZE,
    const STACK_SIZE: usize = DEFAULT_THREAD_STACK_SIZE,
> {
    workers: [Thread<STACK_SIZE>; WORKERS],
    shared: std::boxed::Box<PoolShared<QUEUE_SIZE, TASK_SIZE>>,
    started: bool,
}

impl<
        const WORKERS: usize,
        const QUEUE_SIZE: usize,
        const TASK_SIZE: usize,
        const STACK_SIZE: usize,
    > ThreadPool<WORKERS, QUEUE_SIZE, TASK_SIZE, STACK_SIZE>
{
    /// Creates an idle pool, acquiring the worker arenas and the task
    /// queue. No further allocation happens after this point.
    #[must_use]
    pub fn new() -> Self {
        const {
            assert!(WORKERS > 0, "a pool needs at least one worker");
            assert!(QUEUE_SIZE > 0, "a pool needs at least one task slot");
        }
        Self {
            workers: core::array::from_fn(|_| Thread::new()),
            shared: std::boxed::Box::new(PoolShared {
                mutex: Mutex::new(),
                task_ready: ConditionalVariable::new(),
                all_done: ConditionalVariable::new(),
                state: UnsafeCell::new(PoolState {
                    queue: StaticQueue::new(),
                    pending: 0,
                    shutdown: false,
                }),
            }),
            started: false,
        }
    }

    /// Spawns the workers.
    ///
    /// Fails with `InvalidState` if the pool is already running. If a
    /// worker fails to spawn, the ones already spawned are shut down
    /// again and the pool stays idle.
    pub fn run(&mut self) -> Result<()> {
        if self.started {
            return Err(Error::invalid_state("pool already running"));
        }
        {
            let _guard = LockGuard::new(&self.shared.mutex)?;
            // SAFETY: guard held.
            unsafe { (*self.shared.state.get()).shutdown = false };
        }

        let shared = SharedRef(core::ptr::addr_of!(*self.shared));
        for index in 0..WORKERS {
            // SAFETY: shutdown joins every worker before the shared
            // block can be dropped, and the block is heap-pinned, so
            // the pointer stays valid for the workers' whole lifetime.
            let spawned = unsafe { self.workers[index].run_scoped(move || worker_loop(shared)) };
            if let Err(err) = spawned {
                self.started = true;
                let _ = self.shutdown();
                return Err(err);
            }
        }
        self.started = true;
        log::info!("thread pool running, {WORKERS} workers");
        Ok(())
    }

    /// Submits a task for execution by any worker.
    ///
    /// Fails with `InvalidState` if the pool is not running, `NoMemory`
    /// if the captures of `f` exceed `TASK_SIZE` or the queue is full.
    pub fn add_task<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        if !self.started {
            return Err(Error::invalid_state("pool is not running"));
        }
        {
            let _guard = LockGuard::new(&self.shared.mutex)?;
            // SAFETY: guard held.
            let state = unsafe { &mut *self.shared.state.get() };
            let mut task = StaticCallable::new();
            task.capture(f)?;
            state.queue.push(task)?;
            state.pending += 1;
        }
        self.shared.task_ready.notify_one()
    }

    /// Blocks until every accepted task has finished.
    pub fn wait(&self) -> Result<()> {
        let mut lock = UniqueLock::new(&self.shared.mutex)?;
        self.shared.all_done.wait_until(&mut lock, || {
            // SAFETY: the predicate runs with the lock held.
            unsafe { (*self.shared.state.get()).pending == 0 }
        })
    }

    /// Stops the pool: discards queued tasks, lets executing ones
    /// finish and joins every worker. Idempotent; an idle pool returns
    /// `Ok` at once.
    pub fn shutdown(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }
        {
            let _guard = LockGuard::new(&self.shared.mutex)?;
            // SAFETY: guard held.
            let state = unsafe { &mut *self.shared.state.get() };
            state.shutdown = true;
            // Discarded tasks will never run; they no longer count as
            // pending.
            state.pending = state.pending.saturating_sub(state.queue.len());
            state.queue.clear();
        }
        let _ = self.shared.task_ready.notify_all();

        let mut first_error = None;
        for worker in &mut self.workers {
            if worker.is_running() {
                if let Err(err) = worker.join() {
                    first_error.get_or_insert(err);
                }
            }
        }
        self.started = false;
        let _ = self.shared.all_done.notify_all();
        log::info!("thread pool stopped");
        match first_error {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Whether the workers are spawned.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started
    }
}

impl<
        const WORKERS: usize,
        const QUEUE_SIZE: usize,
        const TASK_SIZE: usize,
        const STACK_SIZE: usize,
    > Default for ThreadPool<WORKERS, QUEUE_SIZE, TASK_SIZE, STACK_SIZE>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<
        const WORKERS: usize,
        const QUEUE_SIZE: usize,
        const TASK_SIZE: usize,
        const STACK_SIZE: usize,
    > Drop for ThreadPool<WORKERS, QUEUE_SIZE, TASK_SIZE, STACK_SIZE>
{
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn worker_loop<const QUEUE_SIZE: usize, const TASK_SIZE: usize>(
    shared: SharedRef<QUEUE_SIZE, TASK_SIZE>,
) {
    // SAFETY: the pool joins this worker before the shared block goes
    // away.
    let shared = unsafe { &*shared.0 };
    loop {
        let mut task = {
            let Ok(mut lock) = UniqueLock::new(&shared.mutex) else {
                return;
            };
            let woke = shared.task_ready.wait_until(&mut lock, || {
                // SAFETY: the predicate runs with the lock held.
                let state = unsafe { &*shared.state.get() };
                state.shutdown || !state.queue.is_empty()
            });
            if woke.is_err() {
                return;
            }
            // SAFETY: lock held.
            let state = unsafe { &mut *shared.state.get() };
            if state.shutdown {
                return;
            }
            match state.queue.pop() {
                Ok(task) => task,
                Err(_) => continue,
            }
        };

        // Run outside the lock so workers execute in parallel.
        if let Err(err) = task.invoke() {
            log::error!("pool task was not armed: {err}");
        }

        if let Ok(_guard) = LockGuard::new(&shared.mutex) {
            // SAFETY: guard held.
            let state = unsafe { &mut *shared.state.get() };
            state.pending = state.pending.saturating_sub(1);
        }
        let _ = shared.all_done.notify_all();
    }
}
