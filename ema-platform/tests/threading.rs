// EMA - ema-platform
// Module: Threading integration tests
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Cross-crate scenarios: threads and pools feeding bounded
//! containers under RAII locking.

#![allow(clippy::unwrap_used)]

use core::cell::UnsafeCell;
use std::sync::Arc;

use ema_foundation::StaticArray;
use ema_platform::{Thread, ThreadPool, Time};
use ema_sync::{ConditionalVariable, LockGuard, Mutex, UniqueLock};

struct Results {
    mutex: Mutex,
    values: UnsafeCell<StaticArray<u64, 64>>,
}

// SAFETY: `values` is only touched while `mutex` is held.
unsafe impl Sync for Results {}

impl Results {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            mutex: Mutex::new(),
            values: UnsafeCell::new(StaticArray::new()),
        })
    }

    fn push(&self, value: u64) {
        let _guard = LockGuard::new(&self.mutex).unwrap();
        // SAFETY: guard held.
        unsafe { (*self.values.get()).push_back(value).unwrap() };
    }

    fn sorted(&self) -> Vec<u64> {
        let _guard = LockGuard::new(&self.mutex).unwrap();
        // SAFETY: guard held.
        let mut values: Vec<u64> = unsafe { (*self.values.get()).iter().copied().collect() };
        values.sort_unstable();
        values
    }
}

#[test]
fn threads_aggregate_into_bounded_array() {
    let results = Results::new();
    let mut threads: Vec<Thread<{ 64 * 1024 }, 256>> = (0..4).map(|_| Thread::new()).collect();

    for (index, thread) in threads.iter_mut().enumerate() {
        let results = Arc::clone(&results);
        thread
            .run(move || {
                let limit = index as u64 * 100;
                let sum = (0..=limit).sum();
                results.push(sum);
            })
            .unwrap();
    }
    for thread in &mut threads {
        thread.join().unwrap();
    }

    // Sums of 0..=0, 0..=100, 0..=200, 0..=300.
    assert_eq!(results.sorted(), vec![0, 5050, 20100, 45150]);
}

struct Handshake {
    mutex: Mutex,
    cond: ConditionalVariable,
    ready: UnsafeCell<bool>,
}

// SAFETY: `ready` is only touched while `mutex` is held.
unsafe impl Sync for Handshake {}

#[test]
fn thread_blocks_on_condition_variable() {
    let handshake = Arc::new(Handshake {
        mutex: Mutex::new(),
        cond: ConditionalVariable::new(),
        ready: UnsafeCell::new(false),
    });
    let results = Results::new();

    let mut waiter = Thread::<{ 64 * 1024 }, 256>::new();
    {
        let handshake = Arc::clone(&handshake);
        let results = Arc::clone(&results);
        waiter
            .run(move || {
                let mut lock = UniqueLock::new(&handshake.mutex).unwrap();
                handshake
                    .cond
                    // SAFETY: the predicate runs with the lock held.
                    .wait_until(&mut lock, || unsafe { *handshake.ready.get() })
                    .unwrap();
                drop(lock);
                results.push(1);
            })
            .unwrap();
    }

    assert!(results.sorted().is_empty());
    {
        let _guard = LockGuard::new(&handshake.mutex).unwrap();
        // SAFETY: guard held.
        unsafe { *handshake.ready.get() = true };
    }
    handshake.cond.notify_one().unwrap();

    waiter.join().unwrap();
    assert_eq!(results.sorted(), vec![1]);
}

#[test]
fn pool_tasks_share_the_lock_discipline() {
    let results = Results::new();
    let mut pool = ThreadPool::<4, 64, 128, { 64 * 1024 }>::new();
    pool.run().unwrap();

    for value in 0..48u64 {
        let results = Arc::clone(&results);
        pool.add_task(move || results.push(value)).unwrap();
    }
    pool.wait().unwrap();
    pool.shutdown().unwrap();

    assert_eq!(results.sorted(), (0..48).collect::<Vec<u64>>());
}

#[test]
fn wall_clock_moves_forward() {
    let before = Time::now().unwrap();
    let mut worker = Thread::<{ 64 * 1024 }, 256>::new();
    worker
        .run(|| std::thread::sleep(std::time::Duration::from_millis(5)))
        .unwrap();
    worker.join().unwrap();
    let after = Time::now().unwrap();

    assert!(after > before);
    assert!(after.add(-ema_platform::time::MILLISECOND) >= before);
}
