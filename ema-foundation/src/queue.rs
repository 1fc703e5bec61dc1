// EMA - ema-foundation
// Module: Fixed-capacity FIFO queue
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![allow(unsafe_code)]

//! A fixed-capacity FIFO queue with embedded storage.
//!
//! [`StaticQueue`] is the task-queue building block of the thread pool:
//! a circular buffer over `N` embedded slots, with no allocation and no
//! reallocation. A full queue rejects pushes with
//! [`NoMemory`](ema_error::ErrorKind::NoMemory); an empty queue reports
//! pops as [`NotFound`](ema_error::ErrorKind::NotFound).

use core::mem::MaybeUninit;

use ema_error::{Error, Result};

/// Fixed-capacity circular FIFO queue.
///
/// Invariants: `len <= N`; the `len` slots starting at `head` (mod `N`)
/// are initialized, all others are not.
pub struct StaticQueue<T, const N: usize> {
    slots: [MaybeUninit<T>; N],
    head: usize,
    len: usize,
}

impl<T, const N: usize> StaticQueue<T, N> {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [const { MaybeUninit::uninit() }; N],
            head: 0,
            len: 0,
        }
    }

    /// Current number of queued elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Maximum number of elements.
    #[must_use]
    pub fn capacity(&self) -> usize {
        N
    }

    /// Checks whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Checks whether the queue is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Enqueues an element at the back.
    ///
    /// Fails with `NoMemory` when full, leaving the queue unchanged.
    pub fn push(&mut self, item: T) -> Result<()> {
        if self.is_full() {
            return Err(Error::no_memory("queue capacity exceeded"));
        }
        let tail = (self.head + self.len) % N;
        self.slots[tail].write(item);
        self.len += 1;
        Ok(())
    }

    /// Dequeues the front element.
    ///
    /// Fails with `NotFound` when empty.
    pub fn pop(&mut self) -> Result<T> {
        if self.is_empty() {
            return Err(Error::not_found("queue is empty"));
        }
        let index = self.head;
        self.head = (self.head + 1) % N;
        self.len -= 1;
        // SAFETY: the slot at the old head is initialized; reading it
        // out leaves the slot uninitialized, matching the invariant.
        Ok(unsafe { self.slots[index].assume_init_read() })
    }

    /// Front element without dequeuing it.
    pub fn front(&self) -> Result<&T> {
        if self.is_empty() {
            return Err(Error::not_found("queue is empty"));
        }
        // SAFETY: non-empty, so the head slot is initialized.
        Ok(unsafe { self.slots[self.head].assume_init_ref() })
    }

    /// Removes all elements, dropping them in FIFO order.
    pub fn clear(&mut self) {
        while self.pop().is_ok() {}
    }

    /// Iterates over the elements in FIFO order without dequeuing.
    pub fn iter(&self) -> Iter<'_, T, N> {
        Iter {
            queue: self,
            offset: 0,
        }
    }
}

/// Borrowing iterator over a [`StaticQueue`], front to back.
pub struct Iter<'a, T, const N: usize> {
    queue: &'a StaticQueue<T, N>,
    offset: usize,
}

impl<'a, T, const N: usize> Iterator for Iter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.offset >= self.queue.len {
            return None;
        }
        let index = (self.queue.head + self.offset) % N;
        self.offset += 1;
        // SAFETY: offset < len, so the slot holds a queued element.
        Some(unsafe { self.queue.slots[index].assume_init_ref() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.queue.len - self.offset;
        (remaining, Some(remaining))
    }
}

impl<T, const N: usize> ExactSizeIterator for Iter<'_, T, N> {}

impl<'a, T, const N: usize> IntoIterator for &'a StaticQueue<T, N> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, const N: usize> Default for StaticQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Drop for StaticQueue<T, N> {
    fn drop(&mut self) {
        self.clear();
    }
}
