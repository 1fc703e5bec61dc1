// EMA - ema-foundation
// Module: Raw memory regions backing the container family
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Raw, fixed-length byte regions.
//!
//! A [`Buffer`] is the memory an [`ArrayView`](crate::ArrayView) is
//! built over: it knows its byte size and hands out its storage as a
//! region of uninitialized bytes. The region's length is fixed at
//! creation and the buffer must outlive any view taken over it — the
//! borrow checker enforces the second half of that contract.
//!
//! Two acquisition strategies are supported, mirroring the owning
//! array types: [`StaticBuffer`] embeds its bytes in the object, while
//! [`DynamicBuffer`] acquires them from the heap exactly once at
//! construction.

use core::mem::MaybeUninit;

/// A contiguous, fixed-length byte region.
pub trait Buffer {
    /// Region length in bytes.
    fn size(&self) -> usize;

    /// Exclusive access to the underlying bytes.
    ///
    /// The bytes are deliberately exposed as `MaybeUninit`: a fresh
    /// buffer carries no initialized content, and the containers built
    /// on top track initialization themselves.
    fn region(&mut self) -> &mut [MaybeUninit<u8>];
}

/// A buffer whose storage is embedded in the object itself.
///
/// The region is 16-byte aligned, so a view over it loses no capacity
/// to alignment for any element the containers store.
#[repr(C, align(16))]
pub struct StaticBuffer<const SIZE: usize> {
    bytes: [MaybeUninit<u8>; SIZE],
}

impl<const SIZE: usize> StaticBuffer<SIZE> {
    /// Creates the buffer. No initialization of the bytes takes place.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [const { MaybeUninit::uninit() }; SIZE],
        }
    }
}

impl<const SIZE: usize> Default for StaticBuffer<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize> Buffer for StaticBuffer<SIZE> {
    fn size(&self) -> usize {
        SIZE
    }

    fn region(&mut self) -> &mut [MaybeUninit<u8>] {
        &mut self.bytes
    }
}

/// A buffer whose storage is acquired from the heap exactly once, at
/// construction, and released when the buffer is dropped.
///
/// The heap region carries no alignment promise beyond the
/// allocator's; a view over it may lose a few leading bytes to
/// element alignment.
#[cfg(feature = "alloc")]
pub struct DynamicBuffer {
    bytes: alloc::boxed::Box<[MaybeUninit<u8>]>,
}

#[cfg(feature = "alloc")]
impl DynamicBuffer {
    /// Acquires a region of `size` bytes.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            bytes: alloc::boxed::Box::new_uninit_slice(size),
        }
    }
}

#[cfg(feature = "alloc")]
impl Buffer for DynamicBuffer {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn region(&mut self) -> &mut [MaybeUninit<u8>] {
        &mut self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_buffer_reports_size() {
        let mut buffer = StaticBuffer::<64>::new();
        assert_eq!(buffer.size(), 64);
        assert_eq!(buffer.region().len(), 64);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn dynamic_buffer_acquires_once() {
        let mut buffer = DynamicBuffer::new(128);
        assert_eq!(buffer.size(), 128);
        let first = buffer.region().as_ptr();
        // The region is stable across accesses.
        assert_eq!(first, buffer.region().as_ptr());
    }
}
