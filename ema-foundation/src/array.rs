// EMA - ema-foundation
// Module: Bounded array family
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

// Unsafe is required for MaybeUninit slot management; every use carries
// a SAFETY comment tied to the `len <= capacity` invariant.
#![allow(unsafe_code)]

//! Capacity-bounded sequence containers.
//!
//! [`Array`] is a single implementation of the bounded-array contract,
//! generic over a [`RawStorage`] seam that decides where the element
//! slots live:
//!
//! - [`ArrayView`] borrows its slots from a [`Buffer`](crate::Buffer)
//!   region — the container does not own the memory;
//! - [`StaticArray`] embeds its slots in the object;
//! - [`DynamicArray`] acquires its slots from the heap exactly once at
//!   construction (`alloc` feature).
//!
//! All three present identical capacity and lifetime semantics; the
//! only difference is when and where the backing memory is acquired.
//!
//! # Invariants
//!
//! 1. `len <= capacity` always holds.
//! 2. Slots `[0, len)` are initialized, slots `[len, capacity)` are not.
//! 3. Capacity never changes after construction.
//!
//! Elements are relocated with plain byte moves — in Rust every type is
//! trivially relocatable by construction, so no separate contract is
//! needed. `T: Clone` appears only on the operations that genuinely
//! copy elements in (`resize`, `insert`, `assign`).
//!
//! # Access discipline
//!
//! Indexing and the `Deref<Target = [T]>` view are unchecked: going out
//! of bounds is a precondition violation and panics. The checked
//! accessors ([`Array::at`], [`Array::front`], [`Array::back`]) report
//! [`OutOfRange`](ema_error::ErrorKind::OutOfRange) instead. Mutating
//! calls invalidate previously obtained references; unlike the raw
//! pointer discipline this design replaces, the borrow checker enforces
//! that here.

use core::fmt;
use core::mem::MaybeUninit;
use core::ops::{Deref, DerefMut};
use core::ptr;

use ema_error::{Error, Result};

/// Storage seam of the array family: a run of element slots.
///
/// Implementations only hand out slots; the [`Array`] wrapped around
/// them tracks which prefix is initialized.
pub trait RawStorage {
    /// Element type held in the slots.
    type Item;

    /// All slots, initialized or not.
    fn slots(&self) -> &[MaybeUninit<Self::Item>];

    /// All slots, mutable.
    fn slots_mut(&mut self) -> &mut [MaybeUninit<Self::Item>];
}

impl<'a, T> RawStorage for &'a mut [MaybeUninit<T>] {
    type Item = T;

    fn slots(&self) -> &[MaybeUninit<T>] {
        &**self
    }

    fn slots_mut(&mut self) -> &mut [MaybeUninit<T>] {
        &mut **self
    }
}

/// Element slots embedded in the owning object.
pub struct InlineStorage<T, const N: usize> {
    slots: [MaybeUninit<T>; N],
}

impl<T, const N: usize> InlineStorage<T, N> {
    const fn new() -> Self {
        Self {
            slots: [const { MaybeUninit::uninit() }; N],
        }
    }
}

impl<T, const N: usize> RawStorage for InlineStorage<T, N> {
    type Item = T;

    fn slots(&self) -> &[MaybeUninit<T>] {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut [MaybeUninit<T>] {
        &mut self.slots
    }
}

/// Element slots acquired from the heap once, at construction.
#[cfg(feature = "alloc")]
pub struct HeapStorage<T> {
    slots: alloc::boxed::Box<[MaybeUninit<T>]>,
}

#[cfg(feature = "alloc")]
impl<T> RawStorage for HeapStorage<T> {
    type Item = T;

    fn slots(&self) -> &[MaybeUninit<T>] {
        &self.slots
    }

    fn slots_mut(&mut self) -> &mut [MaybeUninit<T>] {
        &mut self.slots
    }
}

/// A bounded sequence with current length `len <= capacity`.
///
/// See the [module documentation](self) for the storage strategies and
/// the access discipline.
pub struct Array<S: RawStorage> {
    storage: S,
    len: usize,
}

/// Unowned array view over a borrowed buffer region.
pub type ArrayView<'a, T> = Array<&'a mut [MaybeUninit<T>]>;

/// Owning array with storage embedded in the object.
pub type StaticArray<T, const N: usize> = Array<InlineStorage<T, N>>;

/// Owning array with storage acquired once from the heap.
#[cfg(feature = "alloc")]
pub type DynamicArray<T> = Array<HeapStorage<T>>;

impl<'a, T> Array<&'a mut [MaybeUninit<T>]> {
    /// Creates an empty view over a buffer region, interpreting it as a
    /// sequence of `T`. Capacity is the number of whole, aligned
    /// elements that fit the region.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized or the region cannot hold a single
    /// aligned element — an unusable view is a configuration error,
    /// not a runtime condition.
    #[must_use]
    pub fn over(region: &'a mut [MaybeUninit<u8>]) -> Self {
        let slots = element_slots::<T>(region);
        assert!(!slots.is_empty(), "buffer too small for element type");
        Self {
            storage: slots,
            len: 0,
        }
    }

    /// Like [`Array::over`] but with an explicit capacity override.
    ///
    /// # Panics
    ///
    /// Panics if the override is zero or exceeds what the region holds.
    #[must_use]
    pub fn over_with_capacity(region: &'a mut [MaybeUninit<u8>], capacity: usize) -> Self {
        let slots = element_slots::<T>(region);
        assert!(
            capacity != 0 && capacity <= slots.len(),
            "capacity override exceeds buffer"
        );
        Self {
            storage: &mut slots[..capacity],
            len: 0,
        }
    }
}

/// Reinterprets a byte region as element slots, discarding any
/// misaligned prefix.
fn element_slots<T>(region: &mut [MaybeUninit<u8>]) -> &mut [MaybeUninit<T>] {
    assert!(
        core::mem::size_of::<T>() != 0,
        "zero-sized elements have no buffer representation"
    );
    // SAFETY: MaybeUninit<T> has no validity requirements, so any
    // correctly aligned byte run is a valid slot run. `align_to_mut`
    // guarantees the alignment.
    let (_, slots, _) = unsafe { region.align_to_mut::<MaybeUninit<T>>() };
    slots
}

impl<T, const N: usize> Array<InlineStorage<T, N>> {
    /// Creates an empty array with embedded storage for `N` elements.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            storage: InlineStorage::new(),
            len: 0,
        }
    }

    /// Creates an array holding clones of `items`.
    ///
    /// Fails with `NoMemory` if `items` does not fit `N`.
    pub fn from_slice(items: &[T]) -> Result<Self>
    where
        T: Clone,
    {
        let mut array = Self::new();
        array.extend_from_slice(items)?;
        Ok(array)
    }
}

impl<T, const N: usize> Default for Array<InlineStorage<T, N>> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "alloc")]
impl<T> Array<HeapStorage<T>> {
    /// Creates an empty array, acquiring storage for `capacity`
    /// elements from the heap. This is the only allocation the array
    /// ever performs.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: HeapStorage {
                slots: alloc::boxed::Box::new_uninit_slice(capacity),
            },
            len: 0,
        }
    }

    /// Creates an array sized to and holding clones of `items`.
    #[must_use]
    pub fn from_slice(items: &[T]) -> Self
    where
        T: Clone,
    {
        let mut array = Self::new(items.len());
        array.assign(items);
        array
    }
}

impl<S: RawStorage> Array<S> {
    /// Current number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Maximum number of elements, fixed at construction.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.slots().len()
    }

    /// Checks whether the array is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Checks whether the array is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Removes all elements, dropping them in index order.
    pub fn clear(&mut self) {
        let len = self.len;
        // Taking len to 0 first keeps the invariant intact if an
        // element destructor panics mid-way.
        self.len = 0;
        for slot in &mut self.storage.slots_mut()[..len] {
            // SAFETY: the first `len` slots were initialized.
            unsafe { slot.assume_init_drop() };
        }
    }

    /// The initialized prefix as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[S::Item] {
        // SAFETY: invariant 2 — the first `len` slots are initialized,
        // and MaybeUninit<T> is layout-compatible with T.
        unsafe { core::slice::from_raw_parts(self.storage.slots().as_ptr().cast(), self.len) }
    }

    /// The initialized prefix as a mutable slice.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [S::Item] {
        // SAFETY: as `as_slice`, with exclusive access.
        unsafe {
            core::slice::from_raw_parts_mut(self.storage.slots_mut().as_mut_ptr().cast(), self.len)
        }
    }

    /// Checked element access.
    ///
    /// Fails with `OutOfRange` if `index >= len`.
    pub fn at(&self, index: usize) -> Result<&S::Item> {
        if index >= self.len {
            return Err(Error::out_of_range("index beyond current size"));
        }
        // SAFETY: index < len, so the slot is initialized.
        Ok(unsafe { self.storage.slots()[index].assume_init_ref() })
    }

    /// Checked mutable element access.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut S::Item> {
        if index >= self.len {
            return Err(Error::out_of_range("index beyond current size"));
        }
        // SAFETY: index < len, so the slot is initialized.
        Ok(unsafe { self.storage.slots_mut()[index].assume_init_mut() })
    }

    /// First element; `OutOfRange` on an empty array.
    pub fn front(&self) -> Result<&S::Item> {
        self.at(0)
    }

    /// Last element; `OutOfRange` on an empty array.
    pub fn back(&self) -> Result<&S::Item> {
        if self.is_empty() {
            return Err(Error::out_of_range("array is empty"));
        }
        self.at(self.len - 1)
    }

    /// Sets the length to `size`, filling newly exposed slots with
    /// clones of `value` and dropping removed elements.
    ///
    /// Fails with `NoMemory` if `size > capacity`.
    pub fn resize(&mut self, size: usize, value: S::Item) -> Result<()>
    where
        S::Item: Clone,
    {
        self.resize_with(size, || value.clone())
    }

    /// [`Array::resize`] filling with default-constructed elements.
    pub fn resize_default(&mut self, size: usize) -> Result<()>
    where
        S::Item: Default,
    {
        self.resize_with(size, S::Item::default)
    }

    fn resize_with(&mut self, size: usize, mut fill: impl FnMut() -> S::Item) -> Result<()> {
        if size > self.capacity() {
            return Err(Error::no_memory("resize exceeds array capacity"));
        }
        while self.len > size {
            self.len -= 1;
            // SAFETY: the slot at the old last index is initialized.
            unsafe { self.storage.slots_mut()[self.len].assume_init_drop() };
        }
        while self.len < size {
            self.storage.slots_mut()[self.len].write(fill());
            self.len += 1;
        }
        Ok(())
    }

    /// Appends one element.
    ///
    /// Fails with `NoMemory` when the array is full; the array is left
    /// unchanged in that case.
    pub fn push_back(&mut self, item: S::Item) -> Result<()> {
        if self.is_full() {
            return Err(Error::no_memory("array capacity exceeded"));
        }
        self.storage.slots_mut()[self.len].write(item);
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the last element.
    ///
    /// Fails with `NotFound` on an empty array, leaving it unchanged.
    /// The vacated slot returns to the uninitialized state, so no stale
    /// copy of the element remains in the buffer.
    pub fn pop_back(&mut self) -> Result<S::Item> {
        if self.is_empty() {
            return Err(Error::not_found("array is empty"));
        }
        self.len -= 1;
        // SAFETY: the slot at the new `len` was initialized; reading it
        // out transfers ownership and leaves the slot uninitialized.
        Ok(unsafe { self.storage.slots_mut()[self.len].assume_init_read() })
    }

    /// Inserts clones of `items` before position `index`, preserving
    /// the relative order of all elements.
    ///
    /// Fails with `NoMemory` if the result would exceed capacity and
    /// with `InvalidArgument` if `index > len`. The displaced tail is
    /// relocated in a single overlap-safe move; `items` cannot alias
    /// the tail because it is a separate shared borrow.
    pub fn insert(&mut self, index: usize, items: &[S::Item]) -> Result<()>
    where
        S::Item: Clone,
    {
        let count = items.len();
        if self.len + count > self.capacity() {
            return Err(Error::no_memory("insert exceeds array capacity"));
        }
        if index > self.len {
            return Err(Error::invalid_argument("insert position beyond end"));
        }
        let old_len = self.len;
        // SAFETY: destination range [index + count, old_len + count)
        // stays within capacity (checked above); `ptr::copy` is
        // memmove, so the overlapping relocation is well defined.
        unsafe {
            let base = self.storage.slots_mut().as_mut_ptr();
            ptr::copy(base.add(index), base.add(index + count), old_len - index);
        }
        // If a clone panics below, the relocated tail is leaked, never
        // double-dropped: `len` claims only the intact prefix.
        self.len = index;
        let slots = self.storage.slots_mut();
        for (offset, item) in items.iter().enumerate() {
            slots[index + offset].write(item.clone());
        }
        self.len = old_len + count;
        Ok(())
    }

    /// Appends clones of `items`.
    ///
    /// Fails with `NoMemory` if they do not fit.
    pub fn extend_from_slice(&mut self, items: &[S::Item]) -> Result<()>
    where
        S::Item: Clone,
    {
        self.insert(self.len, items)
    }

    /// Appends the contents of another array.
    ///
    /// Fails with `NoMemory` if they do not fit. Unlike the unchecked
    /// [`Array::assign`], appending is fallible by design: running out
    /// of room while aggregating is an operational condition, not a
    /// programming error.
    pub fn append<S2>(&mut self, other: &Array<S2>) -> Result<()>
    where
        S2: RawStorage<Item = S::Item>,
        S::Item: Clone,
    {
        self.extend_from_slice(other.as_slice())
    }

    /// Replaces the contents with clones of `items`.
    ///
    /// This is the unchecked assignment: the caller asserts the items
    /// fit, and capacity overflow is a precondition violation.
    ///
    /// # Panics
    ///
    /// Panics if `items.len() > capacity`.
    pub fn assign(&mut self, items: &[S::Item])
    where
        S::Item: Clone,
    {
        assert!(items.len() <= self.capacity(), "assign exceeds array capacity");
        self.clear();
        for item in items {
            self.storage.slots_mut()[self.len].write(item.clone());
            self.len += 1;
        }
    }

    /// Index of the first element equal to `item`, or `NotFound`.
    pub fn find(&self, item: &S::Item) -> Result<usize>
    where
        S::Item: PartialEq,
    {
        self.as_slice()
            .iter()
            .position(|v| v == item)
            .ok_or(Error::not_found("no matching element"))
    }

    /// Index of the first element matching `pred`, or `NotFound`.
    pub fn find_if(&self, mut pred: impl FnMut(&S::Item) -> bool) -> Result<usize> {
        self.as_slice()
            .iter()
            .position(|v| pred(v))
            .ok_or(Error::not_found("no matching element"))
    }

    /// Removes the element at `index`, shifting the tail left by one,
    /// and returns it. After the call, `index` names the element that
    /// followed the removed one.
    ///
    /// Fails with `InvalidArgument` if `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> Result<S::Item> {
        if index >= self.len {
            return Err(Error::invalid_argument("remove position beyond end"));
        }
        // SAFETY: index < len, so the slot is initialized; after the
        // read the slot is logically uninitialized and immediately
        // overwritten by the shift.
        let removed = unsafe { self.storage.slots()[index].assume_init_read() };
        // SAFETY: source range [index + 1, len) is initialized and in
        // bounds; memmove handles the overlap.
        unsafe {
            let base = self.storage.slots_mut().as_mut_ptr();
            ptr::copy(base.add(index + 1), base.add(index), self.len - index - 1);
        }
        self.len -= 1;
        Ok(removed)
    }

    /// Removes every element matching `pred` in forward scan order and
    /// returns how many were removed.
    pub fn remove_if(&mut self, mut pred: impl FnMut(&S::Item) -> bool) -> usize {
        let mut removed = 0;
        let mut index = 0;
        while index < self.len {
            if pred(&self.as_slice()[index]) {
                if self.remove_at(index).is_ok() {
                    removed += 1;
                }
            } else {
                index += 1;
            }
        }
        removed
    }

    /// Iterates over the elements in index order.
    pub fn iter(&self) -> core::slice::Iter<'_, S::Item> {
        self.as_slice().iter()
    }

    /// Iterates mutably over the elements in index order.
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, S::Item> {
        self.as_mut_slice().iter_mut()
    }
}

impl<S: RawStorage> Drop for Array<S> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<S: RawStorage> Deref for Array<S> {
    type Target = [S::Item];

    fn deref(&self) -> &[S::Item] {
        self.as_slice()
    }
}

impl<S: RawStorage> DerefMut for Array<S> {
    fn deref_mut(&mut self) -> &mut [S::Item] {
        self.as_mut_slice()
    }
}

impl<S1, S2> PartialEq<Array<S2>> for Array<S1>
where
    S1: RawStorage,
    S2: RawStorage<Item = S1::Item>,
    S1::Item: PartialEq,
{
    fn eq(&self, other: &Array<S2>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<S: RawStorage> Eq for Array<S> where S::Item: Eq {}

impl<S: RawStorage> fmt::Debug for Array<S>
where
    S::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_slice().fmt(f)
    }
}

impl<'a, S: RawStorage> IntoIterator for &'a Array<S> {
    type Item = &'a S::Item;
    type IntoIter = core::slice::Iter<'a, S::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, S: RawStorage> IntoIterator for &'a mut Array<S> {
    type Item = &'a mut S::Item;
    type IntoIter = core::slice::IterMut<'a, S::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::buffer::{Buffer, StaticBuffer};
    use ema_error::ErrorKind;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::vec::Vec;

    #[test]
    fn view_over_buffer() {
        let mut buffer = StaticBuffer::<{ 32 * core::mem::size_of::<u32>() }>::new();
        let mut view = ArrayView::<u32>::over(buffer.region());
        assert_eq!(view.len(), 0);
        assert_eq!(view.capacity(), 32);

        for i in 0..32 {
            assert!(view.push_back(i).is_ok());
        }
        assert!(view.is_full());
        assert_eq!(view.as_slice()[7], 7);
    }

    #[test]
    fn push_to_capacity_then_no_memory() {
        let mut array = StaticArray::<u32, 8>::new();
        for i in 0..8 {
            assert!(array.push_back(i).is_ok());
        }
        assert!(array.is_full());

        let err = array.push_back(99).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMemory);
        assert_eq!(array.len(), 8);
        assert_eq!(*array.back().unwrap(), 7);
    }

    #[test]
    fn pop_back_on_empty_is_not_found() {
        let mut array = StaticArray::<u32, 4>::new();
        let err = array.pop_back().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(array.len(), 0);

        array.push_back(1).unwrap();
        assert_eq!(array.pop_back().unwrap(), 1);
        assert!(array.is_empty());
    }

    #[test]
    fn checked_access() {
        let mut array = StaticArray::<i32, 4>::new();
        assert_eq!(array.front().unwrap_err().kind(), ErrorKind::OutOfRange);
        assert_eq!(array.back().unwrap_err().kind(), ErrorKind::OutOfRange);

        array.extend_from_slice(&[10, 20, 30]).unwrap();
        assert_eq!(*array.at(1).unwrap(), 20);
        assert_eq!(array.at(3).unwrap_err().kind(), ErrorKind::OutOfRange);
        assert_eq!(*array.front().unwrap(), 10);
        assert_eq!(*array.back().unwrap(), 30);

        *array.at_mut(0).unwrap() = 11;
        assert_eq!(array[0], 11);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn unchecked_access_panics() {
        let array = StaticArray::<i32, 4>::new();
        let _ = array[0];
    }

    #[test]
    fn resize_fills_and_shrinks() {
        let mut array = StaticArray::<u8, 8>::new();
        array.resize(5, 7).unwrap();
        assert_eq!(array.as_slice(), &[7, 7, 7, 7, 7]);

        array.resize(2, 0).unwrap();
        assert_eq!(array.as_slice(), &[7, 7]);

        assert_eq!(array.resize(9, 0).unwrap_err().kind(), ErrorKind::NoMemory);
        assert_eq!(array.len(), 2);

        array.resize_default(4).unwrap();
        assert_eq!(array.as_slice(), &[7, 7, 0, 0]);
    }

    #[test]
    fn insert_preserves_order() {
        // The sequence exercised by the original tool: end, middle,
        // middle again.
        let mut array = StaticArray::<i32, 32>::new();

        array.insert(0, &[8, 8, 8, 8, 8]).unwrap();
        assert_eq!(array.as_slice(), &[8, 8, 8, 8, 8]);

        array.insert(2, &[3, 3, 3]).unwrap();
        array.insert(6, &[5, 5, 5, 5, 5]).unwrap();

        assert_eq!(
            array.as_slice(),
            &[8, 8, 3, 3, 3, 8, 5, 5, 5, 5, 5, 8, 8]
        );
    }

    #[test]
    fn insert_rejects_bad_arguments() {
        let mut array = StaticArray::<i32, 4>::new();
        array.extend_from_slice(&[1, 2]).unwrap();

        let err = array.insert(3, &[9]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = array.insert(0, &[9, 9, 9]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMemory);
        assert_eq!(array.as_slice(), &[1, 2]);
    }

    #[test]
    fn remove_middle_then_find_fails() {
        let mut array = StaticArray::<i32, 4>::new();
        array.extend_from_slice(&[1, 2, 3]).unwrap();

        assert_eq!(array.remove_at(1).unwrap(), 2);
        assert_eq!(array.as_slice(), &[1, 3]);
        assert_eq!(array.find(&2).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(array.find(&3).unwrap(), 1);

        let err = array.remove_at(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn remove_if_forward_scan() {
        let mut array = StaticArray::<i32, 8>::new();
        array.extend_from_slice(&[1, 2, 2, 3, 2, 4]).unwrap();

        assert_eq!(array.remove_if(|v| *v == 2), 3);
        assert_eq!(array.as_slice(), &[1, 3, 4]);
        assert_eq!(array.remove_if(|_| false), 0);
    }

    #[test]
    fn find_if_and_equality() {
        let mut a = StaticArray::<i32, 8>::new();
        a.extend_from_slice(&[4, 5, 6]).unwrap();
        assert_eq!(a.find_if(|v| *v > 4).unwrap(), 1);

        let b = StaticArray::<i32, 16>::from_slice(&[4, 5, 6]).unwrap();
        // Capacity does not participate in equality.
        assert_eq!(a, b);

        let c = StaticArray::<i32, 8>::from_slice(&[4, 5]).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn assign_replaces_contents() {
        let mut array = StaticArray::<i32, 4>::new();
        array.extend_from_slice(&[9, 9, 9, 9]).unwrap();
        array.assign(&[1, 2]);
        assert_eq!(array.as_slice(), &[1, 2]);
    }

    #[test]
    #[should_panic(expected = "assign exceeds array capacity")]
    fn assign_overflow_is_fatal() {
        let mut array = StaticArray::<i32, 2>::new();
        array.assign(&[1, 2, 3]);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn dynamic_array_matches_static_semantics() {
        let mut array = DynamicArray::<u32>::new(3);
        assert_eq!(array.capacity(), 3);
        array.extend_from_slice(&[1, 2, 3]).unwrap();
        assert_eq!(array.push_back(4).unwrap_err().kind(), ErrorKind::NoMemory);

        let from = DynamicArray::from_slice(&[1, 2, 3]);
        assert_eq!(array, from);
    }

    #[test]
    fn drop_runs_element_destructors() {
        static DROPS: AtomicUsize = AtomicUsize::new(0);

        struct Tracked;
        impl Drop for Tracked {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::Relaxed);
            }
        }

        DROPS.store(0, Ordering::Relaxed);
        {
            let mut array = StaticArray::<Tracked, 4>::new();
            array.push_back(Tracked).unwrap();
            array.push_back(Tracked).unwrap();
            array.push_back(Tracked).unwrap();
            drop(array.pop_back().unwrap());
            assert_eq!(DROPS.load(Ordering::Relaxed), 1);
        }
        assert_eq!(DROPS.load(Ordering::Relaxed), 3);
    }

    proptest! {
        // Inserting a run and removing the same run is the identity on
        // the untouched elements and on the length.
        #[test]
        fn insert_remove_roundtrip(
            initial in proptest::collection::vec(0i32..1000, 0..16),
            inserted in proptest::collection::vec(0i32..1000, 1..8),
            index_seed in 0usize..16,
        ) {
            let mut array = StaticArray::<i32, 32>::new();
            array.extend_from_slice(&initial).unwrap();
            let index = index_seed % (initial.len() + 1);

            array.insert(index, &inserted).unwrap();
            prop_assert_eq!(array.len(), initial.len() + inserted.len());

            for _ in 0..inserted.len() {
                array.remove_at(index).unwrap();
            }
            prop_assert_eq!(array.as_slice(), initial.as_slice());
        }

        #[test]
        fn push_pop_is_lifo(items in proptest::collection::vec(any::<i32>(), 0..24)) {
            let mut array = StaticArray::<i32, 24>::new();
            for item in &items {
                array.push_back(*item).unwrap();
            }
            let mut drained = Vec::new();
            while let Ok(item) = array.pop_back() {
                drained.push(item);
            }
            drained.reverse();
            prop_assert_eq!(drained, items);
        }
    }
}
