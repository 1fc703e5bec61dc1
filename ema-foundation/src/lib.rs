// EMA - ema-foundation
// Module: EMA Foundation Library
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Fixed-capacity containers and memory primitives for the EMA runtime.
//!
//! Everything in this crate is designed around one rule: no dynamic
//! allocation after startup. Storage is either embedded in the owning
//! object ([`StaticBuffer`], [`StaticArray`], [`StaticQueue`],
//! [`StaticString`], [`StaticCallable`]) or acquired exactly once at
//! construction ([`DynamicBuffer`], [`DynamicArray`], behind the
//! `alloc` feature). Capacity is fixed for the lifetime of the
//! container; exhausting it is reported as an
//! [`ErrorKind::NoMemory`](ema_error::ErrorKind::NoMemory) value, never
//! as an abort or a reallocation.
//!
//! The container family shares a single implementation, [`Array`],
//! generic over a [`RawStorage`] seam. The unchecked accessors
//! (indexing, `Deref<Target = [T]>`) treat out-of-bounds access as a
//! precondition violation and panic; every other operation returns an
//! error value.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod array;
pub mod buffer;
pub mod callable;
pub mod queue;
pub mod string;

pub use array::{Array, ArrayView, RawStorage, StaticArray};
#[cfg(feature = "alloc")]
pub use array::DynamicArray;
pub use buffer::{Buffer, StaticBuffer};
#[cfg(feature = "alloc")]
pub use buffer::DynamicBuffer;
pub use callable::StaticCallable;
pub use queue::StaticQueue;
pub use string::StaticString;
