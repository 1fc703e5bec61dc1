// EMA - ema-foundation
// Module: Fixed-capacity UTF-8 string
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

#![allow(unsafe_code)]

//! A fixed-capacity, embedded-storage UTF-8 string.
//!
//! [`StaticString`] holds up to `N` bytes inline and never allocates.
//! It is the formatting target for log lines and identifiers in
//! allocation-free code paths; it implements [`core::fmt::Write`] so
//! `write!` works against it directly, with capacity exhaustion
//! surfacing as `fmt::Error`.

use core::fmt;

use ema_error::{Error, Result};

/// Fixed-capacity string with embedded byte storage.
///
/// Invariant: the first `len` bytes are valid UTF-8. Appends are
/// all-or-nothing, so a rejected push cannot split a multi-byte
/// sequence.
#[derive(Clone, Copy)]
pub struct StaticString<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> StaticString<N> {
    /// Creates an empty string.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    /// Creates a string holding a copy of `s`.
    ///
    /// Fails with `NoMemory` if `s` does not fit `N` bytes.
    pub fn from_str(s: &str) -> Result<Self> {
        let mut string = Self::new();
        string.push_str(s)?;
        Ok(string)
    }

    /// Current length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Maximum length in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        N
    }

    /// Checks whether the string is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// String slice over the contents.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // SAFETY: the first `len` bytes are valid UTF-8; appends are
        // whole-`str` or whole-`char` and never partial.
        unsafe { core::str::from_utf8_unchecked(&self.bytes[..self.len]) }
    }

    /// Byte slice over the contents.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Appends a string slice.
    ///
    /// Fails with `NoMemory` if it does not fit, leaving the string
    /// unchanged.
    pub fn push_str(&mut self, s: &str) -> Result<()> {
        let incoming = s.as_bytes();
        if self.len + incoming.len() > N {
            return Err(Error::no_memory("string capacity exceeded"));
        }
        self.bytes[self.len..self.len + incoming.len()].copy_from_slice(incoming);
        self.len += incoming.len();
        Ok(())
    }

    /// Appends a single character.
    ///
    /// Fails with `NoMemory` if its UTF-8 encoding does not fit.
    pub fn push(&mut self, c: char) -> Result<()> {
        let mut encoded = [0u8; 4];
        self.push_str(c.encode_utf8(&mut encoded))
    }

    /// Removes all content.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> TryFrom<&str> for StaticString<N> {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::from_str(s)
    }
}

impl<const N: usize> core::str::FromStr for StaticString<N> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut string = Self::new();
        string.push_str(s)?;
        Ok(string)
    }
}

impl<const N: usize> Default for StaticString<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Write for StaticString<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s).map_err(|_| fmt::Error)
    }
}

impl<const N: usize> fmt::Display for StaticString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> fmt::Debug for StaticString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> PartialEq for StaticString<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<const N: usize> Eq for StaticString<N> {}

impl<const N: usize> PartialEq<str> for StaticString<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<const N: usize> PartialEq<&str> for StaticString<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<const N: usize> core::ops::Deref for StaticString<N> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}
