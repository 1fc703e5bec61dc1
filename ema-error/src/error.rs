// EMA - ema-error
// Module: Error type and taxonomy
//
// Copyright (c) 2025 The EMA Project Developers
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Defines the [`Error`] struct and the workspace-wide error taxonomy.

use core::fmt;

/// Classification of an [`Error`].
///
/// The set is deliberately small: every capacity- or logic-sensitive
/// operation in the workspace maps onto one of these kinds, and callers
/// branch on the kind rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    /// A fixed-capacity container or arena is exhausted.
    NoMemory,
    /// A lookup found no matching element, or a pop hit an empty
    /// container.
    NotFound,
    /// A checked index is beyond the current size.
    OutOfRange,
    /// A structurally invalid argument (range or position outside the
    /// container, unsupported alignment).
    InvalidArgument,
    /// An insertion collided with an existing entry.
    AlreadyExists,
    /// The operation does not apply to the object's current state
    /// (joining a thread that was never started, unlocking a lock that
    /// is not held).
    InvalidState,
    /// An OS primitive failed; the POSIX code is preserved in
    /// [`Error::os_code`].
    Os,
}

impl ErrorKind {
    /// Static description of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoMemory => "no memory",
            Self::NotFound => "not found",
            Self::OutOfRange => "out of range",
            Self::InvalidArgument => "invalid argument",
            Self::AlreadyExists => "already exists",
            Self::InvalidState => "invalid state",
            Self::Os => "os error",
        }
    }
}

/// EMA error value.
///
/// `Error` is `Copy` and carries no owned data: a kind, an optional
/// POSIX code and a static message. Success is expressed by
/// `Result::Ok`, not by a dedicated "none" member.
#[derive(Debug, Clone, Copy)]
pub struct Error {
    kind: ErrorKind,
    code: i32,
    message: &'static str,
}

/// Workspace-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// Creates a new error value.
    #[must_use]
    pub const fn new(kind: ErrorKind, message: &'static str) -> Self {
        Self {
            kind,
            code: 0,
            message,
        }
    }

    /// Capacity-exhaustion error.
    #[must_use]
    pub const fn no_memory(message: &'static str) -> Self {
        Self::new(ErrorKind::NoMemory, message)
    }

    /// Absent-element error.
    #[must_use]
    pub const fn not_found(message: &'static str) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Checked-index error.
    #[must_use]
    pub const fn out_of_range(message: &'static str) -> Self {
        Self::new(ErrorKind::OutOfRange, message)
    }

    /// Invalid-argument error.
    #[must_use]
    pub const fn invalid_argument(message: &'static str) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Duplicate-entry error.
    #[must_use]
    pub const fn already_exists(message: &'static str) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    /// Wrong-state error.
    #[must_use]
    pub const fn invalid_state(message: &'static str) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    /// Wraps a POSIX error code returned by an OS primitive.
    ///
    /// The code is preserved verbatim and can be recovered with
    /// [`Error::os_code`].
    #[must_use]
    pub const fn from_os(code: i32) -> Self {
        Self {
            kind: ErrorKind::Os,
            code,
            message: "os primitive failed",
        }
    }

    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the POSIX code for [`ErrorKind::Os`] errors, `0`
    /// otherwise.
    #[must_use]
    pub const fn os_code(&self) -> i32 {
        self.code
    }

    /// Returns the static message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.message
    }

    /// Checks whether the error has the given kind.
    #[must_use]
    pub const fn is(&self, kind: ErrorKind) -> bool {
        self.kind as u8 == kind as u8
    }
}

// Errors compare by kind and code; the message is diagnostic only.
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.code == other.code
    }
}

impl Eq for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == ErrorKind::Os {
            write!(f, "{} (errno {}): {}", self.kind.as_str(), self.code, self.message)
        } else {
            write!(f, "{}: {}", self.kind.as_str(), self.message)
        }
    }
}

/// Converts the return value of a POSIX-style call into a [`Result`].
///
/// `pthread_*` functions report failure through a nonzero return code
/// rather than `errno`; this maps `0` to `Ok(())` and anything else to
/// an [`ErrorKind::Os`] error carrying the code.
pub fn check_os(ret: i32) -> Result<()> {
    if ret == 0 {
        Ok(())
    } else {
        Err(Error::from_os(ret))
    }
}
