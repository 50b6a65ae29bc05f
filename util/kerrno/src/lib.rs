// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Kernel error kinds.
//!
//! Every fallible kernel operation returns [`KResult`]. At the syscall
//! boundary an error is turned into a negative integer with
//! [`KError::code`]; user space decodes it back with [`KError::from_code`].
#![cfg_attr(not(test), no_std)]

use core::fmt;

use strum::{FromRepr, IntoStaticStr};

/// Error kinds surfaced by the kernel file I/O layer.
///
/// The discriminant is the stable ABI error number.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
pub enum KError {
    /// Unrecognized flags, bad `whence`, malformed path, ...
    InvalidInput     = 1,
    /// Path does not name an existing object.
    NotFound         = 2,
    /// Exclusive create of an object that is already present.
    AlreadyExists    = 3,
    /// Descriptor out of range or referring to an empty slot.
    BadFileDescriptor = 4,
    /// Closing a slot that holds no open file.
    NoSuchOpenFile   = 5,
    /// Access-mode mismatch (reading a write-only file, writing a read-only one).
    WrongMode        = 6,
    /// No free slot in the descriptor table.
    TooManyOpenFiles = 7,
    /// User address could not be accessed.
    BadAddress       = 8,
    /// User string exceeds the copy bound.
    NameTooLong      = 9,
    /// The storage layer failed to move bytes.
    Io               = 10,
    /// Seek on an object without a cursor.
    IllegalSeek      = 11,
    /// Unknown syscall or unsupported operation.
    Unsupported      = 12,
    /// Storage is full or a file would exceed its size limit.
    NoSpace          = 13,
}

/// Result type used throughout the kernel.
pub type KResult<T = ()> = Result<T, KError>;

impl KError {
    /// Returns the positive ABI error number.
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Decodes an ABI error number. The sign is ignored so that a raw
    /// negative syscall return can be passed directly.
    pub fn from_code(code: i64) -> Option<Self> {
        u32::try_from(code.unsigned_abs())
            .ok()
            .and_then(Self::from_repr)
    }

    /// Returns the variant name, e.g. `"BadFileDescriptor"`.
    #[inline]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Returns a short human-readable description.
    pub const fn as_str(self) -> &'static str {
        use KError::*;
        match self {
            InvalidInput => "Invalid argument",
            NotFound => "No such file or directory",
            AlreadyExists => "File exists",
            BadFileDescriptor => "Bad file descriptor",
            NoSuchOpenFile => "No such open file",
            WrongMode => "Wrong file mode for operation",
            TooManyOpenFiles => "Too many open files",
            BadAddress => "Bad address",
            NameTooLong => "File name too long",
            Io => "Input/output error",
            IllegalSeek => "Illegal seek",
            Unsupported => "Operation not supported",
            NoSpace => "No space left on device",
        }
    }
}

impl fmt::Display for KError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::error::Error for KError {}
