//! Open flags and access modes.

use bitflags::bitflags;
use kerrno::{KError, KResult};

bitflags! {
    /// Flags accepted by `open`.
    ///
    /// The access mode lives in the low two bits and is not a flag on its
    /// own: `0` is read-only, so use [`OpenFlags::access_mode`] to read it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct OpenFlags: u32 {
        const WRONLY = 0o1;
        const RDWR   = 0o2;
        const CREAT  = 0o4;
        const EXCL   = 0o10;
        const TRUNC  = 0o20;
        const APPEND = 0o40;
        const NOCTTY = 0o100;
    }
}

impl OpenFlags {
    /// Read-only access (no bits set).
    pub const RDONLY: Self = Self::empty();
    /// Mask covering the access-mode bits.
    pub const ACCMODE: u32 = 0o3;

    /// Validates raw user flags.
    ///
    /// Any bit outside the recognized set, or the access-mode value `3`,
    /// fails with [`KError::InvalidInput`].
    pub fn from_user(bits: u32) -> KResult<Self> {
        let flags = Self::from_bits(bits).ok_or(KError::InvalidInput)?;
        if bits & Self::ACCMODE == Self::ACCMODE {
            return Err(KError::InvalidInput);
        }
        Ok(flags)
    }

    /// Decodes the access mode from the low bits.
    pub fn access_mode(&self) -> AccessMode {
        if self.contains(Self::RDWR) {
            AccessMode::ReadWrite
        } else if self.contains(Self::WRONLY) {
            AccessMode::WriteOnly
        } else {
            AccessMode::ReadOnly
        }
    }
}

/// How an open file may be used. Fixed when the file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    #[inline]
    pub fn readable(self) -> bool {
        !matches!(self, AccessMode::WriteOnly)
    }

    #[inline]
    pub fn writable(self) -> bool {
        !matches!(self, AccessMode::ReadOnly)
    }

    /// Fails with [`KError::WrongMode`] unless reading is allowed.
    pub fn check_read(self) -> KResult<()> {
        if self.readable() {
            Ok(())
        } else {
            Err(KError::WrongMode)
        }
    }

    /// Fails with [`KError::WrongMode`] unless writing is allowed.
    pub fn check_write(self) -> KResult<()> {
        if self.writable() {
            Ok(())
        } else {
            Err(KError::WrongMode)
        }
    }
}
