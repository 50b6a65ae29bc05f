// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Access to user memory.
//!
//! User pointers are wrapped in [`UserConstPtr`] / [`UserMutPtr`] and only
//! turned into kernel values through the checked accessors here. A pointer
//! into the null page is reported as [`KError::BadAddress`].

use alloc::{string::String, vec::Vec};
use core::{ffi::c_char, marker::PhantomData, slice};

use kerrno::{KError, KResult};

use crate::config::{PATH_MAX, USER_SPACE_BASE};

fn check_region(addr: usize, len: usize) -> KResult<()> {
    if len == 0 {
        return Ok(());
    }
    if addr < USER_SPACE_BASE || addr.checked_add(len).is_none() {
        return Err(KError::BadAddress);
    }
    Ok(())
}

/// A read-only pointer into user memory.
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct UserConstPtr<T>(*const T);

/// A writable pointer into user memory.
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct UserMutPtr<T>(*mut T);

impl<T> From<*const T> for UserConstPtr<T> {
    fn from(ptr: *const T) -> Self {
        Self(ptr)
    }
}

impl<T> From<usize> for UserConstPtr<T> {
    fn from(addr: usize) -> Self {
        Self(addr as *const T)
    }
}

impl<T> From<*mut T> for UserMutPtr<T> {
    fn from(ptr: *mut T) -> Self {
        Self(ptr)
    }
}

impl<T> From<usize> for UserMutPtr<T> {
    fn from(addr: usize) -> Self {
        Self(addr as *mut T)
    }
}

impl<T> UserConstPtr<T> {
    #[inline]
    pub fn address(&self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl<T> UserMutPtr<T> {
    #[inline]
    pub fn address(&self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl UserConstPtr<c_char> {
    /// Copies a NUL-terminated string of at most [`PATH_MAX`] bytes (NUL
    /// included) into kernel memory.
    pub fn get_as_str(&self) -> KResult<String> {
        copy_in_str(self.0.cast(), PATH_MAX)
    }
}

impl UserConstPtr<u8> {
    /// Validates `len` bytes at this address and borrows them.
    pub fn get_as_slice<'a>(&self, len: usize) -> KResult<&'a [u8]> {
        check_region(self.address(), len)?;
        if len == 0 {
            return Ok(&[]);
        }
        // SAFETY: the region passed the user-range check; user mappings stay
        // valid for the duration of the syscall.
        Ok(unsafe { slice::from_raw_parts(self.0, len) })
    }
}

impl UserMutPtr<u8> {
    /// Validates `len` writable bytes at this address and borrows them.
    pub fn get_as_mut_slice<'a>(&self, len: usize) -> KResult<&'a mut [u8]> {
        check_region(self.address(), len)?;
        if len == 0 {
            return Ok(&mut []);
        }
        // SAFETY: as in `UserConstPtr::get_as_slice`.
        Ok(unsafe { slice::from_raw_parts_mut(self.0, len) })
    }
}

/// Bounded copy of a user string.
///
/// Scans at most `max` bytes for the terminating NUL. Fails with
/// [`KError::NameTooLong`] if none is found, [`KError::BadAddress`] if the
/// start address is invalid, [`KError::InvalidInput`] if the bytes are not
/// UTF-8.
pub fn copy_in_str(ptr: *const u8, max: usize) -> KResult<String> {
    check_region(ptr as usize, 1)?;
    let mut buf = Vec::new();
    for i in 0..max {
        let addr = (ptr as usize).checked_add(i).ok_or(KError::BadAddress)?;
        check_region(addr, 1)?;
        // SAFETY: each byte address is checked before it is read.
        let byte = unsafe { ptr.add(i).read_volatile() };
        if byte == 0 {
            return String::from_utf8(buf).map_err(|_| KError::InvalidInput);
        }
        buf.push(byte);
    }
    Err(KError::NameTooLong)
}
