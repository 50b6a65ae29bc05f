//! Unit tests for user memory access.

#![cfg(test)]

use alloc::vec;
use core::ffi::c_char;

use kerrno::KError;

use crate::{
    config::PATH_MAX,
    mm::{UserConstPtr, UserMutPtr, copy_in_str},
};

#[test]
fn test_copy_in_str() {
    let path = c"dir/file.txt";
    let ptr: UserConstPtr<c_char> = path.as_ptr().into();
    assert_eq!(ptr.get_as_str().unwrap(), "dir/file.txt");
}

#[test]
fn test_copy_in_empty_str() {
    let ptr: UserConstPtr<c_char> = c"".as_ptr().into();
    assert_eq!(ptr.get_as_str().unwrap(), "");
}

#[test]
fn test_null_and_low_pointers_fault() {
    let null: UserConstPtr<c_char> = 0usize.into();
    assert_eq!(null.get_as_str(), Err(KError::BadAddress));
    let low: UserConstPtr<c_char> = 0x10usize.into();
    assert_eq!(low.get_as_str(), Err(KError::BadAddress));
}

#[test]
fn test_unterminated_string_is_too_long() {
    let long = vec![b'a'; PATH_MAX];
    assert_eq!(copy_in_str(long.as_ptr(), PATH_MAX), Err(KError::NameTooLong));

    let mut fits = vec![b'a'; PATH_MAX];
    fits[PATH_MAX - 1] = 0;
    assert_eq!(copy_in_str(fits.as_ptr(), PATH_MAX).unwrap().len(), PATH_MAX - 1);
}

#[test]
fn test_invalid_utf8_is_rejected() {
    let bytes = [0xffu8, 0xfe, 0];
    assert_eq!(copy_in_str(bytes.as_ptr(), PATH_MAX), Err(KError::InvalidInput));
}

#[test]
fn test_buffers() {
    let mut buf = [1u8, 2, 3];
    let out: UserMutPtr<u8> = buf.as_mut_ptr().into();
    out.get_as_mut_slice(3).unwrap()[0] = 9;
    assert_eq!(buf[0], 9);

    let null: UserMutPtr<u8> = 0usize.into();
    assert!(null.get_as_mut_slice(0).unwrap().is_empty());
    assert_eq!(null.get_as_mut_slice(1).err(), Some(KError::BadAddress));

    let null: UserConstPtr<u8> = 0usize.into();
    assert!(null.get_as_slice(0).unwrap().is_empty());
    assert_eq!(null.get_as_slice(4).err(), Some(KError::BadAddress));
}
