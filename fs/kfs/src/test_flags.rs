//! Unit tests for open flag decoding.

#![cfg(test)]

use kerrno::KError;

use crate::{AccessMode, OpenFlags};

#[test]
fn test_access_mode_decoding() {
    assert_eq!(OpenFlags::from_user(0).unwrap().access_mode(), AccessMode::ReadOnly);
    assert_eq!(OpenFlags::from_user(1).unwrap().access_mode(), AccessMode::WriteOnly);
    assert_eq!(OpenFlags::from_user(2).unwrap().access_mode(), AccessMode::ReadWrite);
}

#[test]
fn test_accmode_three_is_rejected() {
    assert_eq!(OpenFlags::from_user(3), Err(KError::InvalidInput));
    assert_eq!(OpenFlags::from_user(3 | 0o4), Err(KError::InvalidInput));
}

#[test]
fn test_unknown_bits_rejected_regardless_of_others() {
    let known = [0u32, 0o1, 0o2, 0o4, 0o10, 0o20, 0o40, 0o100, 0o175];
    for shift in 7..32 {
        let stray = 1u32 << shift;
        for base in known {
            assert_eq!(
                OpenFlags::from_user(base | stray),
                Err(KError::InvalidInput),
                "flags {:#o} must be rejected",
                base | stray
            );
        }
    }
}

#[test]
fn test_all_recognized_bits_accepted() {
    let bits = 0o2 | 0o4 | 0o10 | 0o20 | 0o40 | 0o100;
    let flags = OpenFlags::from_user(bits).unwrap();
    assert!(flags.contains(OpenFlags::CREAT | OpenFlags::EXCL | OpenFlags::TRUNC));
    assert!(flags.contains(OpenFlags::APPEND | OpenFlags::NOCTTY));
}

#[test]
fn test_mode_checks() {
    assert_eq!(AccessMode::WriteOnly.check_read(), Err(KError::WrongMode));
    assert_eq!(AccessMode::ReadOnly.check_write(), Err(KError::WrongMode));
    assert!(AccessMode::ReadWrite.check_read().is_ok());
    assert!(AccessMode::ReadWrite.check_write().is_ok());
}
