//! Unit tests for open file handles.

#![cfg(test)]

use alloc::sync::Arc;

use kerrno::KError;
use kfs::{AccessMode, OpenFlags, RamFs, dev::NullDev};

use crate::file::{OpenFile, SeekFrom};

fn setup() -> Arc<RamFs> {
    let fs = RamFs::new();
    fs.insert("data.txt", b"0123456789").unwrap();
    fs.mount_device("null:", Arc::new(NullDev)).unwrap();
    fs
}

fn open(fs: &RamFs, path: &str, flags: OpenFlags) -> Arc<OpenFile> {
    OpenFile::open(fs, path, flags, 0o664).unwrap()
}

#[test]
fn test_new_handle_starts_empty() {
    let fs = setup();
    let file = open(&fs, "data.txt", OpenFlags::RDWR);
    assert_eq!(file.refcount(), 0);
    assert_eq!(file.offset(), 0);
    assert_eq!(file.access_mode(), AccessMode::ReadWrite);
    assert!(file.is_seekable());
}

#[test]
fn test_open_failure_creates_no_handle() {
    let fs = setup();
    let err = OpenFile::open(&*fs, "missing", OpenFlags::RDONLY, 0).err();
    assert_eq!(err, Some(KError::NotFound));
    assert!(!fs.exists("missing"));
}

#[test]
fn test_shares_count_and_release_object_at_zero() {
    let fs = setup();
    let file = open(&fs, "data.txt", OpenFlags::RDONLY);
    let weak = Arc::downgrade(&file);
    assert_eq!(fs.open_count("data.txt"), Some(1));

    let a = file.acquire();
    let b = a.clone();
    let c = file.acquire();
    assert_eq!(file.refcount(), 3);
    drop(file);

    b.release();
    assert_eq!(a.file().refcount(), 2);
    c.release();
    assert_eq!(a.file().refcount(), 1);
    assert_eq!(fs.open_count("data.txt"), Some(1));

    a.release();
    assert!(weak.upgrade().is_none());
    assert_eq!(fs.open_count("data.txt"), Some(0));
}

#[test]
fn test_read_advances_by_bytes_actually_read() {
    let fs = setup();
    let file = open(&fs, "data.txt", OpenFlags::RDONLY);
    let mut buf = [0u8; 4];
    assert_eq!(file.read(&mut buf).unwrap(), 4);
    assert_eq!(&buf, b"0123");
    assert_eq!(file.offset(), 4);

    let mut big = [0u8; 32];
    assert_eq!(file.read(&mut big).unwrap(), 6);
    assert_eq!(file.offset(), 10);
    assert_eq!(file.read(&mut big).unwrap(), 0);
    assert_eq!(file.offset(), 10);
}

#[test]
fn test_mode_is_enforced_even_for_empty_buffers() {
    let fs = setup();
    let wo = open(&fs, "data.txt", OpenFlags::WRONLY);
    assert_eq!(wo.read(&mut []), Err(KError::WrongMode));
    let ro = open(&fs, "data.txt", OpenFlags::RDONLY);
    assert_eq!(ro.write(&[]), Err(KError::WrongMode));
    assert_eq!(ro.write(b"x"), Err(KError::WrongMode));
    assert_eq!(fs.contents("data.txt").unwrap(), b"0123456789");
}

#[test]
fn test_append_writes_at_end() {
    let fs = setup();
    let file = open(&fs, "data.txt", OpenFlags::WRONLY | OpenFlags::APPEND);
    assert_eq!(file.write(b"ab").unwrap(), 2);
    assert_eq!(file.offset(), 12);
    fs.insert("data.txt", b"xyz").unwrap();
    assert_eq!(file.write(b"!").unwrap(), 1);
    assert_eq!(fs.contents("data.txt").unwrap(), b"xyz!");
}

#[test]
fn test_seek() {
    let fs = setup();
    let file = open(&fs, "data.txt", OpenFlags::RDONLY);
    assert_eq!(file.seek(SeekFrom::Start(3)).unwrap(), 3);
    assert_eq!(file.seek(SeekFrom::Current(2)).unwrap(), 5);
    assert_eq!(file.seek(SeekFrom::End(-1)).unwrap(), 9);
    assert_eq!(file.seek(SeekFrom::Current(-20)), Err(KError::InvalidInput));
    assert_eq!(file.offset(), 9);

    let mut buf = [0u8; 4];
    assert_eq!(file.read(&mut buf).unwrap(), 1);
    assert_eq!(buf[0], b'9');
}

#[test]
fn test_seek_out_of_range_keeps_cursor() {
    let fs = setup();
    let file = open(&fs, "data.txt", OpenFlags::RDONLY);
    assert_eq!(file.seek(SeekFrom::Start(4)).unwrap(), 4);
    assert_eq!(file.seek(SeekFrom::Current(i64::MAX)), Err(KError::InvalidInput));
    assert_eq!(file.seek(SeekFrom::Start(u64::MAX)), Err(KError::InvalidInput));
    assert_eq!(file.seek(SeekFrom::End(i64::MAX)), Err(KError::InvalidInput));
    assert_eq!(file.offset(), 4);

    let mut buf = [0u8; 2];
    assert_eq!(file.read(&mut buf).unwrap(), 2);
    assert_eq!(&buf, b"45");
}

#[test]
fn test_non_seekable_ignores_cursor() {
    let fs = setup();
    let file = open(&fs, "null:", OpenFlags::RDWR);
    assert!(!file.is_seekable());
    assert_eq!(file.write(b"discard").unwrap(), 7);
    assert_eq!(file.offset(), 0);
    assert_eq!(file.seek(SeekFrom::Start(1)), Err(KError::IllegalSeek));
}
