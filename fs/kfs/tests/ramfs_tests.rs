//! Tests for the in-memory storage layer


use kerrno::KError;
use kfs::{FilesystemOps, MAX_FILE_SIZE, OpenFlags, dev::NullDev};
use test_helpers::*;

// ========== Resolution ==========

#[test]
fn test_missing_file_without_create_is_not_found() {
    let (fs, _) = setup_test_fs();
    let err = fs.resolve_or_create("nope.txt", OpenFlags::RDONLY, 0).err();
    assert_eq!(err, Some(KError::NotFound));
    assert!(!fs.exists("nope.txt"));
}

#[test]
fn test_create_records_mode() {
    let (fs, _) = setup_test_fs();
    let _node = open(&fs, "new.txt", OpenFlags::WRONLY | OpenFlags::CREAT);
    assert!(fs.exists("/new.txt"));
    assert_eq!(fs.file_mode("new.txt"), Some(0o664));
}

#[test]
fn test_exclusive_create_of_existing_fails() {
    let (fs, _) = setup_test_fs();
    let flags = OpenFlags::WRONLY | OpenFlags::CREAT | OpenFlags::EXCL;
    let err = fs.resolve_or_create("short.txt", flags, 0o664).err();
    assert_eq!(err, Some(KError::AlreadyExists));
    assert_eq!(fs.contents("short.txt").unwrap(), b"hello");
}

#[test]
fn test_empty_path_is_invalid() {
    let (fs, _) = setup_test_fs();
    assert_eq!(fs.resolve_or_create("", OpenFlags::RDONLY, 0).err(), Some(KError::InvalidInput));
    assert_eq!(fs.resolve_or_create("/", OpenFlags::RDONLY, 0).err(), Some(KError::InvalidInput));
}

#[test]
fn test_truncate_only_when_writable() {
    let (fs, _) = setup_test_fs();
    drop(open(&fs, "short.txt", OpenFlags::RDONLY | OpenFlags::TRUNC));
    assert_eq!(fs.contents("short.txt").unwrap(), b"hello");
    drop(open(&fs, "short.txt", OpenFlags::WRONLY | OpenFlags::TRUNC));
    assert_eq!(fs.contents("short.txt").unwrap(), b"");
}

// ========== Transfers ==========

#[test]
fn test_read_reports_short_count_and_new_offset() {
    let (fs, _) = setup_test_fs();
    let node = open(&fs, "short.txt", OpenFlags::RDONLY);
    let mut buf = [0u8; 8];
    assert_eq!(node.read_at(2, &mut buf).unwrap(), (3, 5));
    assert_eq!(&buf[..3], b"llo");
    assert_eq!(node.read_at(5, &mut buf).unwrap(), (0, 5));
    assert_eq!(node.read_at(100, &mut buf).unwrap(), (0, 100));
}

#[test]
fn test_write_past_end_zero_fills() {
    let (fs, _) = setup_test_fs();
    let node = open(&fs, "empty.txt", OpenFlags::WRONLY);
    assert_eq!(node.write_at(2, b"ab").unwrap(), (2, 4));
    assert_eq!(fs.contents("empty.txt").unwrap(), b"\0\0ab");
    assert_eq!(node.len().unwrap(), 4);
}

#[test]
fn test_write_beyond_size_limit_is_no_space() {
    let (fs, _) = setup_test_fs();
    let node = open(&fs, "short.txt", OpenFlags::WRONLY);
    assert_eq!(node.write_at(1 << 46, b"x"), Err(KError::NoSpace));
    assert_eq!(node.write_at(MAX_FILE_SIZE, b"x"), Err(KError::NoSpace));
    assert_eq!(node.write_at(u64::MAX, b"x"), Err(KError::NoSpace));
    assert_eq!(fs.contents("short.txt").unwrap(), b"hello");

    // Nothing to write, nothing to grow.
    assert_eq!(node.write_at(1 << 46, b"").unwrap(), (0, 1 << 46));
    assert_eq!(node.len().unwrap(), 5);
}

// ========== Object references ==========

#[test]
fn test_open_count_tracks_live_references() {
    let (fs, _) = setup_test_fs();
    assert_eq!(fs.open_count("short.txt"), Some(0));
    let a = open(&fs, "short.txt", OpenFlags::RDONLY);
    let b = open(&fs, "short.txt", OpenFlags::RDONLY);
    assert_eq!(fs.open_count("short.txt"), Some(2));
    drop(a);
    assert_eq!(fs.open_count("short.txt"), Some(1));
    drop(b);
    assert_eq!(fs.open_count("short.txt"), Some(0));
}

// ========== Devices ==========

#[test]
fn test_console_is_not_seekable_and_ignores_offset() {
    let (fs, console) = setup_test_fs();
    let node = open(&fs, "con:", OpenFlags::RDWR);
    assert!(!node.is_seekable());

    console.push_input(b"hi!");
    let mut buf = [0u8; 2];
    assert_eq!(node.read_at(40, &mut buf).unwrap(), (2, 40));
    assert_eq!(&buf, b"hi");
    assert_eq!(node.read_at(0, &mut buf).unwrap(), (1, 0));
    assert_eq!(node.read_at(0, &mut buf).unwrap(), (0, 0));

    assert_eq!(node.write_at(7, b"out").unwrap(), (3, 7));
    assert_eq!(console.take_output(), b"out");
    assert!(console.take_output().is_empty());
}

#[test]
fn test_mount_device_twice_fails() {
    let (fs, _) = setup_test_fs();
    assert_eq!(fs.mount_device("con:", std::sync::Arc::new(NullDev)), Err(KError::AlreadyExists));
    fs.mount_device("null:", std::sync::Arc::new(NullDev)).unwrap();
    let node = open(&fs, "null:", OpenFlags::RDWR);
    let mut buf = [0u8; 4];
    assert_eq!(node.read_at(0, &mut buf).unwrap(), (0, 0));
    assert_eq!(node.write_at(0, b"gone").unwrap(), (4, 0));
}
