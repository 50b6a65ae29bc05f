//! open / read / write / close / lseek through the syscall entry points


use std::sync::Arc;

use kapi::{
    file::FdTable,
    syscall::{sys_lseek, sys_read, sys_write},
    task::Process,
};
use kerrno::KError;
use kfs::dev::ConsoleDev;
use test_helpers::*;

// ========== open ==========

#[test]
fn test_open_assigns_lowest_descriptors() {
    let (fs, proc) = setup();
    fs.insert("a", b"").unwrap();
    assert_eq!(open(&proc, "a", O_RDONLY), Ok(0));
    assert_eq!(open(&proc, "a", O_RDONLY), Ok(1));
    assert_eq!(open(&proc, "a", O_RDONLY), Ok(2));
    close(&proc, 1).unwrap();
    assert_eq!(open(&proc, "a", O_RDONLY), Ok(1));
}

#[test]
fn test_open_rejects_unknown_flags_before_touching_path() {
    let (fs, proc) = setup();
    for stray in [0o200, 0o400, 1 << 12, 1 << 31] {
        let flags = O_WRONLY | O_CREAT | stray;
        assert_eq!(open(&proc, "new", flags), Err(KError::InvalidInput));
        // Even a bad path pointer is not looked at.
        let ret = kapi::syscall::sys_open(&proc, 0usize.into(), flags, 0);
        assert_eq!(ret, Err(KError::InvalidInput));
    }
    assert_eq!(open(&proc, "new", O_WRONLY | O_RDWR), Err(KError::InvalidInput));
    assert!(!fs.exists("new"));
    assert_eq!(proc.fd_table().count(), 0);
}

#[test]
fn test_open_path_copy_faults() {
    let (_fs, proc) = setup();
    let ret = kapi::syscall::sys_open(&proc, 0usize.into(), O_RDONLY, 0);
    assert_eq!(ret, Err(KError::BadAddress));
    let long = "x".repeat(kapi::config::PATH_MAX);
    assert_eq!(open(&proc, &long, O_RDONLY), Err(KError::NameTooLong));
}

#[test]
fn test_open_storage_errors_propagate() {
    let (fs, proc) = setup();
    fs.insert("there", b"x").unwrap();
    assert_eq!(open(&proc, "missing", O_RDONLY), Err(KError::NotFound));
    assert_eq!(
        open(&proc, "there", O_WRONLY | O_CREAT | O_EXCL),
        Err(KError::AlreadyExists)
    );
    assert_eq!(open(&proc, "", O_RDONLY), Err(KError::InvalidInput));
    assert_eq!(proc.fd_table().count(), 0);
    assert_eq!(fs.open_count("there"), Some(0));
}

#[test]
fn test_open_on_full_table_does_not_leak() {
    init_logging();
    let fs = kfs::RamFs::new();
    fs.insert("f", b"data").unwrap();
    let proc = Process::with_table(7, fs.clone(), FdTable::with_capacity(3));
    for expected in 0..3 {
        assert_eq!(open(&proc, "f", O_RDONLY), Ok(expected));
    }
    assert_eq!(open(&proc, "f", O_RDONLY), Err(KError::TooManyOpenFiles));
    // The failed open released its object reference.
    assert_eq!(fs.open_count("f"), Some(3));
}

#[test]
fn test_truncate_and_append() {
    let (fs, proc) = setup();
    fs.insert("log", b"old contents").unwrap();
    let fd = open(&proc, "log", O_WRONLY | O_TRUNC).unwrap();
    assert_eq!(fs.contents("log").unwrap(), b"");
    write(&proc, fd, b"one").unwrap();
    close(&proc, fd).unwrap();

    let fd = open(&proc, "log", O_WRONLY | O_APPEND).unwrap();
    write(&proc, fd, b"two").unwrap();
    assert_eq!(fs.contents("log").unwrap(), b"onetwo");
}

// ========== read / write ==========

#[test]
fn test_round_trip_offset_equals_length() {
    let (_fs, proc) = setup();
    let data: Vec<u8> = (0..=255).collect();
    let fd = open(&proc, "rt", O_RDWR | O_CREAT).unwrap();
    assert_eq!(write(&proc, fd, &data), Ok(data.len()));
    assert_eq!(proc.fd_table().get(fd).unwrap().offset(), data.len() as u64);

    assert_eq!(sys_lseek(&proc, fd, 0, 0), Ok(0));
    let mut back = vec![0u8; data.len()];
    assert_eq!(read(&proc, fd, &mut back), Ok(data.len()));
    assert_eq!(back, data);
    assert_eq!(proc.fd_table().get(fd).unwrap().offset(), data.len() as u64);
}

#[test]
fn test_round_trip_through_separate_opens() {
    let (_fs, proc) = setup();
    let w = open(&proc, "rt", O_WRONLY | O_CREAT).unwrap();
    write(&proc, w, b"hello world").unwrap();
    let r = open(&proc, "rt", O_RDONLY).unwrap();
    assert_eq!(read_to_end(&proc, r), b"hello world");
    assert_eq!(proc.fd_table().get(r).unwrap().offset(), 11);
}

#[test]
fn test_short_read_and_eof() {
    let (fs, proc) = setup();
    fs.insert("s", b"abc").unwrap();
    let fd = open(&proc, "s", O_RDONLY).unwrap();
    let mut buf = [0u8; 10];
    assert_eq!(read(&proc, fd, &mut buf), Ok(3));
    assert_eq!(read(&proc, fd, &mut buf), Ok(0));
    assert_eq!(read(&proc, fd, &mut buf), Ok(0));
}

#[test]
fn test_read_write_only_is_wrong_mode() {
    let (fs, proc) = setup();
    fs.insert("w", b"secret").unwrap();
    let fd = open(&proc, "w", O_WRONLY).unwrap();
    for len in [0usize, 1, 6, 4096] {
        let mut buf = vec![0xaa; len];
        assert_eq!(read(&proc, fd, &mut buf), Err(KError::WrongMode));
        assert!(buf.iter().all(|&b| b == 0xaa));
    }
    // Mode is checked before the buffer.
    assert_eq!(sys_read(&proc, fd, 0usize.into(), 16), Err(KError::WrongMode));
    assert_eq!(proc.fd_table().get(fd).unwrap().offset(), 0);
}

#[test]
fn test_write_read_only_is_wrong_mode() {
    let (fs, proc) = setup();
    fs.insert("r", b"keep").unwrap();
    let fd = open(&proc, "r", O_RDONLY).unwrap();
    assert_eq!(write(&proc, fd, b""), Err(KError::WrongMode));
    assert_eq!(write(&proc, fd, b"clobber"), Err(KError::WrongMode));
    assert_eq!(sys_write(&proc, fd, 0usize.into(), 3), Err(KError::WrongMode));
    assert_eq!(fs.contents("r").unwrap(), b"keep");
}

#[test]
fn test_bad_buffer_faults() {
    let (fs, proc) = setup();
    fs.insert("r", b"keep").unwrap();
    let fd = open(&proc, "r", O_RDWR).unwrap();
    assert_eq!(sys_read(&proc, fd, 0usize.into(), 4), Err(KError::BadAddress));
    assert_eq!(sys_write(&proc, fd, 8usize.into(), 4), Err(KError::BadAddress));
}

#[test]
fn test_bad_descriptors() {
    let (_fs, proc) = setup();
    let mut buf = [0u8; 4];
    for fd in [-1, 0, 5, 127, 128, 100_000] {
        assert_eq!(read(&proc, fd, &mut buf), Err(KError::BadFileDescriptor));
        assert_eq!(write(&proc, fd, &buf), Err(KError::BadFileDescriptor));
        assert_eq!(sys_lseek(&proc, fd, 0, 0), Err(KError::BadFileDescriptor));
    }
}

// ========== close ==========

#[test]
fn test_operations_after_close_are_bad_descriptor() {
    let (fs, proc) = setup();
    fs.insert("c", b"1234").unwrap();
    let fd = open(&proc, "c", O_RDWR).unwrap();
    close(&proc, fd).unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(read(&proc, fd, &mut buf), Err(KError::BadFileDescriptor));
    assert_eq!(write(&proc, fd, b"x"), Err(KError::BadFileDescriptor));
    assert_eq!(sys_lseek(&proc, fd, 0, 0), Err(KError::BadFileDescriptor));
    assert!(!proc.fd_table().is_valid(fd));
}

#[test]
fn test_double_close() {
    let (fs, proc) = setup();
    fs.insert("c", b"").unwrap();
    let fd = open(&proc, "c", O_RDONLY).unwrap();
    assert_eq!(close(&proc, fd), Ok(()));
    assert_eq!(close(&proc, fd), Err(KError::NoSuchOpenFile));
    assert_eq!(fs.open_count("c"), Some(0));
}

#[test]
fn test_close_out_of_range() {
    let (_fs, proc) = setup();
    assert_eq!(close(&proc, -1), Err(KError::BadFileDescriptor));
    assert_eq!(close(&proc, kapi::config::OPEN_MAX as i32), Err(KError::BadFileDescriptor));
    assert_eq!(close(&proc, 3), Err(KError::NoSuchOpenFile));
}

// ========== lseek ==========

#[test]
fn test_lseek() {
    let (fs, proc) = setup();
    fs.insert("s", b"0123456789").unwrap();
    let fd = open(&proc, "s", O_RDONLY).unwrap();
    assert_eq!(sys_lseek(&proc, fd, 4, 0), Ok(4));
    assert_eq!(sys_lseek(&proc, fd, 2, 1), Ok(6));
    assert_eq!(sys_lseek(&proc, fd, -3, 2), Ok(7));
    assert_eq!(sys_lseek(&proc, fd, -1, 0), Err(KError::InvalidInput));
    assert_eq!(sys_lseek(&proc, fd, -100, 1), Err(KError::InvalidInput));
    assert_eq!(sys_lseek(&proc, fd, 0, 3), Err(KError::InvalidInput));
    let mut buf = [0u8; 8];
    assert_eq!(read(&proc, fd, &mut buf), Ok(3));
    assert_eq!(&buf[..3], b"789");
}

#[test]
fn test_rejected_lseek_keeps_cursor() {
    let (fs, proc) = setup();
    fs.insert("s", b"0123456789").unwrap();
    let fd = open(&proc, "s", O_RDONLY).unwrap();
    assert_eq!(sys_lseek(&proc, fd, 4, 0), Ok(4));
    assert_eq!(sys_lseek(&proc, fd, i64::MAX, 1), Err(KError::InvalidInput));
    assert_eq!(sys_lseek(&proc, fd, i64::MAX, 2), Err(KError::InvalidInput));
    assert_eq!(sys_lseek(&proc, fd, -5, 1), Err(KError::InvalidInput));
    let mut buf = [0u8; 8];
    assert_eq!(read(&proc, fd, &mut buf), Ok(6));
    assert_eq!(&buf[..6], b"456789");
}

#[test]
fn test_write_after_seek_past_end_zero_fills() {
    let (fs, proc) = setup();
    let fd = open(&proc, "gap", O_RDWR | O_CREAT).unwrap();
    assert_eq!(write(&proc, fd, b"ab"), Ok(2));
    assert_eq!(sys_lseek(&proc, fd, 3, 1), Ok(5));
    assert_eq!(write(&proc, fd, b"cd"), Ok(2));
    assert_eq!(sys_lseek(&proc, fd, 0, 1), Ok(7));
    assert_eq!(sys_lseek(&proc, fd, 0, 2), Ok(7));
    assert_eq!(fs.contents("gap").unwrap(), b"ab\0\0\0cd");
}

#[test]
fn test_write_far_past_end_is_no_space() {
    let (fs, proc) = setup();
    fs.insert("s", b"abc").unwrap();
    let fd = open(&proc, "s", O_RDWR).unwrap();
    assert_eq!(sys_lseek(&proc, fd, 1 << 46, 0), Ok(1 << 46));
    assert_eq!(write(&proc, fd, b"x"), Err(KError::NoSpace));
    assert_eq!(sys_lseek(&proc, fd, 0, 1), Ok(1 << 46));
    assert_eq!(fs.contents("s").unwrap(), b"abc");

    // The handle stays usable.
    assert_eq!(sys_lseek(&proc, fd, 0, 2), Ok(3));
    assert_eq!(write(&proc, fd, b"d"), Ok(1));
    assert_eq!(fs.contents("s").unwrap(), b"abcd");
    close(&proc, fd).unwrap();
}

#[test]
fn test_lseek_console_is_illegal() {
    let (_fs, proc) = setup();
    let fd = open(&proc, "con:", O_RDWR).unwrap();
    assert_eq!(sys_lseek(&proc, fd, 0, 0), Err(KError::IllegalSeek));
}

// ========== process file state ==========

#[test]
fn test_stdio_descriptors() {
    init_logging();
    let fs = kfs::RamFs::new();
    let console = ConsoleDev::new();
    fs.mount_device("con:", console.clone()).unwrap();
    let proc = Process::new_with_stdio(2, fs.clone()).unwrap();

    assert_eq!(proc.fd_table().count(), 3);
    assert_eq!(write(&proc, 1, b"out "), Ok(4));
    assert_eq!(write(&proc, 2, b"err"), Ok(3));
    assert_eq!(console.take_output(), b"out err");
    assert_eq!(write(&proc, 0, b"x"), Err(KError::WrongMode));

    console.push_input(b"typed");
    let mut buf = [0u8; 16];
    assert_eq!(read(&proc, 0, &mut buf), Ok(5));
    assert_eq!(&buf[..5], b"typed");
    assert_eq!(read(&proc, 1, &mut buf), Err(KError::WrongMode));

    fs.insert("f", b"").unwrap();
    assert_eq!(open(&proc, "f", O_RDONLY), Ok(3));
}

#[test]
fn test_exit_releases_everything() {
    let (fs, proc) = setup();
    fs.insert("f", b"abc").unwrap();
    for _ in 0..5 {
        open(&proc, "f", O_RDONLY).unwrap();
    }
    assert_eq!(fs.open_count("f"), Some(5));
    proc.exit();
    assert!(proc.has_exited());
    assert_eq!(proc.fd_table().count(), 0);
    assert_eq!(fs.open_count("f"), Some(0));
    proc.exit();
}

#[test]
fn test_handle_shared_between_tables() {
    let (fs, parent) = setup();
    fs.insert("shared", b"abcdefgh").unwrap();
    let child = Process::new(2, fs.clone());

    let fd = open(&parent, "shared", O_RDONLY).unwrap();
    let file = parent.fd_table().get(fd).unwrap();
    let child_fd = child.fd_table().place(file.acquire()).unwrap();
    assert_eq!(file.refcount(), 2);

    // Both descriptors see one cursor.
    let mut buf = [0u8; 3];
    read(&parent, fd, &mut buf).unwrap();
    read(&child, child_fd, &mut buf).unwrap();
    assert_eq!(&buf, b"def");

    let weak = Arc::downgrade(&file);
    drop(file);
    close(&parent, fd).unwrap();
    assert!(weak.upgrade().is_some());
    assert_eq!(fs.open_count("shared"), Some(1));

    child.exit();
    assert!(weak.upgrade().is_none());
    assert_eq!(fs.open_count("shared"), Some(0));
}
