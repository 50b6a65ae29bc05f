//! Unit tests for the descriptor table.

#![cfg(test)]

use alloc::{sync::Arc, vec::Vec};

use kerrno::KError;
use kfs::{OpenFlags, RamFs};

use crate::file::{FdTable, OpenFile};

fn setup() -> (Arc<RamFs>, Arc<OpenFile>) {
    let fs = RamFs::new();
    fs.insert("f", b"contents").unwrap();
    let file = OpenFile::open(&*fs, "f", OpenFlags::RDONLY, 0).unwrap();
    (fs, file)
}

#[test]
fn test_place_uses_lowest_free_slot() {
    let (_fs, file) = setup();
    let table = FdTable::with_capacity(4);
    assert_eq!(table.place(file.acquire()), Ok(0));
    assert_eq!(table.place(file.acquire()), Ok(1));
    assert_eq!(table.place(file.acquire()), Ok(2));

    table.replace(1, None).unwrap().unwrap().release();
    assert_eq!(table.place(file.acquire()), Ok(1));
    assert_eq!(table.place(file.acquire()), Ok(3));
    assert_eq!(file.refcount(), 4);
}

#[test]
fn test_place_on_full_table_releases_share() {
    let (_fs, file) = setup();
    let table = FdTable::with_capacity(2);
    table.place(file.acquire()).unwrap();
    table.place(file.acquire()).unwrap();
    assert_eq!(table.place(file.acquire()), Err(KError::TooManyOpenFiles));
    assert_eq!(file.refcount(), 2);
}

#[test]
fn test_refcount_is_places_minus_releases() {
    let (_fs, file) = setup();
    let table = FdTable::with_capacity(16);
    let fds: Vec<_> = (0..10).map(|_| table.place(file.acquire()).unwrap()).collect();
    for &fd in &fds[..4] {
        table.replace(fd, None).unwrap().unwrap().release();
    }
    assert_eq!(file.refcount(), 6);
    assert_eq!(table.count(), 6);
}

#[test]
fn test_get_and_is_valid() {
    let (_fs, file) = setup();
    let table = FdTable::with_capacity(4);
    let fd = table.place(file.acquire()).unwrap();

    assert!(table.is_valid(fd));
    assert!(Arc::ptr_eq(&table.get(fd).unwrap(), &file));
    // Borrowing does not take a share.
    assert_eq!(file.refcount(), 1);

    for bad in [-1, 1, 4, i32::MAX] {
        assert!(!table.is_valid(bad));
        assert_eq!(table.get(bad).err(), Some(KError::BadFileDescriptor));
    }
}

#[test]
fn test_replace_returns_previous_occupant() {
    let (fs, file) = setup();
    let other = OpenFile::open(&*fs, "f", OpenFlags::RDWR, 0).unwrap();
    let table = FdTable::with_capacity(4);

    assert!(table.replace(2, None).unwrap().is_none());
    assert!(table.replace(2, Some(file.acquire())).unwrap().is_none());

    let prev = table.replace(2, Some(other.acquire())).unwrap().unwrap();
    assert!(Arc::ptr_eq(prev.file(), &file));
    assert!(Arc::ptr_eq(&table.get(2).unwrap(), &other));
    prev.release();
    assert_eq!(file.refcount(), 0);
    assert_eq!(other.refcount(), 1);

    assert_eq!(table.replace(4, None).err(), Some(KError::BadFileDescriptor));
    assert_eq!(table.replace(-3, None).err(), Some(KError::BadFileDescriptor));
}

#[test]
fn test_drop_releases_every_slot() {
    let (fs, file) = setup();
    let weak = Arc::downgrade(&file);
    let table = FdTable::with_capacity(8);
    for _ in 0..5 {
        table.place(file.acquire()).unwrap();
    }
    drop(file);
    assert_eq!(fs.open_count("f"), Some(1));
    drop(table);
    assert!(weak.upgrade().is_none());
    assert_eq!(fs.open_count("f"), Some(0));
}

#[test]
fn test_default_capacity() {
    assert_eq!(FdTable::new().capacity(), crate::config::OPEN_MAX);
}
