// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Per-process descriptor table.

use alloc::{sync::Arc, vec::Vec};
use core::mem;

use kerrno::{KError, KResult};
use spin::RwLock;

use super::{FileRef, OpenFile};
use crate::config::OPEN_MAX;

/// A descriptor: index of a slot in one process's [`FdTable`].
pub type Fd = i32;

/// Fixed-capacity map from descriptors to open file shares.
///
/// Slot allocation and replacement take the table lock for writing, so
/// finding a free slot and filling it is atomic; lookups take it for
/// reading and see one consistent slot. The lock is never held while doing
/// I/O on a file.
pub struct FdTable {
    slots: RwLock<Vec<Option<FileRef>>>,
}

impl FdTable {
    /// Creates an empty table with [`OPEN_MAX`] slots.
    pub fn new() -> Self {
        Self::with_capacity(OPEN_MAX)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots: RwLock::new(slots),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.read().len()
    }

    fn index(fd: Fd, len: usize) -> KResult<usize> {
        usize::try_from(fd)
            .ok()
            .filter(|&idx| idx < len)
            .ok_or(KError::BadFileDescriptor)
    }

    /// Installs `file` in the lowest free slot and returns its descriptor.
    ///
    /// When the table is full the share is released before
    /// [`KError::TooManyOpenFiles`] is returned.
    pub fn place(&self, file: FileRef) -> KResult<Fd> {
        let mut slots = self.slots.write();
        let Some(idx) = slots.iter().position(Option::is_none) else {
            drop(slots);
            warn!("descriptor table full, dropping new open file");
            return Err(KError::TooManyOpenFiles);
        };
        slots[idx] = Some(file);
        Ok(idx as Fd)
    }

    /// Swaps the contents of slot `fd` and returns the previous occupant.
    ///
    /// The caller owns the returned share; dropping it releases it.
    pub fn replace(&self, fd: Fd, file: Option<FileRef>) -> KResult<Option<FileRef>> {
        let mut slots = self.slots.write();
        let idx = Self::index(fd, slots.len())?;
        Ok(mem::replace(&mut slots[idx], file))
    }

    /// Borrows the file behind `fd`.
    ///
    /// The returned handle does not count as a share: it keeps the object
    /// alive for the duration of one operation, nothing more.
    pub fn get(&self, fd: Fd) -> KResult<Arc<OpenFile>> {
        let slots = self.slots.read();
        let idx = Self::index(fd, slots.len())?;
        slots[idx]
            .as_ref()
            .map(|file| file.file().clone())
            .ok_or(KError::BadFileDescriptor)
    }

    /// Whether `fd` is in range and occupied.
    pub fn is_valid(&self, fd: Fd) -> bool {
        let slots = self.slots.read();
        Self::index(fd, slots.len()).is_ok_and(|idx| slots[idx].is_some())
    }

    /// Number of occupied slots.
    pub fn count(&self) -> usize {
        self.slots.read().iter().filter(|slot| slot.is_some()).count()
    }

    /// Empties every slot, releasing the shares after the lock is dropped.
    /// Returns how many slots were occupied.
    pub fn close_all(&self) -> usize {
        let taken: Vec<FileRef> = self
            .slots
            .write()
            .iter_mut()
            .filter_map(Option::take)
            .collect();
        let n = taken.len();
        drop(taken);
        n
    }
}

impl Default for FdTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FdTable {
    fn drop(&mut self) {
        let n = self.close_all();
        if n > 0 {
            debug!("descriptor table dropped, released {n} open files");
        }
    }
}
