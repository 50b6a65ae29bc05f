// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Open file handles.
//!
//! An [`OpenFile`] is one successful open of a file object: its access mode,
//! its cursor and the lock guarding that cursor. Descriptor-table slots hold
//! it through [`FileRef`] shares; the share count is the handle's refcount and
//! the handle is released once the last share is gone.

mod fd_table;

use alloc::sync::Arc;
use core::sync::atomic::{AtomicUsize, Ordering};

use kerrno::{KError, KResult};
use kfs::{AccessMode, FilesystemOps, NodeRef, OpenFlags};
use spin::Mutex;

pub use self::fd_table::{Fd, FdTable};

/// Target position for [`OpenFile::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekFrom {
    Start(u64),
    Current(i64),
    End(i64),
}

/// Kernel object for one opened instance of a file.
pub struct OpenFile {
    node: NodeRef,
    mode: AccessMode,
    append: bool,
    /// Cursor. Only used, and only locked, when `node` is seekable.
    offset: Mutex<u64>,
    /// Descriptor slots currently holding a share of this file.
    refcount: AtomicUsize,
}

impl OpenFile {
    /// Wraps an object returned by the storage layer. The new handle has no
    /// shares yet and its cursor is at 0.
    pub fn new(node: NodeRef, flags: OpenFlags) -> Arc<Self> {
        Arc::new(Self {
            node,
            mode: flags.access_mode(),
            append: flags.contains(OpenFlags::APPEND),
            offset: Mutex::new(0),
            refcount: AtomicUsize::new(0),
        })
    }

    /// Resolves `path` on `fs` and wraps the result. Storage errors are
    /// returned unchanged and no handle is created.
    pub fn open(
        fs: &dyn FilesystemOps,
        path: &str,
        flags: OpenFlags,
        mode: u32,
    ) -> KResult<Arc<Self>> {
        let node = fs.resolve_or_create(path, flags, mode)?;
        Ok(Self::new(node, flags))
    }

    /// Takes one share of this file, incrementing its refcount.
    pub fn acquire(self: &Arc<Self>) -> FileRef {
        self.refcount.fetch_add(1, Ordering::AcqRel);
        FileRef(self.clone())
    }

    /// Number of outstanding [`FileRef`] shares.
    #[inline]
    pub fn refcount(&self) -> usize {
        self.refcount.load(Ordering::Acquire)
    }

    #[inline]
    pub fn access_mode(&self) -> AccessMode {
        self.mode
    }

    #[inline]
    pub fn is_seekable(&self) -> bool {
        self.node.is_seekable()
    }

    /// Current cursor position. Always 0 for non-seekable objects.
    pub fn offset(&self) -> u64 {
        if self.is_seekable() {
            *self.offset.lock()
        } else {
            0
        }
    }

    /// Reads into `buf` at the cursor and advances it by what was read.
    ///
    /// Returns the number of bytes read, 0 at end of file.
    pub fn read(&self, buf: &mut [u8]) -> KResult<usize> {
        self.mode.check_read()?;
        if !self.is_seekable() {
            return self.node.read_at(0, buf).map(|(n, _)| n);
        }
        let mut offset = self.offset.lock();
        let (n, new_offset) = self.node.read_at(*offset, buf)?;
        *offset = new_offset;
        Ok(n)
    }

    /// Writes `buf` at the cursor (or at the end, for append handles) and
    /// advances it by what was written.
    pub fn write(&self, buf: &[u8]) -> KResult<usize> {
        self.mode.check_write()?;
        if !self.is_seekable() {
            return self.node.write_at(0, buf).map(|(n, _)| n);
        }
        let mut offset = self.offset.lock();
        if self.append {
            *offset = self.node.len()?;
        }
        let (n, new_offset) = self.node.write_at(*offset, buf)?;
        *offset = new_offset;
        Ok(n)
    }

    /// Moves the cursor and returns the new position.
    ///
    /// A position below 0 or above `isize::MAX` fails with
    /// [`KError::InvalidInput`] and leaves the cursor where it was.
    pub fn seek(&self, pos: SeekFrom) -> KResult<u64> {
        if !self.is_seekable() {
            return Err(KError::IllegalSeek);
        }
        let mut offset = self.offset.lock();
        let new_offset = match pos {
            SeekFrom::Start(pos) => Some(pos),
            SeekFrom::Current(delta) => offset.checked_add_signed(delta),
            SeekFrom::End(delta) => self.node.len()?.checked_add_signed(delta),
        }
        .filter(|&pos| pos <= isize::MAX as u64)
        .ok_or(KError::InvalidInput)?;
        *offset = new_offset;
        Ok(new_offset)
    }
}

impl Drop for OpenFile {
    fn drop(&mut self) {
        debug!("open file destroyed (mode {:?})", self.mode);
    }
}

/// One share of an [`OpenFile`], as held by a descriptor-table slot.
///
/// Dropping a share decrements the refcount; releasing is therefore done
/// exactly once per [`OpenFile::acquire`]. Cloning takes a new share.
pub struct FileRef(Arc<OpenFile>);

impl FileRef {
    #[inline]
    pub fn file(&self) -> &Arc<OpenFile> {
        &self.0
    }

    /// Gives the share back.
    pub fn release(self) {
        drop(self);
    }
}

impl Clone for FileRef {
    fn clone(&self) -> Self {
        self.0.acquire()
    }
}

impl Drop for FileRef {
    fn drop(&mut self) {
        let prev = self.0.refcount.fetch_sub(1, Ordering::AcqRel);
        assert!(prev > 0, "open file refcount underflow");
        if prev == 1 {
            trace!("last share of open file released");
        }
    }
}

impl core::fmt::Debug for OpenFile {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OpenFile")
            .field("mode", &self.mode)
            .field("append", &self.append)
            .field("seekable", &self.is_seekable())
            .field("refcount", &self.refcount())
            .finish()
    }
}

impl core::fmt::Debug for FileRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("FileRef").field(&self.0).finish()
    }
}
