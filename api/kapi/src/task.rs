// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! File state of a process.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use kerrno::KResult;
use kfs::{FilesystemOps, OpenFlags};

use crate::{
    config::CONSOLE_PATH,
    file::{FdTable, OpenFile},
};

/// A process ID.
pub type Pid = u32;

/// The parts of a process the file syscalls touch. Shared by all of its
/// threads.
pub struct Process {
    pid: Pid,
    fs: Arc<dyn FilesystemOps>,
    fd_table: FdTable,
    exited: AtomicBool,
}

impl Process {
    /// Creates a process with an empty descriptor table.
    pub fn new(pid: Pid, fs: Arc<dyn FilesystemOps>) -> Arc<Self> {
        Self::with_table(pid, fs, FdTable::new())
    }

    /// Creates a process around an existing (usually empty) table.
    pub fn with_table(pid: Pid, fs: Arc<dyn FilesystemOps>, fd_table: FdTable) -> Arc<Self> {
        debug!("process {pid}: created on {}", fs.name());
        Arc::new(Self {
            pid,
            fs,
            fd_table,
            exited: AtomicBool::new(false),
        })
    }

    /// Creates a process whose descriptors 0, 1 and 2 are the console:
    /// read-only, write-only and write-only.
    pub fn new_with_stdio(pid: Pid, fs: Arc<dyn FilesystemOps>) -> KResult<Arc<Self>> {
        let proc = Self::new(pid, fs);
        for flags in [OpenFlags::RDONLY, OpenFlags::WRONLY, OpenFlags::WRONLY] {
            let file = OpenFile::open(proc.fs(), CONSOLE_PATH, flags, 0)?;
            proc.fd_table.place(file.acquire())?;
        }
        Ok(proc)
    }

    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[inline]
    pub fn fs(&self) -> &dyn FilesystemOps {
        &*self.fs
    }

    #[inline]
    pub fn fd_table(&self) -> &FdTable {
        &self.fd_table
    }

    /// Tears down the descriptor table. Every occupied slot gives back its
    /// share; files no other table holds are destroyed.
    pub fn exit(&self) {
        if self.exited.swap(true, Ordering::AcqRel) {
            return;
        }
        let n = self.fd_table.close_all();
        info!("process {}: exited, closed {n} descriptors", self.pid);
    }

    pub fn has_exited(&self) -> bool {
        self.exited.load(Ordering::Acquire)
    }
}
