// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! File I/O for user processes: open file handles, per-process descriptor
//! tables and the syscalls built on them.
#![cfg_attr(all(not(test), not(doc)), no_std)]
#![allow(rustdoc::broken_intra_doc_links)]

extern crate alloc;

#[macro_use]
extern crate log;

pub mod config;
pub mod file;
pub mod mm;
pub mod syscall;
pub mod task;

mod test_fd_table;
mod test_file;
mod test_mm;

/// Installs the kernel logger at `level` (see [`config::DEFAULT_LOG_LEVEL`]).
pub fn init(level: &str) {
    klogger::init_klogger();
    klogger::set_log_level(level);
    info!("kapi: file syscalls ready, {} descriptors per process", config::OPEN_MAX);
}
