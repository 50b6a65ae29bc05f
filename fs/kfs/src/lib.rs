// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Storage layer consumed by the file syscalls.
//!
//! The syscall layer only sees two traits: [`FilesystemOps`], which turns a
//! path plus open flags into a file object, and [`FileNodeOps`], which moves
//! bytes at an offset. [`RamFs`] and the devices in [`dev`] are the in-kernel
//! implementations.
#![cfg_attr(all(not(test), not(doc)), no_std)]
#![allow(clippy::new_ret_no_self)]

extern crate alloc;

#[macro_use]
extern crate log;

pub mod dev;
mod flags;
mod node;
mod ramfs;

mod test_flags;

pub use flags::{AccessMode, OpenFlags};
pub use node::{FileNodeOps, FilesystemOps, NodeRef};
pub use ramfs::{MAX_FILE_SIZE, RamFs};
