// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! File system related syscalls.
//!
//! This module implements:
//! - Descriptor operations (open, close)
//! - File I/O (read, write, lseek)
//! - Composite operations built on the above (meld)
//!
//! Each `sys_*` entry point copies its user arguments in and calls the
//! kernel-side function of the same operation (`open_file`, `read_file`,
//! ...), which works on kernel strings and buffers.

mod fd_ops;
mod io;
mod meld;

pub use self::{fd_ops::*, io::*, meld::*};
