// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Kernel file I/O configuration.

/// Descriptor slots per process.
pub const OPEN_MAX: usize = 128;

/// Longest path copied in from user space, including the terminating NUL.
pub const PATH_MAX: usize = 1024;

/// Bytes taken from each source per turn of `meld`.
pub const MELD_CHUNK_SIZE: usize = 4;

/// Device opened on the standard descriptors of a new process.
pub const CONSOLE_PATH: &str = "con:";

/// Permission bits of the file created by `meld`.
pub const MELD_OUTPUT_MODE: u32 = 0o664;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Addresses below this are never valid user pointers.
pub const USER_SPACE_BASE: usize = 0x1000;
