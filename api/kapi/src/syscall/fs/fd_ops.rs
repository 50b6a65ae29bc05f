// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Descriptor syscalls: open and close.

use core::ffi::c_char;

use kerrno::{KError, KResult};
use kfs::OpenFlags;

use crate::{
    file::{Fd, OpenFile},
    mm::UserConstPtr,
    task::Process,
};

/// Opens `path` and installs the new file in the lowest free descriptor.
///
/// If the table is full the freshly opened file is released again and
/// [`KError::TooManyOpenFiles`] is returned.
pub fn open_file(proc: &Process, path: &str, flags: OpenFlags, mode: u32) -> KResult<Fd> {
    let file = OpenFile::open(proc.fs(), path, flags, mode)?;
    proc.fd_table().place(file.acquire())
}

/// Empties slot `fd` and releases the file it held.
pub fn close_file(proc: &Process, fd: Fd) -> KResult<()> {
    proc.fd_table()
        .replace(fd, None)?
        .ok_or(KError::NoSuchOpenFile)?
        .release();
    Ok(())
}

/// Open a file.
///
/// `flags` is checked before anything else; unknown bits fail with
/// [`KError::InvalidInput`]. Returns the new descriptor.
pub fn sys_open(
    proc: &Process,
    path: UserConstPtr<c_char>,
    flags: u32,
    mode: u32,
) -> KResult<isize> {
    let flags = OpenFlags::from_user(flags)?;
    let path = path.get_as_str()?;
    debug!("sys_open <= pid: {}, path: {path:?}, flags: {flags:?}, mode: {mode:#o}", proc.pid());
    open_file(proc, &path, flags, mode).map(|fd| fd as isize)
}

/// Close a descriptor.
pub fn sys_close(proc: &Process, fd: Fd) -> KResult<isize> {
    debug!("sys_close <= pid: {}, fd: {fd}", proc.pid());
    close_file(proc, fd)?;
    Ok(0)
}
