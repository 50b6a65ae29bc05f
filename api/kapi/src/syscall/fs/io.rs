// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! File I/O syscalls.
//!
//! The file is looked up under the table lock, which is released before the
//! transfer takes the file's offset lock; the two are never nested.

use kerrno::{KError, KResult};

use crate::{
    file::{Fd, SeekFrom},
    mm::{UserConstPtr, UserMutPtr},
    task::Process,
};

/// Reads from `fd` at its cursor into `buf`.
pub fn read_file(proc: &Process, fd: Fd, buf: &mut [u8]) -> KResult<usize> {
    proc.fd_table().get(fd)?.read(buf)
}

/// Writes `buf` to `fd` at its cursor.
pub fn write_file(proc: &Process, fd: Fd, buf: &[u8]) -> KResult<usize> {
    proc.fd_table().get(fd)?.write(buf)
}

/// Read data from the file indicated by `fd`.
///
/// Return the read size if success.
pub fn sys_read(proc: &Process, fd: Fd, buf: UserMutPtr<u8>, len: usize) -> KResult<isize> {
    debug!("sys_read <= fd: {fd}, buf: {:#x}, len: {len}", buf.address());
    let file = proc.fd_table().get(fd)?;
    // A mode mismatch wins over a bad buffer.
    file.access_mode().check_read()?;
    let buf = buf.get_as_mut_slice(len)?;
    Ok(file.read(buf)? as _)
}

/// Write data to the file indicated by `fd`.
///
/// Return the written size if success.
pub fn sys_write(proc: &Process, fd: Fd, buf: UserConstPtr<u8>, len: usize) -> KResult<isize> {
    debug!("sys_write <= fd: {fd}, buf: {:#x}, len: {len}", buf.address());
    let file = proc.fd_table().get(fd)?;
    file.access_mode().check_write()?;
    let buf = buf.get_as_slice(len)?;
    Ok(file.write(buf)? as _)
}

/// Repositions the read/write file offset.
pub fn sys_lseek(proc: &Process, fd: Fd, offset: i64, whence: i32) -> KResult<isize> {
    debug!("sys_lseek <= {fd} {offset} {whence}");
    let file = proc.fd_table().get(fd)?;
    let pos = match whence {
        0 => SeekFrom::Start(u64::try_from(offset).map_err(|_| KError::InvalidInput)?),
        1 => SeekFrom::Current(offset),
        2 => SeekFrom::End(offset),
        _ => return Err(KError::InvalidInput),
    };
    let off = file.seek(pos)?;
    isize::try_from(off).map_err(|_| KError::InvalidInput)
}
