// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! `meld`: interleave two files into a new one.
//!
//! Built only from the open/read/write/close primitives. Chunks of
//! [`MELD_CHUNK_SIZE`] bytes are taken from the first source, then the
//! second, in turn. Melding stops as soon as a source has nothing left on its
//! turn; whatever the other source still holds is not copied. A short final
//! chunk is written as is, without padding.

use core::ffi::c_char;

use kerrno::{KError, KResult};
use kfs::OpenFlags;

use super::{close_file, open_file, read_file, write_file};
use crate::{
    config::{MELD_CHUNK_SIZE, MELD_OUTPUT_MODE},
    file::Fd,
    mm::UserConstPtr,
    task::Process,
};

/// A descriptor opened by `meld`, closed on drop unless closed explicitly.
struct MeldFd<'a> {
    proc: &'a Process,
    fd: Option<Fd>,
}

impl<'a> MeldFd<'a> {
    fn open(proc: &'a Process, path: &str, flags: OpenFlags, mode: u32) -> KResult<Self> {
        let fd = open_file(proc, path, flags, mode)?;
        Ok(Self { proc, fd: Some(fd) })
    }

    fn fd(&self) -> KResult<Fd> {
        self.fd.ok_or(KError::BadFileDescriptor)
    }

    fn close(mut self) -> KResult<()> {
        match self.fd.take() {
            Some(fd) => close_file(self.proc, fd),
            None => Ok(()),
        }
    }
}

impl Drop for MeldFd<'_> {
    fn drop(&mut self) {
        if let Some(fd) = self.fd.take() {
            if let Err(err) = close_file(self.proc, fd) {
                warn!("meld: failed to close fd {fd} on error path: {err}");
            }
        }
    }
}

fn write_all(proc: &Process, fd: Fd, mut buf: &[u8]) -> KResult<()> {
    while !buf.is_empty() {
        match write_file(proc, fd, buf)? {
            0 => return Err(KError::Io),
            n => buf = &buf[n..],
        }
    }
    Ok(())
}

/// Melds `path1` and `path2` into the new file `path3`.
///
/// `path3` must not exist. On any failure every descriptor opened here is
/// closed before returning. Returns the number of bytes written.
///
/// The output is only created once the table has a free slot for it. A
/// concurrent open that takes that slot first still leaves an empty `path3`
/// behind.
pub fn meld(proc: &Process, path1: &str, path2: &str, path3: &str) -> KResult<usize> {
    let table = proc.fd_table();
    let src1 = MeldFd::open(proc, path1, OpenFlags::RDONLY, 0)?;
    let src2 = MeldFd::open(proc, path2, OpenFlags::RDONLY, 0)?;
    if table.count() >= table.capacity() {
        warn!("meld: no descriptor left for {path3:?}, not creating it");
        return Err(KError::TooManyOpenFiles);
    }
    let dst = MeldFd::open(
        proc,
        path3,
        OpenFlags::WRONLY | OpenFlags::CREAT | OpenFlags::EXCL,
        MELD_OUTPUT_MODE,
    )?;

    table.get(src1.fd()?)?.access_mode().check_read()?;
    table.get(src2.fd()?)?.access_mode().check_read()?;
    table.get(dst.fd()?)?.access_mode().check_write()?;

    let mut chunk = [0u8; MELD_CHUNK_SIZE];
    let mut written = 0;
    'meld: loop {
        for src in [&src1, &src2] {
            let n = read_file(proc, src.fd()?, &mut chunk)?;
            if n == 0 {
                break 'meld;
            }
            write_all(proc, dst.fd()?, &chunk[..n])?;
            written += n;
        }
    }
    trace!("meld: {path1:?} + {path2:?} -> {path3:?}, {written} bytes");

    src1.close()?;
    src2.close()?;
    dst.close()?;
    Ok(written)
}

/// Combine the contents of two files chunk by chunk into a new file.
pub fn sys_meld(
    proc: &Process,
    path1: UserConstPtr<c_char>,
    path2: UserConstPtr<c_char>,
    path3: UserConstPtr<c_char>,
) -> KResult<isize> {
    let path1 = path1.get_as_str()?;
    let path2 = path2.get_as_str()?;
    let path3 = path3.get_as_str()?;
    debug!("sys_meld <= {path1:?} {path2:?} {path3:?}");
    meld(proc, &path1, &path2, &path3)?;
    Ok(0)
}
