// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Syscall numbers and dispatch.

pub mod fs;

use kerrno::{KError, KResult};
use strum::{FromRepr, IntoStaticStr};

pub use self::fs::*;
use crate::task::Process;

/// Syscall numbers handled by this crate.
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Sysno {
    Read  = 0,
    Write = 1,
    Open  = 2,
    Close = 3,
    Lseek = 8,
    Meld  = 460,
}

fn dispatch(proc: &Process, sysno: Sysno, args: [usize; 6]) -> KResult<isize> {
    match sysno {
        Sysno::Read => sys_read(proc, args[0] as _, args[1].into(), args[2]),
        Sysno::Write => sys_write(proc, args[0] as _, args[1].into(), args[2]),
        Sysno::Open => sys_open(proc, args[0].into(), args[1] as _, args[2] as _),
        Sysno::Close => sys_close(proc, args[0] as _),
        Sysno::Lseek => sys_lseek(proc, args[0] as _, args[1] as _, args[2] as _),
        Sysno::Meld => sys_meld(proc, args[0].into(), args[1].into(), args[2].into()),
    }
}

/// Runs syscall `sysno` for `proc`.
///
/// Returns the non-negative result, or the negated [`KError::code`].
pub fn handle_syscall(proc: &Process, sysno: usize, args: [usize; 6]) -> isize {
    let result = match Sysno::from_repr(sysno) {
        Some(sysno) => {
            let name: &'static str = sysno.into();
            trace!("pid {} syscall {name} <= {args:x?}", proc.pid());
            dispatch(proc, sysno, args)
        }
        None => {
            warn!("pid {}: unimplemented syscall {sysno}", proc.pid());
            Err(KError::Unsupported)
        }
    };
    match result {
        Ok(ret) => ret,
        Err(err) => {
            debug!("pid {} syscall {sysno} failed: {err:?}", proc.pid());
            -(err.code() as isize)
        }
    }
}
