//! Character devices.
//!
//! Devices have no cursor: every transfer ignores the offset it is given
//! and reports the offset back unchanged.

use alloc::{collections::VecDeque, sync::Arc, vec::Vec};

use kerrno::KResult;
use spin::Mutex;

use crate::FileNodeOps;

/// Reads hit end-of-file immediately; writes are accepted and discarded.
pub struct NullDev;

impl FileNodeOps for NullDev {
    fn read_at(&self, offset: u64, _buf: &mut [u8]) -> KResult<(usize, u64)> {
        Ok((0, offset))
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> KResult<(usize, u64)> {
        Ok((buf.len(), offset))
    }

    fn is_seekable(&self) -> bool {
        false
    }
}

/// Console backed by an input queue and a captured output buffer.
///
/// A read returns whatever input is queued (possibly nothing) without
/// blocking.
#[derive(Default)]
pub struct ConsoleDev {
    input: Mutex<VecDeque<u8>>,
    output: Mutex<Vec<u8>>,
}

impl ConsoleDev {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues bytes as if they were typed.
    pub fn push_input(&self, bytes: &[u8]) {
        self.input.lock().extend(bytes);
    }

    /// Drains and returns everything written so far.
    pub fn take_output(&self) -> Vec<u8> {
        core::mem::take(&mut *self.output.lock())
    }
}

impl FileNodeOps for ConsoleDev {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> KResult<(usize, u64)> {
        let mut input = self.input.lock();
        let n = buf.len().min(input.len());
        for (dst, src) in buf.iter_mut().zip(input.drain(..n)) {
            *dst = src;
        }
        Ok((n, offset))
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> KResult<(usize, u64)> {
        self.output.lock().extend_from_slice(buf);
        Ok((buf.len(), offset))
    }

    fn is_seekable(&self) -> bool {
        false
    }
}
