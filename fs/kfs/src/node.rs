//! Storage traits.

use alloc::sync::Arc;

use kerrno::KResult;

use crate::OpenFlags;

/// A file object produced by [`FilesystemOps::resolve_or_create`].
///
/// Dropping the last reference releases the object.
pub type NodeRef = Arc<dyn FileNodeOps>;

/// Byte-level access to one file object.
///
/// Both transfer methods return `(bytes_moved, new_offset)`. Short
/// transfers are not errors; a read at or past the end returns zero bytes.
/// Non-seekable objects ignore `offset`.
pub trait FileNodeOps: Send + Sync {
    /// Reads up to `buf.len()` bytes starting at `offset`.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> KResult<(usize, u64)>;

    /// Writes up to `buf.len()` bytes starting at `offset`.
    fn write_at(&self, offset: u64, buf: &[u8]) -> KResult<(usize, u64)>;

    /// Whether the object has a meaningful cursor.
    fn is_seekable(&self) -> bool;

    /// Current size in bytes. Devices report zero.
    fn len(&self) -> KResult<u64> {
        Ok(0)
    }
}

/// Path resolution and object creation.
pub trait FilesystemOps: Send + Sync {
    /// Gets the name of the filesystem
    fn name(&self) -> &str;

    /// Resolves `path`, creating it when `flags` ask for it.
    ///
    /// `mode` is the permission of a newly created object.
    fn resolve_or_create(&self, path: &str, flags: OpenFlags, mode: u32) -> KResult<NodeRef>;
}
