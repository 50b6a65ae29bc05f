//! In-memory filesystem.
//!
//! A flat namespace of regular files and mounted devices. Leading slashes
//! are ignored, so `/a` and `a` name the same entry.

use alloc::{
    collections::btree_map::{BTreeMap, Entry},
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};
use core::sync::atomic::{AtomicUsize, Ordering};

use kerrno::{KError, KResult};
use spin::{Mutex, RwLock};

use crate::{FileNodeOps, FilesystemOps, NodeRef, OpenFlags};

/// Largest size a regular file may grow to. Writes that would end past it
/// fail with [`KError::NoSpace`].
pub const MAX_FILE_SIZE: u64 = 64 << 20;

/// Backing store of one regular file.
struct RamFile {
    data: RwLock<Vec<u8>>,
    mode: u32,
    opens: AtomicUsize,
}

impl RamFile {
    fn new(data: Vec<u8>, mode: u32) -> Arc<Self> {
        Arc::new(Self {
            data: RwLock::new(data),
            mode,
            opens: AtomicUsize::new(0),
        })
    }
}

/// One open of a [`RamFile`]; counts towards [`RamFs::open_count`] until
/// dropped.
struct RamFileRef {
    file: Arc<RamFile>,
}

impl RamFileRef {
    fn new(file: Arc<RamFile>) -> Self {
        file.opens.fetch_add(1, Ordering::AcqRel);
        Self { file }
    }
}

impl Drop for RamFileRef {
    fn drop(&mut self) {
        self.file.opens.fetch_sub(1, Ordering::AcqRel);
    }
}

impl FileNodeOps for RamFileRef {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> KResult<(usize, u64)> {
        let data = self.file.data.read();
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        if start >= data.len() {
            return Ok((0, offset));
        }
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok((n, offset + n as u64))
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> KResult<(usize, u64)> {
        if buf.is_empty() {
            return Ok((0, offset));
        }
        let end = offset
            .checked_add(buf.len() as u64)
            .filter(|&end| end <= MAX_FILE_SIZE)
            .ok_or(KError::NoSpace)?;
        // Both fit in usize: bounded by MAX_FILE_SIZE.
        let (start, end) = (offset as usize, end as usize);
        let mut data = self.file.data.write();
        if data.len() < end {
            let additional = end - data.len();
            data.try_reserve(additional).map_err(|_| {
                warn!("ramfs: cannot grow file to {end} bytes");
                KError::NoSpace
            })?;
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        Ok((buf.len(), end as u64))
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn len(&self) -> KResult<u64> {
        Ok(self.file.data.read().len() as u64)
    }
}

#[derive(Clone)]
enum RamEntry {
    File(Arc<RamFile>),
    Device(NodeRef),
}

/// In-memory filesystem with device mount points.
pub struct RamFs {
    entries: Mutex<BTreeMap<String, RamEntry>>,
}

impl RamFs {
    /// Creates an empty filesystem.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(BTreeMap::new()),
        })
    }

    fn key(path: &str) -> KResult<&str> {
        let key = path.trim_start_matches('/');
        if key.is_empty() {
            return Err(KError::InvalidInput);
        }
        Ok(key)
    }

    /// Makes `dev` reachable under `name` (e.g. `"con:"`).
    pub fn mount_device(&self, name: &str, dev: NodeRef) -> KResult<()> {
        let key = Self::key(name)?;
        match self.entries.lock().entry(key.to_string()) {
            Entry::Occupied(_) => Err(KError::AlreadyExists),
            Entry::Vacant(slot) => {
                debug!("ramfs: mounted device at {key}");
                slot.insert(RamEntry::Device(dev));
                Ok(())
            }
        }
    }

    /// Creates or replaces a regular file with `data`.
    pub fn insert(&self, path: &str, data: &[u8]) -> KResult<()> {
        let key = Self::key(path)?;
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(RamEntry::File(file)) => {
                *file.data.write() = data.to_vec();
            }
            Some(RamEntry::Device(_)) => return Err(KError::AlreadyExists),
            None => {
                entries.insert(key.to_string(), RamEntry::File(RamFile::new(data.to_vec(), 0o664)));
            }
        }
        Ok(())
    }

    /// Returns a copy of a regular file's contents.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        let key = Self::key(path).ok()?;
        match self.entries.lock().get(key)? {
            RamEntry::File(file) => Some(file.data.read().clone()),
            RamEntry::Device(_) => None,
        }
    }

    pub fn exists(&self, path: &str) -> bool {
        Self::key(path).is_ok_and(|key| self.entries.lock().contains_key(key))
    }

    /// Permission bits a regular file was created with.
    pub fn file_mode(&self, path: &str) -> Option<u32> {
        let key = Self::key(path).ok()?;
        match self.entries.lock().get(key)? {
            RamEntry::File(file) => Some(file.mode),
            RamEntry::Device(_) => None,
        }
    }

    /// Number of live object references to a regular file.
    pub fn open_count(&self, path: &str) -> Option<usize> {
        let key = Self::key(path).ok()?;
        match self.entries.lock().get(key)? {
            RamEntry::File(file) => Some(file.opens.load(Ordering::Acquire)),
            RamEntry::Device(_) => None,
        }
    }
}

impl FilesystemOps for RamFs {
    fn name(&self) -> &str {
        "ramfs"
    }

    fn resolve_or_create(&self, path: &str, flags: OpenFlags, mode: u32) -> KResult<NodeRef> {
        let key = Self::key(path)?;
        let mut entries = self.entries.lock();

        let entry = match entries.get(key) {
            Some(_) if flags.contains(OpenFlags::CREAT | OpenFlags::EXCL) => {
                return Err(KError::AlreadyExists);
            }
            Some(entry) => entry.clone(),
            None if flags.contains(OpenFlags::CREAT) => {
                trace!("ramfs: create {key} mode {mode:#o}");
                let entry = RamEntry::File(RamFile::new(Vec::new(), mode));
                entries.insert(key.to_string(), entry.clone());
                entry
            }
            None => return Err(KError::NotFound),
        };
        drop(entries);

        match entry {
            RamEntry::File(file) => {
                if flags.contains(OpenFlags::TRUNC) && flags.access_mode().writable() {
                    file.data.write().clear();
                }
                Ok(Arc::new(RamFileRef::new(file)))
            }
            RamEntry::Device(dev) => Ok(dev),
        }
    }
}
