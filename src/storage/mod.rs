//! Storage Module
//!
//! Random-access byte reads over the database file.
//!
//! ## Responsibilities
//! - Positioned, bounds-checked reads of any length at any offset
//! - Own the underlying resource (mapping / file handle) and release it once
//! - Expose a borrowed view when the bytes are already memory-resident
//!
//! ## Backends
//! ```text
//! ┌──────────────────┬────────────────────────────────────────────┐
//! │ MmapStorage      │ whole-file read-only memory map            │
//! │ FileStorage      │ pread / seek_read on an open File          │
//! │ SeekStorage<R>   │ any Read + Seek, cursor behind a Mutex      │
//! │ [u8] / Vec<u8>   │ in-memory bytes                            │
//! └──────────────────┴────────────────────────────────────────────┘
//! ```
//!
//! Every read is `&self`. Independent lookups may share one storage across
//! threads whenever the backend is `Sync`.

mod file;
mod memory;
mod mmap;
mod seek;

use std::fs::File;
use std::path::Path;

use crate::config::StorageBackend;
use crate::error::{CdbError, Result};

pub use file::FileStorage;
pub use mmap::MmapStorage;
pub use seek::SeekStorage;

/// Read contract the lookup engine relies on
pub trait Storage {
    /// Fill `buf` completely with the bytes starting at `offset`.
    ///
    /// Fails with [`CdbError::OutOfRange`] when the range extends past
    /// [`size`](Self::size), or with [`CdbError::Io`] when the OS read fails.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()>;

    /// Total number of readable bytes
    fn size(&self) -> u64;

    /// The whole content, when it is addressable without copying
    fn as_bytes(&self) -> Option<&[u8]> {
        None
    }
}

/// Bounds check shared by every backend
pub(crate) fn check_range(offset: u64, len: usize, size: u64) -> Result<()> {
    let len = len as u64;
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => {
            tracing::warn!(offset, len, size, "read past end of storage");
            Err(CdbError::OutOfRange { offset, len, size })
        }
    }
}

// =============================================================================
// Backend selected by configuration
// =============================================================================

/// Storage chosen at open time from [`StorageBackend`]
#[derive(Debug)]
pub enum Backend {
    Mmap(MmapStorage),
    File(FileStorage),
}

impl Backend {
    /// Open `path` read-only with the requested strategy
    pub fn open(path: &Path, backend: StorageBackend) -> Result<Self> {
        let file = File::open(path)?;
        Ok(match backend {
            StorageBackend::Mmap => Backend::Mmap(MmapStorage::new(&file)?),
            StorageBackend::File => Backend::File(FileStorage::new(file)?),
        })
    }

    /// Which strategy backs this storage
    pub fn kind(&self) -> StorageBackend {
        match self {
            Backend::Mmap(_) => StorageBackend::Mmap,
            Backend::File(_) => StorageBackend::File,
        }
    }
}

impl Storage for Backend {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        match self {
            Backend::Mmap(s) => s.read_at(buf, offset),
            Backend::File(s) => s.read_at(buf, offset),
        }
    }

    fn size(&self) -> u64 {
        match self {
            Backend::Mmap(s) => s.size(),
            Backend::File(s) => s.size(),
        }
    }

    fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Backend::Mmap(s) => s.as_bytes(),
            Backend::File(s) => s.as_bytes(),
        }
    }
}
