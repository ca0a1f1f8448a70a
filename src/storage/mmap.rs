//! Memory-mapped storage
//!
//! Maps the whole file read-only. The mapping is released when the storage
//! is dropped.

use std::fs::File;

use memmap2::Mmap;

use crate::error::Result;

use super::{check_range, Storage};

/// Read-only memory map of a database file
#[derive(Debug)]
pub struct MmapStorage {
    mmap: Mmap,
}

impl MmapStorage {
    /// Map `file` into memory
    ///
    /// The file must not be modified while mapped; cdb files are immutable
    /// once built.
    pub fn new(file: &File) -> Result<Self> {
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self { mmap })
    }
}

impl Storage for MmapStorage {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        check_range(offset, buf.len(), self.size())?;
        let start = offset as usize;
        buf.copy_from_slice(&self.mmap[start..start + buf.len()]);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.mmap.len() as u64
    }

    fn as_bytes(&self) -> Option<&[u8]> {
        Some(&self.mmap[..])
    }
}
