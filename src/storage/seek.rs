//! Storage over any seekable reader
//!
//! `Read + Seek` sources share a single cursor, so each read seeks and reads
//! under a lock.

use std::io::{Read, Seek, SeekFrom};

use parking_lot::Mutex;

use crate::error::Result;

use super::{check_range, Storage};

/// Adapter turning a `Read + Seek` source into positioned reads
pub struct SeekStorage<R> {
    inner: Mutex<R>,
    size: u64,
}

impl<R: Read + Seek> SeekStorage<R> {
    /// Wrap `reader`, measuring its length once
    pub fn new(mut reader: R) -> Result<Self> {
        let size = reader.seek(SeekFrom::End(0))?;
        Ok(Self {
            inner: Mutex::new(reader),
            size,
        })
    }

    /// Give back the wrapped reader
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Read + Seek> Storage for SeekStorage<R> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        check_range(offset, buf.len(), self.size)?;
        let mut reader = self.inner.lock();
        reader.seek(SeekFrom::Start(offset))?;
        reader.read_exact(buf)?;
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }
}
