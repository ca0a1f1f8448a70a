//! Value Reader
//!
//! Streams one record's value through `std::io::Read`, confined to the
//! value's byte range.

use std::io::{self, Read, Seek, SeekFrom};

use crate::storage::Storage;

use super::RecordView;

/// `Read + Seek` over the bytes of a single value
pub struct ValueReader<'a, S> {
    storage: &'a S,
    start: u64,
    len: u64,
    pos: u64,
}

impl<'a, S: Storage> ValueReader<'a, S> {
    pub(super) fn new(storage: &'a S, view: RecordView) -> Self {
        Self {
            storage,
            start: u64::from(view.position()),
            len: u64::from(view.len()),
            pos: 0,
        }
    }

    /// Value length in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes left before the end of the value
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.pos)
    }
}

impl<'a, S: Storage> Read for ValueReader<'a, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = (buf.len() as u64).min(self.remaining()) as usize;
        if n == 0 {
            return Ok(0);
        }
        self.storage.read_at(&mut buf[..n], self.start + self.pos)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<'a, S: Storage> Seek for ValueReader<'a, S> {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let (base, offset) = match target {
            SeekFrom::Start(n) => {
                self.pos = n;
                return Ok(n);
            }
            SeekFrom::End(n) => (self.len, n),
            SeekFrom::Current(n) => (self.pos, n),
        };

        match base.checked_add_signed(offset) {
            Some(pos) => {
                self.pos = pos;
                Ok(pos)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}
