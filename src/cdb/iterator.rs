//! cdb Iterators
//!
//! `FindIter` walks every record under one key; `RecordIter` scans the whole
//! record area in file order.

use crate::error::{CdbError, Result};
use crate::storage::Storage;

use super::{Cdb, Context, RecordView, HEADER_SIZE, PAIR_SIZE};

/// Iterator over all records stored under one key
///
/// Owns its [`Context`]. Stops after the first error.
pub struct FindIter<'a, S> {
    cdb: &'a Cdb<S>,
    key: &'a [u8],
    ctx: Context,
    done: bool,
}

impl<'a, S: Storage> FindIter<'a, S> {
    pub(super) fn new(cdb: &'a Cdb<S>, key: &'a [u8], mut ctx: Context) -> Self {
        cdb.find_start(&mut ctx);
        Self {
            cdb,
            key,
            ctx,
            done: false,
        }
    }

    /// Probe state after the last yielded record
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Stop iterating and hand back the context, e.g. to snapshot it
    pub fn into_context(self) -> Context {
        self.ctx
    }
}

impl<'a, S: Storage> Iterator for FindIter<'a, S> {
    type Item = Result<RecordView>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.cdb.find_next(self.key, &mut self.ctx) {
            Ok(Some(view)) => Some(Ok(view)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Sequential iterator over every `(key, value)` record
pub struct RecordIter<'a, S> {
    cdb: &'a Cdb<S>,
    /// Stop reading when we reach this offset (start of the slot tables)
    end_offset: u64,
    /// Current position in file
    current_offset: u64,
}

impl<'a, S: Storage> RecordIter<'a, S> {
    pub(super) fn new(cdb: &'a Cdb<S>, end_offset: u32) -> Self {
        Self {
            cdb,
            end_offset: u64::from(end_offset),
            current_offset: u64::from(HEADER_SIZE),
        }
    }

    fn read_record(&mut self) -> Result<(Vec<u8>, Vec<u8>)> {
        let (klen, dlen) = self.cdb.read_pair(self.current_offset)?;
        let entry_size = u64::from(PAIR_SIZE) + u64::from(klen) + u64::from(dlen);

        // A record may not run into the slot tables
        if self.current_offset + entry_size > self.end_offset {
            return Err(CdbError::OutOfRange {
                offset: self.current_offset,
                len: entry_size,
                size: self.end_offset,
            });
        }

        let key_pos = self.current_offset + u64::from(PAIR_SIZE);
        let mut key = vec![0u8; klen as usize];
        self.cdb.storage().read_at(&mut key, key_pos)?;

        let mut value = vec![0u8; dlen as usize];
        self.cdb.storage().read_at(&mut value, key_pos + u64::from(klen))?;

        self.current_offset += entry_size;
        Ok((key, value))
    }
}

impl<'a, S: Storage> Iterator for RecordIter<'a, S> {
    type Item = Result<(Vec<u8>, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_offset >= self.end_offset {
            return None;
        }

        match self.read_record() {
            Ok(record) => Some(Ok(record)),
            Err(e) => {
                // Never resume past a corrupt record
                self.current_offset = self.end_offset;
                Some(Err(e))
            }
        }
    }
}
