//! cdb Reader
//!
//! Point lookups over any [`Storage`]: hash the key, pick the slot table from
//! the header, then probe the table linearly with wraparound until the key
//! matches, an empty slot is hit, or every slot has been visited.

use std::fmt;
use std::path::Path;

use crate::config::{Config, DEFAULT_SCRATCH_SIZE};
use crate::error::{CdbError, Result};
use crate::storage::{check_range, Backend, Storage};

use super::iterator::{FindIter, RecordIter};
use super::value::ValueReader;
use super::{cdb_hash, decode_pair, Context, Header, RecordView, HEADER_SIZE, PAIR_SIZE};

/// Read-only handle to a constant database
///
/// `Cdb` keeps no per-search state: every lookup threads a caller-owned
/// [`Context`] through the probe. With a `Sync` storage one `Cdb` can serve
/// any number of threads, each using its own context.
pub struct Cdb<S> {
    storage: S,
    /// Scratch size handed to contexts from `new_context`
    scratch_size: usize,
}

impl Cdb<Backend> {
    /// Open the cdb file at `path`, memory-mapped
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(Config::builder().path(path.as_ref()).build())
    }

    /// Open a cdb file as described by `config`
    pub fn open_with(config: Config) -> Result<Self> {
        config.validate()?;
        let storage = Backend::open(&config.path, config.backend)?;

        tracing::debug!(
            path = %config.path.display(),
            size = storage.size(),
            backend = ?storage.kind(),
            "opened cdb"
        );

        Ok(Self {
            storage,
            scratch_size: config.scratch_size,
        })
    }
}

impl<S: Storage> Cdb<S> {
    /// Wrap storage that holds a cdb-format database
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            scratch_size: DEFAULT_SCRATCH_SIZE,
        }
    }

    /// Release the underlying storage
    ///
    /// Dropping the `Cdb` releases it just the same; `close` makes the point
    /// of release explicit.
    pub fn close(self) {
        tracing::debug!(size = self.storage.size(), "closing cdb");
        drop(self.storage);
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// A fresh context sized for this database's configuration
    pub fn new_context(&self) -> Context {
        Context::with_scratch(self.scratch_size)
    }

    // =========================================================================
    // Lookup Protocol
    // =========================================================================

    /// Reset `ctx` so the next step searches a new key from scratch
    pub fn find_start(&self, ctx: &mut Context) {
        ctx.reset();
        ctx.dpos = 0;
        ctx.dlen = 0;
    }

    /// Locate the first record stored under `key`
    ///
    /// Same as [`find_start`](Self::find_start) followed by
    /// [`find_next`](Self::find_next).
    pub fn find(&self, key: &[u8], ctx: &mut Context) -> Result<Option<RecordView>> {
        self.find_start(ctx);
        self.find_next(key, ctx)
    }

    /// Locate the next record stored under `key`
    ///
    /// Resumes the probe after the previous match, so repeated calls with the
    /// same key and context enumerate duplicate keys in probe order.
    /// Returns `Ok(None)` once no further record exists.
    pub fn find_next(&self, key: &[u8], ctx: &mut Context) -> Result<Option<RecordView>> {
        ctx.dpos = 0;
        ctx.dlen = 0;

        if ctx.probes == 0 {
            let hash = cdb_hash(key);
            let bucket = hash & 0xff;
            let (hpos, hslots) = self.read_pair(u64::from(bucket * PAIR_SIZE))?;
            ctx.hpos = hpos;
            ctx.hslots = hslots;
            if hslots == 0 {
                return Ok(None);
            }

            ctx.khash = hash;
            let start = (hash >> 8) % hslots;
            ctx.kpos = self.offset(u64::from(hpos) + u64::from(start) * u64::from(PAIR_SIZE))?;
            tracing::trace!(bucket, hpos, hslots, start, "probe start");
        }

        let table_end = u64::from(ctx.hpos) + u64::from(ctx.hslots) * u64::from(PAIR_SIZE);

        while ctx.probes < ctx.hslots {
            let (hash, pos) = self.read_pair(u64::from(ctx.kpos))?;
            if pos == 0 {
                return Ok(None);
            }

            ctx.probes += 1;
            let next = u64::from(ctx.kpos) + u64::from(PAIR_SIZE);
            ctx.kpos = if next >= table_end {
                ctx.hpos
            } else {
                self.offset(next)?
            };

            if hash != ctx.khash {
                continue;
            }

            let (klen, dlen) = self.read_pair(u64::from(pos))?;
            if u64::from(klen) != key.len() as u64 {
                continue;
            }

            let key_pos = u64::from(pos) + u64::from(PAIR_SIZE);
            if self.matches(key, key_pos, &mut ctx.buf)? {
                ctx.dpos = self.offset(key_pos + u64::from(klen))?;
                ctx.dlen = dlen;
                return Ok(Some(RecordView::new(ctx.dpos, ctx.dlen)));
            }
        }

        Ok(None)
    }

    /// The first value stored under `key`, materialized
    pub fn data(&self, key: &[u8], ctx: &mut Context) -> Result<Option<Vec<u8>>> {
        match self.find(key, ctx)? {
            Some(view) => Ok(Some(self.read_value(view)?)),
            None => Ok(None),
        }
    }

    /// [`data`](Self::data) with a throwaway context
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut ctx = self.new_context();
        self.data(key, &mut ctx)
    }

    /// Iterate over every record stored under `key`, in probe order
    pub fn find_all<'a>(&'a self, key: &'a [u8]) -> FindIter<'a, S> {
        FindIter::new(self, key, self.new_context())
    }

    // =========================================================================
    // Value Access
    // =========================================================================

    /// Copy the value bytes of a matched record
    pub fn read_value(&self, view: RecordView) -> Result<Vec<u8>> {
        // A corrupt length must fail here, not in the allocator
        check_range(u64::from(view.position()), view.len() as usize, self.storage.size())?;
        let mut data = vec![0u8; view.len() as usize];
        self.storage.read_at(&mut data, u64::from(view.position()))?;
        Ok(data)
    }

    /// Borrow the value bytes without copying
    ///
    /// Returns `Ok(None)` when the storage is not memory-resident.
    pub fn value_slice(&self, view: RecordView) -> Result<Option<&[u8]>> {
        let Some(bytes) = self.storage.as_bytes() else {
            return Ok(None);
        };
        let start = u64::from(view.position());
        check_range(start, view.len() as usize, bytes.len() as u64)?;
        let start = start as usize;
        Ok(Some(&bytes[start..start + view.len() as usize]))
    }

    /// A bounded `Read + Seek` view over the value bytes
    pub fn value_reader(&self, view: RecordView) -> ValueReader<'_, S> {
        ValueReader::new(&self.storage, view)
    }

    // =========================================================================
    // Whole-File Access
    // =========================================================================

    /// Parse the 256-entry header
    pub fn header(&self) -> Result<Header> {
        let mut raw = [0u8; HEADER_SIZE as usize];
        self.storage.read_at(&mut raw, 0)?;
        Ok(Header::parse(&raw))
    }

    /// Scan every record in file order
    pub fn iter(&self) -> Result<RecordIter<'_, S>> {
        let header = self.header()?;
        Ok(RecordIter::new(self, header.records_end()))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Read a little-endian (u32, u32) pair at `pos`
    pub(super) fn read_pair(&self, pos: u64) -> Result<(u32, u32)> {
        let mut raw = [0u8; PAIR_SIZE as usize];
        self.storage.read_at(&mut raw, pos)?;
        Ok(decode_pair(&raw))
    }

    /// Narrow a computed position to the format's 32-bit offsets
    pub(super) fn offset(&self, value: u64) -> Result<u32> {
        u32::try_from(value).map_err(|_| CdbError::OutOfRange {
            offset: value,
            len: 0,
            size: self.storage.size(),
        })
    }

    /// Compare `key` against the stored key bytes at `pos`
    fn matches(&self, key: &[u8], pos: u64, scratch: &mut [u8]) -> Result<bool> {
        if let Some(bytes) = self.storage.as_bytes() {
            check_range(pos, key.len(), bytes.len() as u64)?;
            let start = pos as usize;
            return Ok(&bytes[start..start + key.len()] == key);
        }

        let mut pos = pos;
        for chunk in key.chunks(scratch.len()) {
            let staged = &mut scratch[..chunk.len()];
            self.storage.read_at(staged, pos)?;
            if &staged[..] != chunk {
                return Ok(false);
            }
            pos += chunk.len() as u64;
        }
        Ok(true)
    }
}

impl<S: Storage> fmt::Debug for Cdb<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cdb")
            .field("size", &self.storage.size())
            .field("scratch_size", &self.scratch_size)
            .finish()
    }
}
