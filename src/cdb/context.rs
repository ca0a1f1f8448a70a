//! Lookup Context
//!
//! Caller-owned progress through one key's probe sequence. A context is
//! reset by `find`/`find_start` and advanced by every `find_next`, so
//! holding on to it is what lets a caller enumerate duplicate keys.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_SCRATCH_SIZE;
use crate::error::{CdbError, Result};

use super::{RecordView, PAIR_SIZE};

/// Per-search probe state
///
/// Independent searches, including concurrent ones, each need their own
/// context. The scratch buffer is private to the context and is not part of
/// its serialized form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Stages stored key bytes during comparison on non-mapped storage
    #[serde(skip, default = "default_scratch")]
    pub(crate) buf: Vec<u8>,
    /// Slots visited under the current key; zero means "not started"
    pub(crate) probes: u32,
    /// Hash of the current key (valid once started)
    pub(crate) khash: u32,
    /// Position of the next slot to visit
    pub(crate) kpos: u32,
    /// Start of the current slot table
    pub(crate) hpos: u32,
    /// Number of slots in the current slot table
    pub(crate) hslots: u32,
    /// Value position of the last match
    pub(crate) dpos: u32,
    /// Value length of the last match
    pub(crate) dlen: u32,
}

fn default_scratch() -> Vec<u8> {
    vec![0u8; DEFAULT_SCRATCH_SIZE]
}

impl Context {
    /// Create a context with the default scratch buffer
    pub fn new() -> Self {
        Self::with_scratch(DEFAULT_SCRATCH_SIZE)
    }

    /// Create a context whose key comparisons read `size` bytes at a time
    ///
    /// A zero size is rounded up to one byte.
    pub fn with_scratch(size: usize) -> Self {
        Self {
            buf: vec![0u8; size.max(1)],
            probes: 0,
            khash: 0,
            kpos: 0,
            hpos: 0,
            hslots: 0,
            dpos: 0,
            dlen: 0,
        }
    }

    /// Forget any search in progress
    pub fn reset(&mut self) {
        self.probes = 0;
    }

    /// True once a search has located its slot table and visited a slot
    pub fn is_started(&self) -> bool {
        self.probes != 0
    }

    /// Number of slots visited under the current key
    pub fn probes(&self) -> u32 {
        self.probes
    }

    /// Hash of the key being searched, once started
    pub fn key_hash(&self) -> Option<u32> {
        self.is_started().then_some(self.khash)
    }

    /// The most recent match, if the last step found one
    pub fn record(&self) -> Option<RecordView> {
        (self.is_started() && self.dpos != 0).then(|| RecordView::new(self.dpos, self.dlen))
    }

    /// Scratch buffer size in bytes
    pub fn scratch_size(&self) -> usize {
        self.buf.len()
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Serialize the probe state so a search can be resumed later
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Restore a context produced by [`encode`](Self::encode)
    ///
    /// A started snapshot must point at a slot inside its own table.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let ctx: Self = bincode::deserialize(bytes)?;
        ctx.check_probe_state()?;
        Ok(ctx)
    }

    fn check_probe_state(&self) -> Result<()> {
        if !self.is_started() {
            return Ok(());
        }

        let table_end = u64::from(self.hpos) + u64::from(self.hslots) * u64::from(PAIR_SIZE);
        let kpos = u64::from(self.kpos);
        if self.probes > self.hslots
            || kpos < u64::from(self.hpos)
            || kpos >= table_end
            || (kpos - u64::from(self.hpos)) % u64::from(PAIR_SIZE) != 0
        {
            return Err(CdbError::Serialization(format!(
                "snapshot slot position {} outside table at {} with {} slots",
                self.kpos, self.hpos, self.hslots
            )));
        }
        Ok(())
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
