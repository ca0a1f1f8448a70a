//! cdb Module
//!
//! Constant database - immutable on-disk hash table, read-only access.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (2048 bytes)                                     │
//! │   256 x [Position: u32][NumSlots: u32]                  │
//! │   entry i = slot table for keys with hash & 0xff == i   │
//! ├─────────────────────────────────────────────────────────┤
//! │ Records (variable)                                      │
//! │   [KeyLen: u32][DataLen: u32][Key][Data]                │
//! │   ... repeated, duplicate keys allowed ...              │
//! ├─────────────────────────────────────────────────────────┤
//! │ Slot Tables (variable)                                  │
//! │   NumSlots x [Hash: u32][RecordPos: u32]                │
//! │   RecordPos == 0 marks an empty slot                    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//! All integers are little-endian. Lookups start at slot
//! `(hash >> 8) % NumSlots` and probe forward, wrapping at the table end.

mod context;
mod hash;
mod iterator;
mod reader;
mod value;

pub use context::Context;
pub use hash::{cdb_hash, CdbHasher, HASH_SEED};
pub use iterator::{FindIter, RecordIter};
pub use reader::Cdb;
pub use value::ValueReader;

// =============================================================================
// Format Constants
// =============================================================================

/// Number of slot tables indexed by the header
pub const TABLE_COUNT: usize = 256;

/// Size of one header entry, slot, or record prefix: two u32 values
pub const PAIR_SIZE: u32 = 8;

/// Header size: 256 entries of (position, slots)
pub const HEADER_SIZE: u32 = TABLE_COUNT as u32 * PAIR_SIZE;

/// Decode a little-endian (u32, u32) pair
pub(crate) fn decode_pair(bytes: &[u8; 8]) -> (u32, u32) {
    let first = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let second = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    (first, second)
}

// =============================================================================
// Record View
// =============================================================================

/// Location of a matched record's value inside the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordView {
    position: u32,
    len: u32,
}

impl RecordView {
    pub(crate) fn new(position: u32, len: u32) -> Self {
        Self { position, len }
    }

    /// Offset of the first value byte
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Value length in bytes
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte range of the value within the file
    pub fn range(&self) -> std::ops::Range<u64> {
        let start = u64::from(self.position);
        start..start + u64::from(self.len)
    }
}

// =============================================================================
// Header
// =============================================================================

/// One header entry: where a slot table lives and how many slots it has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableRef {
    pub position: u32,
    pub slots: u32,
}

impl TableRef {
    pub fn is_empty(&self) -> bool {
        self.slots == 0
    }

    /// One past the last byte of the table
    pub fn end(&self) -> u64 {
        u64::from(self.position) + u64::from(self.slots) * u64::from(PAIR_SIZE)
    }
}

/// The 256-entry directory at the start of every cdb file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    tables: Vec<TableRef>,
}

impl Header {
    /// Parse the raw 2048 header bytes
    pub fn parse(bytes: &[u8; HEADER_SIZE as usize]) -> Self {
        let tables = bytes
            .chunks_exact(PAIR_SIZE as usize)
            .map(|chunk| {
                let mut pair = [0u8; 8];
                pair.copy_from_slice(chunk);
                let (position, slots) = decode_pair(&pair);
                TableRef { position, slots }
            })
            .collect();
        Self { tables }
    }

    /// Entry for the table at `index` (`hash & 0xff`)
    pub fn table(&self, index: u8) -> TableRef {
        self.tables[usize::from(index)]
    }

    pub fn tables(&self) -> &[TableRef] {
        &self.tables
    }

    /// Total slots across all tables
    pub fn total_slots(&self) -> u64 {
        self.tables.iter().map(|t| u64::from(t.slots)).sum()
    }

    /// Where the record area ends: the lowest non-empty table position,
    /// or the header end when every table is empty
    pub fn records_end(&self) -> u32 {
        self.tables
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| t.position)
            .min()
            .unwrap_or(HEADER_SIZE)
    }
}
