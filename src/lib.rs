//! # constdb
//!
//! A read-only reader for cdb ("constant database") files:
//! - Immutable on-disk hash table built by an external cdbmake-style tool
//! - O(1)-amortized point lookups, duplicate keys allowed
//! - Caller-owned lookup contexts for enumerating every value of a key
//! - Memory-mapped or positioned-read file access
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Caller                               │
//! │          (one Context per concurrent search)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ find / find_next / data
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Lookup Engine (Cdb)                       │
//! │       hash → header entry → linear probe w/ wraparound       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ read_at(buf, offset)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Storage Accessor (Storage)                   │
//! │        MmapStorage │ FileStorage │ SeekStorage │ bytes       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use constdb::{Cdb, Context};
//!
//! # fn main() -> constdb::Result<()> {
//! let db = Cdb::open("data.cdb")?;
//! let mut ctx = Context::new();
//!
//! if let Some(view) = db.find(b"user:42", &mut ctx)? {
//!     println!("first value: {:?}", db.read_value(view)?);
//! }
//! while let Some(view) = db.find_next(b"user:42", &mut ctx)? {
//!     println!("another value: {:?}", db.read_value(view)?);
//! }
//! db.close();
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod cdb;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CdbError, Result};
pub use config::{Config, StorageBackend};
pub use cdb::{cdb_hash, Cdb, Context, RecordView};
pub use storage::Storage;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of constdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
