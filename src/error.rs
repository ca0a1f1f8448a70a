//! Error types for constdb
//!
//! Provides a unified error type for all operations. A missing key is not an
//! error: lookups report it as `Ok(None)`.

use thiserror::Error;

/// Result type alias using CdbError
pub type Result<T> = std::result::Result<T, CdbError>;

/// Unified error type for constdb operations
#[derive(Debug, Error)]
pub enum CdbError {
    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A read touched bytes outside the storage, or an offset left the
    /// 32-bit address space of the format. Usually a truncated or corrupt file.
    #[error("Read of {len} bytes at offset {offset} is out of range (storage size {size})")]
    OutOfRange { offset: u64, len: u64, size: u64 },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CdbError {
    /// True for failures of the underlying storage (I/O or out-of-range reads)
    pub fn is_storage(&self) -> bool {
        matches!(self, CdbError::Io(_) | CdbError::OutOfRange { .. })
    }
}

impl From<CdbError> for std::io::Error {
    fn from(e: CdbError) -> Self {
        use std::io::{Error, ErrorKind};
        match e {
            CdbError::Io(e) => e,
            e @ CdbError::OutOfRange { .. } => Error::new(ErrorKind::UnexpectedEof, e),
            e => Error::new(ErrorKind::Other, e),
        }
    }
}

impl From<bincode::Error> for CdbError {
    fn from(e: bincode::Error) -> Self {
        CdbError::Serialization(e.to_string())
    }
}
