//! Configuration for constdb
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{CdbError, Result};

/// Default size of the per-context scratch buffer used for key comparison
pub const DEFAULT_SCRATCH_SIZE: usize = 64;

/// Configuration for opening a database file
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // File Configuration
    // -------------------------------------------------------------------------
    /// Path of the cdb file to open
    pub path: PathBuf,

    /// How the file bytes are accessed
    pub backend: StorageBackend,

    // -------------------------------------------------------------------------
    // Lookup Configuration
    // -------------------------------------------------------------------------
    /// Scratch buffer size for contexts created by `Cdb::new_context`
    /// (bytes of stored key compared per read on non-mapped backends)
    pub scratch_size: usize,
}

/// Storage backing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Map the whole file into memory (lowest latency, zero-copy values)
    #[default]
    Mmap,

    /// Positioned reads on the open file handle
    File,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data.cdb"),
            backend: StorageBackend::Mmap,
            scratch_size: DEFAULT_SCRATCH_SIZE,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the config for values that can never work
    pub fn validate(&self) -> Result<()> {
        if self.scratch_size == 0 {
            return Err(CdbError::Config(
                "scratch_size must be at least 1 byte".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the database file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the storage backend
    pub fn backend(mut self, backend: StorageBackend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the context scratch buffer size (in bytes)
    pub fn scratch_size(mut self, size: usize) -> Self {
        self.config.scratch_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
