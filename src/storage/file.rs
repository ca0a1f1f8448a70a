//! Positioned-read file storage
//!
//! Reads go straight to the OS with an explicit offset, so no cursor is
//! shared between concurrent readers.

use std::fs::File;

use crate::error::Result;

use super::{check_range, Storage};

/// Database file accessed with positioned reads
#[derive(Debug)]
pub struct FileStorage {
    file: File,
    /// File length captured at open; the file is immutable afterwards
    size: u64,
}

impl FileStorage {
    /// Wrap an open file
    pub fn new(file: File) -> Result<Self> {
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }

    /// Give back the file handle
    pub fn into_inner(self) -> File {
        self.file
    }
}

impl Storage for FileStorage {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        check_range(offset, buf.len(), self.size)?;
        read_exact_at(&self.file, buf, offset)?;
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> std::io::Result<()> {
    use std::io::{Error, ErrorKind};
    use std::os::windows::fs::FileExt;

    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => {
                return Err(Error::new(
                    ErrorKind::UnexpectedEof,
                    "Failed to read enough bytes",
                ))
            }
            Ok(n) => {
                let rest = buf;
                buf = &mut rest[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
