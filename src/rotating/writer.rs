//! Record writers for the rotating sink
//!
//! Pluggable seam between the sink's state machine and the open file
//! handle. The default [`DirectWriter`] writes every record straight
//! through to the file: the sink flushes each record before `emit`
//! returns, so a user-space buffer between records would only create a
//! window where a record the caller was told failed could sneak into the
//! file on a later write.
//!
//! # Contract
//!
//! Implementations must be write-through with respect to failure: a record
//! whose [`append`](RecordWrite::append) reported an error must never reach
//! the file through a subsequent call. No byte of a failed record may stay
//! buffered.

use std::fs::File;
use std::io::{self, Write};

/// Factory that wraps a freshly opened bucket file
pub trait RecordWriter: Send + Sync {
    /// Wrap a file with this writer's write strategy
    fn wrap(&self, file: File) -> io::Result<Box<dyn RecordWrite>>;
}

/// Write operations on one open bucket file
///
/// Object-safe; the sink holds the active handle as `Box<dyn RecordWrite>`.
pub trait RecordWrite: Send {
    /// Append one complete record (terminator included)
    ///
    /// On success the whole record has been handed to the operating
    /// system. On failure nothing from this record may remain buffered for
    /// a later write.
    fn append(&mut self, record: &[u8]) -> io::Result<()>;

    /// Push any internal state through to the file
    ///
    /// Called when the handle is released (rotation, close, reopen).
    fn flush(&mut self) -> io::Result<()>;
}

/// Write-through writer: every record goes straight to the file
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectWriter;

impl RecordWriter for DirectWriter {
    fn wrap(&self, file: File) -> io::Result<Box<dyn RecordWrite>> {
        Ok(Box::new(DirectWrite { file }))
    }
}

struct DirectWrite {
    file: File,
}

impl RecordWrite for DirectWrite {
    fn append(&mut self, record: &[u8]) -> io::Result<()> {
        self.file.write_all(record)
    }

    fn flush(&mut self) -> io::Result<()> {
        // Nothing is retained between appends; this is a pass-through.
        self.file.flush()
    }
}
