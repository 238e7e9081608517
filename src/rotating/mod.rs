//! Rotating file sink - time-bucketed durable log storage
//!
//! Owns exactly one output file at a time and transparently rolls over to a
//! new file when the wall-clock time crosses a day or month boundary. Every
//! emitted record is flushed before `emit` returns, so a crash never loses
//! the most recent record from the caller's perspective.
//!
//! # File Naming
//!
//! One physical file per time bucket, named `{directory}/{bucket}_{base_name}`:
//!
//! ```text
//! log/
//! ├── 20240115_app.log
//! ├── 20240116_app.log
//! └── ...
//! ```
//!
//! # Rotation Model
//!
//! Rotation is checked only on the `emit` path - there is no timer thread
//! and no background task. A bucket that receives no writes never produces
//! a file. The old handle is always flushed and fully released before the
//! new file is opened; if that open fails, the sink parks in a failed state
//! and every later `emit` fails fast until [`RotatingFileSink::reopen`] is
//! called or the sink is rebuilt.
//!
//! # Concurrency
//!
//! The whole check-rotate-write-flush sequence runs under one mutex, so
//! concurrent callers cannot race a rotation or interleave bytes mid-line.
//! Two sink instances pointed at the same directory and base name are not
//! coordinated; single-writer ownership per file is assumed.
//!
//! # Example
//!
//! ```no_run
//! use rollsink::{RotatingFileSink, RotatingSinkConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RotatingSinkConfig::default().with_directory("log");
//! let sink = RotatingFileSink::new(config)?;
//!
//! sink.emit("2024-01-15 23:59:59 [INFO] service started")?;
//! sink.close()?;
//! # Ok(())
//! # }
//! ```

use std::fs::{self, File};
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use crate::clock::{Clock, SystemClock};
use crate::config::RotatingSinkConfig;
use crate::error::{ConfigurationError, WriteError};

pub mod writer;

pub use writer::{DirectWriter, RecordWrite, RecordWriter};

// =============================================================================
// Metrics
// =============================================================================

/// Counters for the rotating sink
#[derive(Debug, Default)]
pub struct RotatingSinkMetrics {
    /// Records successfully appended and flushed
    pub records_written: AtomicU64,

    /// Bytes written, including line terminators
    pub bytes_written: AtomicU64,

    /// Files opened (first open and every rotation)
    pub files_opened: AtomicU64,

    /// Rotations performed (excludes the first open)
    pub rotations: AtomicU64,

    /// Failed emit/close operations
    pub write_errors: AtomicU64,
}

impl RotatingSinkMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            records_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            files_opened: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
        }
    }

    /// Record a successfully written record
    #[inline]
    fn record_write(&self, bytes: u64) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a file open, marking whether it replaced an earlier bucket
    #[inline]
    fn record_open(&self, rotated: bool) {
        self.files_opened.fetch_add(1, Ordering::Relaxed);
        if rotated {
            self.rotations.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a failed operation
    #[inline]
    fn record_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_written: self.records_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            files_opened: self.files_opened.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of sink counters
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub records_written: u64,
    pub bytes_written: u64,
    pub files_opened: u64,
    pub rotations: u64,
    pub write_errors: u64,
}

// =============================================================================
// State machine
// =============================================================================

/// Lifecycle state of the sink
///
/// ```text
/// Unopened --emit--> Open(bucket)
/// Open(b1) --emit, bucket changed--> Open(b2)
/// Open(b)  --open failure on rotation--> Failed   (old handle released)
/// Failed   --emit--> Failed                        (fails fast)
/// any      --close--> Closed                       (terminal, idempotent)
/// Failed | Closed --reopen--> Unopened
/// ```
enum SinkState {
    /// No file opened yet; the first emit opens one lazily
    Unopened,

    /// A bucket file is open for appending
    Open {
        /// Bucket key this handle was opened for
        bucket: String,
        /// Full path of the open file (for error reporting)
        path: PathBuf,
        /// Exclusively owned writer; dropping it releases the handle
        writer: Box<dyn RecordWrite>,
    },

    /// A rotation open failed; the sink fails fast until reopened
    Failed,

    /// Closed by the owner
    Closed,
}

// =============================================================================
// Sink
// =============================================================================

/// Time-bucketed rotating file sink
///
/// Accepts pre-formatted, single-line records and guarantees each one lands
/// in the file corresponding to its wall-clock period. Level filtering and
/// record formatting belong to the caller.
pub struct RotatingFileSink {
    /// Sink configuration (validated at construction)
    config: RotatingSinkConfig,

    /// Time source (swappable for tests)
    clock: Arc<dyn Clock>,

    /// Writer factory applied to each freshly opened bucket file
    writer: Arc<dyn RecordWriter>,

    /// Stream lifecycle state, serialized across callers
    state: Mutex<SinkState>,

    /// Operation counters
    metrics: RotatingSinkMetrics,
}

impl RotatingFileSink {
    /// Create a sink using the system clock
    ///
    /// Creates the target directory recursively if missing. No file is
    /// opened here; the stream opens lazily on the first [`emit`].
    ///
    /// [`emit`]: RotatingFileSink::emit
    pub fn new(config: RotatingSinkConfig) -> Result<Self, ConfigurationError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a sink with an injected time source
    pub fn with_clock(
        config: RotatingSinkConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigurationError> {
        Self::with_writer(config, clock, Arc::new(DirectWriter))
    }

    /// Create a sink with an injected time source and writer factory
    pub fn with_writer(
        config: RotatingSinkConfig,
        clock: Arc<dyn Clock>,
        writer: Arc<dyn RecordWriter>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;

        fs::create_dir_all(&config.directory).map_err(|source| {
            ConfigurationError::CreateDir {
                path: config.directory.clone(),
                source,
            }
        })?;

        Ok(Self {
            config,
            clock,
            writer,
            state: Mutex::new(SinkState::Unopened),
            metrics: RotatingSinkMetrics::new(),
        })
    }

    /// Append one record to the file for the current time bucket
    ///
    /// Checks the bucket against the wall clock, rotates if it changed
    /// (including the very first call), and writes `line` plus `\n` straight
    /// through to the file before returning; no user-space buffering, so a
    /// record reported as failed never reaches the file through a later
    /// call. A record emitted just before midnight and
    /// one just after land in different files; that is the documented
    /// boundary behavior, not a defect.
    ///
    /// # Errors
    ///
    /// Any I/O failure surfaces as a [`WriteError`]. A failure to open the
    /// new file during rotation releases the old handle first and leaves
    /// the sink failed; subsequent calls return
    /// [`WriteError::Unavailable`] without touching the filesystem.
    pub fn emit(&self, line: &str) -> Result<(), WriteError> {
        let mut state = self.state.lock();

        match &*state {
            SinkState::Failed => {
                self.metrics.record_error();
                return Err(WriteError::Unavailable);
            }
            SinkState::Closed => {
                self.metrics.record_error();
                return Err(WriteError::Closed);
            }
            SinkState::Unopened | SinkState::Open { .. } => {}
        }

        let now = self.clock.now();
        let needs_open = match &*state {
            SinkState::Unopened => true,
            SinkState::Open { bucket, .. } => self.config.rotation.needs_rotation(bucket, now),
            SinkState::Failed | SinkState::Closed => unreachable!("checked above"),
        };

        if needs_open {
            self.rotate(&mut state, now)?;
        }

        let SinkState::Open { path, writer, .. } = &mut *state else {
            unreachable!("rotate leaves the sink open on success");
        };

        // Durability over throughput: the whole record is handed to the
        // operating system as one write before emit returns. Nothing stays
        // in a user-space buffer, so a record reported as failed can never
        // surface in the file through a later emit.
        let mut record = Vec::with_capacity(line.len() + 1);
        record.extend_from_slice(line.as_bytes());
        record.push(b'\n');

        writer.append(&record).map_err(|source| {
            self.metrics.record_error();
            WriteError::Append {
                path: path.clone(),
                source,
            }
        })?;

        self.metrics.record_write(record.len() as u64);
        Ok(())
    }

    /// Close the old handle (if any) and open the file for the current bucket
    ///
    /// The state is parked at `Failed` while the old handle is released and
    /// the new file is opened, so an early return on error leaves the sink
    /// in the fail-fast state with no handle leaked.
    fn rotate(&self, state: &mut SinkState, now: DateTime<Local>) -> Result<(), WriteError> {
        let previous = mem::replace(state, SinkState::Failed);

        let rotated = if let SinkState::Open {
            bucket,
            path,
            mut writer,
        } = previous
        {
            writer.flush().map_err(|source| {
                self.metrics.record_error();
                WriteError::Flush { path, source }
            })?;
            drop(writer);
            tracing::debug!(old_bucket = %bucket, "released previous bucket file");
            true
        } else {
            false
        };

        let bucket = self.config.rotation.bucket_key(now);
        let path = self.bucket_path(&bucket);

        let file = File::options()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| {
                self.metrics.record_error();
                WriteError::Open {
                    path: path.clone(),
                    source,
                }
            })?;

        let writer = self.writer.wrap(file).map_err(|source| {
            self.metrics.record_error();
            WriteError::Open {
                path: path.clone(),
                source,
            }
        })?;

        if rotated {
            tracing::info!(bucket = %bucket, path = %path.display(), "log rotation completed");
        } else {
            tracing::debug!(bucket = %bucket, path = %path.display(), "opened bucket file");
        }
        self.metrics.record_open(rotated);

        *state = SinkState::Open {
            bucket,
            path,
            writer,
        };
        Ok(())
    }

    /// Full path of the file for a bucket key
    fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.config
            .directory
            .join(format!("{}_{}", bucket, self.config.base_name))
    }

    /// Flush and release the open stream
    ///
    /// Idempotent: closing an already-closed sink is a no-op. Terminal: a
    /// closed sink rejects further emits until [`reopen`] is called.
    ///
    /// [`reopen`]: RotatingFileSink::reopen
    pub fn close(&self) -> Result<(), WriteError> {
        let mut state = self.state.lock();
        match mem::replace(&mut *state, SinkState::Closed) {
            SinkState::Open {
                path, mut writer, ..
            } => {
                writer.flush().map_err(|source| {
                    self.metrics.record_error();
                    WriteError::Flush { path, source }
                })?;
                tracing::debug!("sink closed");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Return the sink to the unopened state
    ///
    /// Recovery path for a failed or closed sink once the underlying cause
    /// is fixed: the next [`emit`] opens a fresh stream lazily. If a stream
    /// is currently open it is flushed and released first.
    ///
    /// [`emit`]: RotatingFileSink::emit
    pub fn reopen(&self) -> Result<(), WriteError> {
        let mut state = self.state.lock();
        if let SinkState::Open {
            path, mut writer, ..
        } = mem::replace(&mut *state, SinkState::Unopened)
        {
            writer.flush().map_err(|source| {
                self.metrics.record_error();
                WriteError::Flush { path, source }
            })?;
        }
        Ok(())
    }

    /// Path of the currently open bucket file, if any
    pub fn current_path(&self) -> Option<PathBuf> {
        match &*self.state.lock() {
            SinkState::Open { path, .. } => Some(path.clone()),
            _ => None,
        }
    }

    /// Get reference to the sink counters
    pub fn metrics(&self) -> &RotatingSinkMetrics {
        &self.metrics
    }
}
