//! rollsink - time-bucketed rotating file sink
//!
//! A log-record sink that owns exactly one output file at a time and
//! transparently rolls over to a new file when the local wall-clock time
//! crosses a day or month boundary. Callers hand it pre-formatted,
//! single-line records; the sink guarantees every record is appended and
//! flushed to the file for its time bucket, in call order, without losing
//! or duplicating records across the boundary.
//!
//! ```text
//! [caller] --formatted line--> [RotatingFileSink] --append + flush--> {bucket}_{base_name}
//!                                     ↓ (bucket changed)
//!                              close old / open new
//! ```
//!
//! # What it is not
//!
//! No formatting, no level dispatch, no console output, no network
//! transport, no compression - those belong to the surrounding logger
//! facade. The sink performs no background scheduling either: rotation is
//! checked only on the emit path, so a period with no writes produces no
//! file.
//!
//! # Example
//!
//! ```no_run
//! use rollsink::{RotatingFileSink, RotatingSinkConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RotatingSinkConfig::default()
//!     .with_directory("log")
//!     .with_base_name("app.log")
//!     .with_daily_rotation();
//!
//! let sink = RotatingFileSink::new(config)?;
//! sink.emit("2024-01-15 10:30:45 [INFO] request handled")?;
//! sink.close()?;
//! # Ok(())
//! # }
//! ```

/// Time source abstraction (injectable for tests)
pub mod clock;

/// Typed, validated sink configuration
pub mod config;

/// Error taxonomy (configuration vs. write failures)
pub mod error;

/// The rotating file sink and its state machine
pub mod rotating;

pub use clock::{Clock, SystemClock};
pub use config::{RotatingSinkConfig, RotationUnit};
pub use error::{ConfigurationError, WriteError};
pub use rotating::{
    DirectWriter, MetricsSnapshot, RecordWrite, RecordWriter, RotatingFileSink,
    RotatingSinkMetrics,
};
