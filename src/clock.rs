//! Time source abstraction
//!
//! The sink computes its time bucket from a [`Clock`] rather than calling
//! `Local::now()` directly, so tests can drive rotation across day and month
//! boundaries without waiting for real time to pass.

use chrono::{DateTime, Local};

/// A source of local wall-clock time
pub trait Clock: Send + Sync {
    /// Current local time
    fn now(&self) -> DateTime<Local>;
}

/// The real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
