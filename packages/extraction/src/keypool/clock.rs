//! Clock abstraction for quota bookkeeping.
//!
//! Sliding windows and daily rollover depend on wall-clock reads, so
//! the pool takes its notion of "now" through a trait. Production uses
//! [`SystemClock`]; tests drive a manual clock from
//! [`crate::testing::ManualClock`].

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
