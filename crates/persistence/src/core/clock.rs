//! Write timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Issues write timestamps that never repeat or go backwards within a process.
///
/// Two writes in the same microsecond (or a wall clock stepping back) still
/// get strictly increasing timestamps, so `updatedAt` always advances.
#[derive(Debug, Default)]
pub struct WriteClock {
    last_micros: AtomicI64,
}

impl WriteClock {
    /// Creates a clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next timestamp.
    pub fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_micros();
        let mut last = self.last_micros.load(Ordering::Relaxed);
        loop {
            let next = wall.max(last + 1);
            match self.last_micros.compare_exchange_weak(
                last,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return DateTime::from_timestamp_micros(next).unwrap_or_else(Utc::now),
                Err(current) => last = current,
            }
        }
    }
}
