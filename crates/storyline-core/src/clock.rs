//! Clock abstraction for determinism.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

/// Abstraction over system time for deterministic behavior.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wraps another clock so that successive readings never decrease.
///
/// Wall clocks can step backwards (NTP corrections, manual changes). Story
/// timestamps are logical time, so a reading older than the last one handed
/// out is replaced by the last one.
#[derive(Debug)]
pub struct MonotonicClock<C> {
    inner: C,
    last: Mutex<Option<DateTime<Utc>>>,
}

impl<C: Clock> MonotonicClock<C> {
    /// Creates a monotonic view over `inner`.
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }
}

impl<C: Clock> Clock for MonotonicClock<C> {
    fn now(&self) -> DateTime<Utc> {
        let reading = self.inner.now();
        // The guarded value is a plain timestamp; a poisoned lock still holds
        // a valid one.
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let stamped = match *last {
            Some(previous) if previous > reading => previous,
            _ => reading,
        };
        *last = Some(stamped);
        stamped
    }
}
