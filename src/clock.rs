//! Time source for stamping new entries.
//!
//! The log itself never reads the clock; callers stamp entries before
//! appending them.

use std::time::{SystemTime, UNIX_EPOCH};

pub trait Clock {
    /// Seconds since the UNIX epoch.
    fn now(&self) -> f64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        // A clock set before 1970 stamps entries at the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_epoch() {
        assert!(SystemClock.now() > 1_600_000_000.0);
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(12.5).now(), 12.5);
    }
}
