//! Time sourcing for record creation defaults.

use std::time::{SystemTime, UNIX_EPOCH};

/// Epoch-millisecond clock.
///
/// Creation timestamps come from an injected clock rather than from ambient
/// wall-clock calls inside domain code, so tests can pin time.
pub trait Clock {
    /// Current time in epoch milliseconds.
    fn now_epoch_ms(&self) -> i64;
}

/// Wall-clock implementation over [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_ms(&self) -> i64 {
        // Pre-epoch system clocks collapse to zero.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_reports_post_epoch_milliseconds() {
        let now = SystemClock.now_epoch_ms();
        assert!(now > 0, "system time should be after the unix epoch");
    }

    #[test]
    fn fixed_clock_can_stand_in_through_the_trait() {
        struct FixedClock(i64);
        impl Clock for FixedClock {
            fn now_epoch_ms(&self) -> i64 {
                self.0
            }
        }

        let clock: &dyn Clock = &FixedClock(1_700_000_000_000);
        assert_eq!(clock.now_epoch_ms(), 1_700_000_000_000);
    }
}
