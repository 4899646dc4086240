use crate::TimeSource;
use std::time::{SystemTime, UNIX_EPOCH};

/// A time source that reads the operating system's wall clock on every call.
///
/// Unlike [`MonotonicClock`], this clock follows external adjustments (NTP
/// corrections, manual changes, VM migration). A backward step is reported by
/// the generator as [`Error::ClockMovedBackwards`] rather than silently
/// absorbed.
///
/// [`MonotonicClock`]: crate::MonotonicClock
/// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
            // A clock set before 1970 is reported as negative millis so the
            // generator can flag it as a regression.
            Err(e) => i64::try_from(e.duration().as_millis()).map_or(i64::MIN, |ms| -ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_past_custom_epoch() {
        assert!(SystemClock.current_millis() > crate::CUSTOM_EPOCH);
    }
}
