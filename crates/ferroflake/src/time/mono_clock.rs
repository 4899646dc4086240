use crate::{SystemClock, TimeSource};
use core::time::Duration;
use portable_atomic::{AtomicI64, Ordering};
use std::{
    sync::{Arc, OnceLock},
    thread::{self, JoinHandle},
    time::Instant,
};

/// Millisecond counter advanced by a background ticker thread.
#[derive(Debug)]
struct Ticker {
    elapsed: AtomicI64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A time source that never goes backward.
///
/// The clock samples the wall clock once, at construction, and from then on
/// advances by the monotonic time elapsed since that instant. Readers pay a
/// single atomic load, which keeps the exhaustion busy-wait in
/// [`SnowflakeGenerator::generate`] cheap.
///
/// Because the anchor is fixed, a long-running process slowly drifts from the
/// wall clock when the OS clock is corrected. Use [`SystemClock`] when IDs must
/// track the wall clock exactly and regressions should be surfaced instead.
///
/// Clones share the same ticker thread. The thread exits once the last clone is
/// dropped.
///
/// [`SnowflakeGenerator::generate`]: crate::SnowflakeGenerator::generate
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    ticker: Arc<Ticker>,
    anchor: i64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Anchors a new clock at the current wall-clock time and starts its
    /// ticker thread.
    ///
    /// # Example
    ///
    /// ```
    /// use ferroflake::{CUSTOM_EPOCH, MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::new();
    /// assert!(clock.current_millis() > CUSTOM_EPOCH);
    /// ```
    pub fn new() -> Self {
        let start = Instant::now();
        let anchor = SystemClock.current_millis();

        let ticker = Arc::new(Ticker {
            elapsed: AtomicI64::new(0),
            _handle: OnceLock::new(),
        });

        let weak = Arc::downgrade(&ticker);
        let handle = thread::spawn(move || {
            let mut next_tick = 1;

            loop {
                let Some(ticker) = weak.upgrade() else {
                    break;
                };

                let target = start + Duration::from_millis(next_tick);
                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let elapsed = i64::try_from(start.elapsed().as_millis()).unwrap_or(i64::MAX);
                ticker.elapsed.store(elapsed, Ordering::Relaxed);

                // Skip ticks we overslept instead of replaying them.
                next_tick = elapsed.unsigned_abs() + 1;
            }
        });

        ticker
            ._handle
            .set(handle)
            .expect("ticker thread handle set twice");

        Self { ticker, anchor }
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> i64 {
        self.anchor + self.ticker.elapsed.load(Ordering::Relaxed)
    }
}
