use core::{cmp::Ordering, fmt};
use portable_atomic::{AtomicBool, Ordering as AtomicOrdering};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[cfg(not(feature = "parking-lot"))]
use crate::generator::PoisonError;
use crate::{
    Config, Error, IdComponents, Result, SystemClock, TimeSource,
    generator::{CacheScope, CacheSlot, DecodeCache, IdGenStatus, Mutex, MutexGuard},
};

/// The mutable half of a generator: the millisecond of the last issued ID and
/// the sequence used within it. A `last_timestamp` of 0 means nothing has been
/// issued yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct State {
    last_timestamp: i64,
    sequence: u32,
}

/// A lock-based Snowflake ID generator for a runtime-configured layout.
///
/// Each instance owns its own `last_timestamp`/`sequence` pair behind a mutex,
/// so one instance may be shared freely across threads (e.g. in an
/// [`Arc`](std::sync::Arc)). Distinct instances never share state; giving two
/// live instances the same origin values breaks uniqueness.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Any layout [`Config`] can describe
/// - ✅ Optional memoized [`decode`](Self::decode)
///
/// ## Blocking
/// [`generate`](Self::generate) holds the lock for the whole call, including
/// the busy-wait when a millisecond's sequence space is exhausted. A burst that
/// exhausts the sequence therefore stalls every caller until the next
/// millisecond, capping throughput at `2^sequence_bits` IDs per millisecond.
/// Use [`poll_generate`](Self::poll_generate) to back off instead.
///
/// # Example
///
/// ```
/// use ferroflake::{configure, SnowflakeGenerator};
///
/// let config = configure(1_700_000_000_000, &[1, 1]).unwrap();
/// let generator = SnowflakeGenerator::new(config);
///
/// let a = generator.generate().unwrap();
/// let b = generator.generate().unwrap();
/// assert!(a < b);
///
/// let parts = generator.decode(b);
/// assert_eq!(parts.origin_values, vec![1, 1]);
/// ```
pub struct SnowflakeGenerator<T = SystemClock>
where
    T: TimeSource,
{
    config: Config,
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<State>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<State>,
    cache: Mutex<CacheSlot>,
    cache_enabled: AtomicBool,
    time: T,
}

impl SnowflakeGenerator<SystemClock> {
    /// Creates a generator that reads the system wall clock.
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<T> SnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator with a caller-supplied [`TimeSource`].
    ///
    /// State starts at `last_timestamp = 0`, `sequence = 0`, and the decode
    /// cache is disabled.
    ///
    /// A `last_timestamp` of 0 doubles as "nothing issued yet". A clock that
    /// reads exactly 0 on the first call (e.g. a test clock pinned to
    /// [`UNIX_EPOCH`](crate::UNIX_EPOCH)) therefore lands in the
    /// same-millisecond branch, and the first ID carries sequence 1, not 0.
    pub fn with_clock(config: Config, time: T) -> Self {
        Self::from_state(config, 0, 0, time)
    }

    /// Creates a generator preloaded with a previously observed high-water
    /// mark, e.g. one persisted via [`Self::state`] before a restart.
    ///
    /// IDs from this generator will never carry a timestamp earlier than
    /// `last_timestamp`; a clock that is still behind it is reported as
    /// [`Error::ClockMovedBackwards`]. `sequence` is masked to the layout's
    /// sequence width.
    pub fn from_state(config: Config, last_timestamp: i64, sequence: u32, time: T) -> Self {
        let state = State {
            last_timestamp,
            sequence: sequence & config.max_sequence(),
        };
        Self {
            config,
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(state)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(state),
            cache: Mutex::new(CacheSlot::default()),
            cache_enabled: AtomicBool::new(false),
            time,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generates the next ID, blocking through sequence exhaustion.
    ///
    /// Within one millisecond the sequence increments; on a new millisecond it
    /// resets to 0. When the sequence wraps within a millisecond, the call
    /// spins on the clock, still holding the lock, until the clock moves past
    /// the last issued millisecond. Exhaustion is never reported as an error.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockMovedBackwards`] if the clock reads earlier than the
    ///   last issued ID. No state is modified; the caller chooses whether to
    ///   retry, sleep, or abort.
    /// - `Error::LockPoisoned` if another thread panicked inside the critical
    ///   section (std mutex only).
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn generate(&self) -> Result<i64> {
        let mut state = self.lock_state()?;
        let mut now = self.time.current_millis();

        match now.cmp(&state.last_timestamp) {
            Ordering::Greater => state.sequence = 0,
            Ordering::Equal => {
                let next = state.sequence.wrapping_add(1) & self.config.max_sequence();
                if next == 0 {
                    now = self.wait_past(state.last_timestamp);
                }
                state.sequence = next;
            }
            Ordering::Less => return Err(Self::cold_clock_behind(now, state.last_timestamp)),
        }

        state.last_timestamp = now;
        Ok(self.config.pack(now, state.sequence))
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// Behaves like [`Self::generate`], except that an exhausted sequence
    /// returns [`IdGenStatus::Pending`] and leaves the state untouched instead
    /// of waiting.
    ///
    /// # Errors
    ///
    /// The same errors as [`Self::generate`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn poll_generate(&self) -> Result<IdGenStatus> {
        let mut state = self.lock_state()?;
        let now = self.time.current_millis();

        match now.cmp(&state.last_timestamp) {
            Ordering::Greater => state.sequence = 0,
            Ordering::Equal => {
                if state.sequence >= self.config.max_sequence() {
                    return Ok(IdGenStatus::Pending { yield_for: 1 });
                }
                state.sequence += 1;
            }
            Ordering::Less => return Err(Self::cold_clock_behind(now, state.last_timestamp)),
        }

        state.last_timestamp = now;
        Ok(IdGenStatus::Ready {
            id: self.config.pack(now, state.sequence),
        })
    }

    /// Splits an ID into its components under this generator's layout.
    ///
    /// Never fails and performs no provenance check: an ID from another layout,
    /// or any arbitrary integer, decodes to whatever its bits say. With the
    /// cache enabled, results are memoized by ID.
    pub fn decode(&self, id: i64) -> IdComponents {
        if !self.cache_enabled.load(AtomicOrdering::Acquire) {
            return self.config.decompose(id);
        }

        let mut slot = self.lock_cache();
        match slot.cache.as_mut() {
            Some(cache) => cache
                .get_or_insert_with(id, || self.config.decompose(id))
                .clone(),
            // Destroyed between the flag check and the lock.
            None => self.config.decompose(id),
        }
    }

    /// Like [`Self::decode`], but rejects IDs that no generator could have
    /// produced.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidId`] if the reserved sign bit is set.
    pub fn try_decode(&self, id: i64) -> Result<IdComponents> {
        if id < 0 {
            return Err(Error::InvalidId { id });
        }
        Ok(self.decode(id))
    }

    /// Returns `(last_timestamp, sequence)`: the wall-clock millisecond and
    /// sequence of the most recently issued ID.
    ///
    /// # Errors
    ///
    /// `Error::LockPoisoned` if the std mutex is poisoned.
    pub fn state(&self) -> Result<(i64, u32)> {
        let state = self.lock_state()?;
        Ok((state.last_timestamp, state.sequence))
    }

    /// Enables the decode cache. Returns `true` if this call enabled it and
    /// `false` if it was already enabled, in which case existing entries are
    /// kept.
    pub fn enable_cache(&self) -> bool {
        self.enable_cache_with(DecodeCache::new())
    }

    /// Enables the decode cache, preallocating room for `capacity` entries.
    pub fn enable_cache_with_capacity(&self, capacity: usize) -> bool {
        self.enable_cache_with(DecodeCache::with_capacity(capacity))
    }

    /// Hands a caller-built (possibly prewarmed) cache to this generator. The
    /// generator owns it from here on; it is dropped by
    /// [`Self::destroy_cache`] or with the generator. Ignored if a cache is
    /// already enabled.
    pub fn enable_cache_with(&self, cache: DecodeCache) -> bool {
        self.enable_cache_generation(cache).is_some()
    }

    /// Installs `cache` unless one is already live, returning the generation
    /// assigned to it.
    pub(crate) fn enable_cache_generation(&self, cache: DecodeCache) -> Option<u64> {
        let mut slot = self.lock_cache();
        if slot.cache.is_some() {
            return None;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(entries = cache.len(), "decode cache enabled");
        slot.generation = slot.generation.wrapping_add(1);
        slot.cache = Some(cache);
        self.cache_enabled.store(true, AtomicOrdering::Release);
        Some(slot.generation)
    }

    /// Drops the decode cache and all of its entries. A no-op if the cache is
    /// not enabled.
    pub fn destroy_cache(&self) {
        let mut slot = self.lock_cache();
        self.take_cache(&mut slot);
    }

    /// Destroys the cache only if it is still the one enabled as
    /// `generation`.
    pub(crate) fn destroy_cache_generation(&self, generation: u64) {
        let mut slot = self.lock_cache();
        if slot.generation == generation {
            self.take_cache(&mut slot);
        }
    }

    fn take_cache(&self, slot: &mut CacheSlot) {
        self.cache_enabled.store(false, AtomicOrdering::Release);
        if let Some(_cache) = slot.cache.take() {
            #[cfg(feature = "tracing")]
            tracing::debug!(entries = _cache.len(), "decode cache destroyed");
        }
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.cache_enabled.load(AtomicOrdering::Acquire)
    }

    /// Number of memoized entries, or 0 when the cache is disabled.
    pub fn cache_len(&self) -> usize {
        self.lock_cache().cache.as_ref().map_or(0, DecodeCache::len)
    }

    /// Enables the cache for the lifetime of the returned guard.
    pub fn cache_scope(&self) -> CacheScope<'_, T> {
        CacheScope::new(self)
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, State>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    // A panic while holding the cache lock cannot leave a half-written entry
    // behind, so poisoning is ignored to keep `decode` infallible.
    fn lock_cache(&self) -> MutexGuard<'_, CacheSlot> {
        #[cfg(feature = "parking-lot")]
        {
            self.cache.lock()
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            self.cache.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Spins until the clock reads later than `last`. Runs with the state lock
    /// held.
    #[cold]
    #[inline(never)]
    fn wait_past(&self, last: i64) -> i64 {
        #[cfg(feature = "tracing")]
        tracing::debug!(last, "sequence exhausted, waiting for next millisecond");
        loop {
            let now = self.time.current_millis();
            if now > last {
                return now;
            }
            core::hint::spin_loop();
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: i64, last: i64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(now, last, drift_ms = last - now, "clock moved backwards");
        Error::ClockMovedBackwards { now, last }
    }
}

impl<T> fmt::Debug for SnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeGenerator")
            .field("config", &self.config)
            .field("cache_enabled", &self.is_cache_enabled())
            .finish_non_exhaustive()
    }
}
