use crate::{IdComponents, SnowflakeGenerator, TimeSource};
use core::ops::Deref;
use std::collections::HashMap;

/// Memoized decode results, keyed by the packed ID.
///
/// Entries are added lazily and never evicted; the cache grows with the number
/// of distinct IDs decoded through it. It is meant for workloads that decode
/// the same small set of IDs over and over, not as a general-purpose cache.
#[derive(Clone, Debug, Default)]
pub struct DecodeCache {
    entries: HashMap<i64, IdComponents>,
}

impl DecodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, id: i64) -> Option<&IdComponents> {
        self.entries.get(&id)
    }

    pub fn insert(&mut self, id: i64, components: IdComponents) {
        self.entries.insert(id, components);
    }

    /// Returns the cached entry for `id`, computing and storing it on a miss.
    pub fn get_or_insert_with(
        &mut self,
        id: i64,
        decode: impl FnOnce() -> IdComponents,
    ) -> &IdComponents {
        self.entries.entry(id).or_insert_with(decode)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The generator's cache slot. `generation` is bumped on every enable, so a
/// [`CacheScope`] can tell whether the cache it enabled is still the live one.
#[derive(Debug, Default)]
pub(crate) struct CacheSlot {
    pub(crate) cache: Option<DecodeCache>,
    pub(crate) generation: u64,
}

/// Keeps a generator's decode cache alive for a lexical scope.
///
/// Created by [`SnowflakeGenerator::cache_scope`]. If the scope enabled the
/// cache, dropping the scope destroys it again. A cache that was already
/// enabled beforehand is left alone, and so is one enabled by someone else
/// after the scope's own cache was destroyed early.
///
/// # Example
///
/// ```
/// use ferroflake::{configure, SnowflakeGenerator};
///
/// let generator = SnowflakeGenerator::new(configure(0, &[1, 1]).unwrap());
/// let id = generator.generate().unwrap();
///
/// {
///     let scoped = generator.cache_scope();
///     let first = scoped.decode(id);
///     assert_eq!(scoped.decode(id), first);
///     assert_eq!(scoped.cache_len(), 1);
/// }
///
/// assert!(!generator.is_cache_enabled());
/// ```
#[must_use = "the cache is destroyed as soon as the scope is dropped"]
pub struct CacheScope<'a, T: TimeSource> {
    generator: &'a SnowflakeGenerator<T>,
    // Generation of the cache this scope enabled, if it enabled one.
    owned: Option<u64>,
}

impl<'a, T: TimeSource> CacheScope<'a, T> {
    pub(crate) fn new(generator: &'a SnowflakeGenerator<T>) -> Self {
        let owned = generator.enable_cache_generation(DecodeCache::new());
        Self { generator, owned }
    }
}

impl<T: TimeSource> Deref for CacheScope<'_, T> {
    type Target = SnowflakeGenerator<T>;

    fn deref(&self) -> &Self::Target {
        self.generator
    }
}

impl<T: TimeSource> Drop for CacheScope<'_, T> {
    fn drop(&mut self) {
        if let Some(generation) = self.owned {
            self.generator.destroy_cache_generation(generation);
        }
    }
}
