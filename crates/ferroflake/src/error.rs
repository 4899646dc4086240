/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `ferroflake` can emit.
///
/// Configuration errors are raised once, by [`Config::resolve`], and are never
/// retried. During steady-state generation the only error a caller should
/// expect is [`Error::ClockMovedBackwards`]. Sequence exhaustion is not an
/// error: [`SnowflakeGenerator::generate`] blocks until the next millisecond.
///
/// [`Config::resolve`]: crate::Config::resolve
/// [`SnowflakeGenerator::generate`]: crate::SnowflakeGenerator::generate
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An origin identifier does not fit the bit width of its field.
    ///
    /// Fields are validated in declaration order and only the first offending
    /// field is reported.
    #[error("invalid origin value for `{field}`: {value} exceeds maximum {max}")]
    InvalidOriginValue {
        field: String,
        value: u32,
        max: u32,
    },

    /// The number of origin values differs from the number of origin fields.
    #[error("expected {expected} origin values, got {actual}")]
    OriginCountMismatch { expected: usize, actual: usize },

    /// A field (or the sequence) was declared with zero bits or with more bits
    /// than a `u32` component can carry.
    #[error("invalid bit width for `{field}`: {bits}")]
    InvalidBitWidth { field: String, bits: u8 },

    /// The sequence and origin fields leave no room for a timestamp below the
    /// reserved sign bit.
    #[error("layout uses {bits} low bits, leaving no room for a timestamp")]
    LayoutOverflow { bits: u32 },

    /// The wall clock reported a time earlier than the last issued ID.
    ///
    /// The generator state is left untouched; the caller decides whether to
    /// retry, back off, or abort.
    #[error("clock moved backwards: now {now}ms is before last issued {last}ms")]
    ClockMovedBackwards { now: i64, last: i64 },

    /// Strict decoding rejected an ID that no generator could have produced.
    #[error("invalid id: {id}")]
    InvalidId { id: i64 },

    /// The generation lock was **poisoned** by a thread that panicked while
    /// holding it.
    ///
    /// `parking_lot` mutexes do not poison, so this variant is not available
    /// with the `parking-lot` feature.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
