/// The outcome of a non-blocking generation attempt.
///
/// Returned by [`SnowflakeGenerator::poll_generate`]:
///
/// - [`IdGenStatus::Ready`] carries a newly minted ID.
/// - [`IdGenStatus::Pending`] means the sequence for the current millisecond
///   is exhausted. Nothing was consumed; retry once the clock has advanced.
///
/// # Example
///
/// ```
/// use ferroflake::{configure, IdGenStatus, SnowflakeGenerator};
///
/// let generator = SnowflakeGenerator::new(configure(0, &[1, 1]).unwrap());
///
/// let id = loop {
///     match generator.poll_generate().unwrap() {
///         IdGenStatus::Ready { id } => break id,
///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
///     }
/// };
/// assert!(id > 0);
/// ```
///
/// [`SnowflakeGenerator::poll_generate`]: crate::SnowflakeGenerator::poll_generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The packed ID.
        id: i64,
    },
    /// No ID could be generated because the sequence has been exhausted for
    /// the current millisecond.
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: i64,
    },
}
