use crate::Config;

/// The fields of a decoded ID.
///
/// `timestamp` is wall-clock milliseconds since the UNIX epoch (the layout's
/// epoch already added back). Two values are equal iff every field is equal.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdComponents {
    pub timestamp: i64,
    pub origin_values: Vec<u32>,
    pub sequence: u32,
}

impl IdComponents {
    /// Looks up an origin value by field name in the layout that decoded this
    /// ID.
    ///
    /// # Example
    ///
    /// ```
    /// use ferroflake::{configure, WORKER_ID};
    ///
    /// let config = configure(0, &[3, 7]).unwrap();
    /// let parts = config.decompose(config.compose(42, &[3, 7], 0));
    /// assert_eq!(parts.origin(&config, WORKER_ID), Some(7));
    /// assert_eq!(parts.origin(&config, "shard"), None);
    /// ```
    pub fn origin(&self, config: &Config, name: &str) -> Option<u32> {
        config
            .field_index(name)
            .and_then(|i| self.origin_values.get(i).copied())
    }
}
