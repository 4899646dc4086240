use crate::{
    CUSTOM_EPOCH, Config, DATACENTER_ID, DEFAULT_ORIGIN_BITS, DEFAULT_SEQUENCE_BITS, OriginField,
    Result, WORKER_ID,
};
use std::borrow::Cow;

/// Fluent construction of a [`Config`].
///
/// Starts from [`CUSTOM_EPOCH`], a 12-bit sequence and **no** origin fields;
/// fields are appended most-significant-first in call order. Nothing is
/// validated until [`ConfigBuilder::build`].
///
/// # Example
///
/// ```
/// use ferroflake::{Config, TWITTER_EPOCH};
///
/// let config = Config::builder()
///     .epoch(TWITTER_EPOCH)
///     .origin("region", 3, 2)
///     .origin("node", 7, 100)
///     .sequence_bits(12)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.timestamp_shift(), 22);
/// assert_eq!(config.origin_values(), vec![2, 100]);
/// ```
#[derive(Clone, Debug)]
#[must_use]
pub struct ConfigBuilder {
    epoch: i64,
    fields: Vec<OriginField>,
    values: Vec<u32>,
    sequence_bits: u8,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            epoch: CUSTOM_EPOCH,
            fields: Vec::new(),
            values: Vec::new(),
            sequence_bits: DEFAULT_SEQUENCE_BITS,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

impl ConfigBuilder {
    pub fn epoch(mut self, epoch: i64) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn sequence_bits(mut self, bits: u8) -> Self {
        self.sequence_bits = bits;
        self
    }

    /// Appends an origin field of `bits` width carrying `value`.
    pub fn origin(mut self, name: impl Into<Cow<'static, str>>, bits: u8, value: u32) -> Self {
        self.fields.push(OriginField::new(name, bits));
        self.values.push(value);
        self
    }

    /// Appends the default 5-bit `dataCenterId` field.
    pub fn datacenter_id(self, value: u32) -> Self {
        self.origin(DATACENTER_ID, DEFAULT_ORIGIN_BITS, value)
    }

    /// Appends the default 5-bit `workerId` field.
    pub fn worker_id(self, value: u32) -> Self {
        self.origin(WORKER_ID, DEFAULT_ORIGIN_BITS, value)
    }

    /// Resolves the accumulated layout.
    ///
    /// # Errors
    ///
    /// Any error [`Config::resolve`] reports.
    pub fn build(self) -> Result<Config> {
        Config::resolve(self.epoch, &self.values, &self.fields, self.sequence_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, configure};

    #[test]
    fn builder_matches_configure() {
        let built = Config::builder()
            .epoch(1_700_000_000_000)
            .datacenter_id(4)
            .worker_id(9)
            .build()
            .unwrap();
        assert_eq!(built, configure(1_700_000_000_000, &[4, 9]).unwrap());
    }

    #[test]
    fn builder_defaults_to_custom_epoch_without_origins() {
        let config = Config::builder().build().unwrap();
        assert_eq!(config.epoch(), CUSTOM_EPOCH);
        assert!(config.fields().is_empty());
        assert_eq!(config.timestamp_shift(), DEFAULT_SEQUENCE_BITS);
    }

    #[test]
    fn builder_reports_invalid_values_on_build() {
        let err = Config::builder()
            .datacenter_id(1)
            .worker_id(99)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOriginValue { value: 99, .. }));
    }
}
