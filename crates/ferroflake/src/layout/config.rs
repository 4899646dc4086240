use crate::{Error, IdComponents, Result};
use std::borrow::Cow;

/// Default width of the per-millisecond sequence counter.
pub const DEFAULT_SEQUENCE_BITS: u8 = 12;

/// Default width of each of the two default origin fields.
pub const DEFAULT_ORIGIN_BITS: u8 = 5;

/// Name of the first default origin field.
pub const DATACENTER_ID: &str = "dataCenterId";

/// Name of the second default origin field.
pub const WORKER_ID: &str = "workerId";

/// Widest origin or sequence field; components are carried as `u32`.
const MAX_FIELD_BITS: u8 = 32;

/// Bits below the reserved sign bit.
const USABLE_BITS: u32 = 63;

/// One origin-identifier field of a layout: its name and how many bits it
/// occupies.
///
/// Fields are packed most-significant-first in declaration order, directly
/// below the timestamp and above the sequence.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OriginField {
    pub name: Cow<'static, str>,
    pub bits: u8,
}

impl OriginField {
    pub fn new(name: impl Into<Cow<'static, str>>, bits: u8) -> Self {
        Self {
            name: name.into(),
            bits,
        }
    }

    /// The classic Twitter split: a 5-bit datacenter ID followed by a 5-bit
    /// worker ID.
    pub fn defaults() -> [Self; 2] {
        [
            Self::new(DATACENTER_ID, DEFAULT_ORIGIN_BITS),
            Self::new(WORKER_ID, DEFAULT_ORIGIN_BITS),
        ]
    }
}

/// An origin field after resolution: its position in the packed ID and the
/// value this configuration stamps into it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedField {
    pub name: Cow<'static, str>,
    pub bits: u8,
    /// Distance of the field's least-significant bit from bit 0.
    pub shift: u8,
    /// Largest value the field can hold (`2^bits - 1`).
    pub max_value: u32,
    pub value: u32,
}

/// An immutable, validated bit layout plus the origin identifiers of one
/// generator.
///
/// ```text
///  Bit Index:  63           63 62                                 0
///              +--------------+-----------+-------+-----+----------+
///  Field:      | reserved (1) | timestamp | origin[0] ... | sequence |
///              +--------------+-----------+-------+-----+----------+
///              |<------------ MSB ------- 64 bits ------- LSB ---->|
/// ```
///
/// The timestamp occupies every bit between the reserved sign bit and the
/// first origin field. Whether a multi-decade timestamp actually fits there is
/// the caller's responsibility; see [`Config::max_timestamp`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    epoch: i64,
    sequence_bits: u8,
    sequence_mask: i64,
    timestamp_shift: u8,
    fields: Vec<ResolvedField>,
    // All origin values, pre-shifted into place.
    origin_bits: i64,
}

/// Resolves the default layout (two 5-bit fields, 12-bit sequence) for the
/// given epoch and `[dataCenterId, workerId]` values.
///
/// # Example
///
/// ```
/// use ferroflake::{configure, Error};
///
/// let config = configure(1_700_000_000_000, &[1, 31]).unwrap();
/// assert_eq!(config.timestamp_shift(), 22);
///
/// let err = configure(1_700_000_000_000, &[32, 0]).unwrap_err();
/// assert!(matches!(err, Error::InvalidOriginValue { value: 32, .. }));
/// ```
pub fn configure(epoch: i64, origin_values: &[u32]) -> Result<Config> {
    Config::resolve(
        epoch,
        origin_values,
        &OriginField::defaults(),
        DEFAULT_SEQUENCE_BITS,
    )
}

impl Config {
    /// Validates the requested layout and derives every mask and shift.
    ///
    /// # Errors
    ///
    /// - [`Error::OriginCountMismatch`] if `origin_values` and `fields` differ
    ///   in length.
    /// - [`Error::InvalidBitWidth`] if the sequence or any field is 0 bits or
    ///   wider than 32 bits.
    /// - [`Error::LayoutOverflow`] if the low fields leave no timestamp bits.
    /// - [`Error::InvalidOriginValue`] for the first field, in declaration
    ///   order, whose value exceeds `2^bits - 1`.
    pub fn resolve(
        epoch: i64,
        origin_values: &[u32],
        fields: &[OriginField],
        sequence_bits: u8,
    ) -> Result<Self> {
        if origin_values.len() != fields.len() {
            return Err(Error::OriginCountMismatch {
                expected: fields.len(),
                actual: origin_values.len(),
            });
        }

        check_width("sequence", sequence_bits)?;
        for field in fields {
            check_width(&field.name, field.bits)?;
        }

        let low_bits = u32::from(sequence_bits)
            + fields.iter().map(|f| u32::from(f.bits)).sum::<u32>();
        if low_bits >= USABLE_BITS {
            return Err(Error::LayoutOverflow { bits: low_bits });
        }

        let mut shift = low_bits;
        let mut resolved = Vec::with_capacity(fields.len());
        let mut origin_bits = 0i64;
        for (field, &value) in fields.iter().zip(origin_values) {
            shift -= u32::from(field.bits);
            let max_value = low_mask(field.bits);
            if value > max_value {
                return Err(Error::InvalidOriginValue {
                    field: field.name.to_string(),
                    value,
                    max: max_value,
                });
            }
            origin_bits |= i64::from(value) << shift;
            resolved.push(ResolvedField {
                name: field.name.clone(),
                bits: field.bits,
                shift: shift as u8,
                max_value,
                value,
            });
        }
        debug_assert_eq!(shift, u32::from(sequence_bits));

        Ok(Self {
            epoch,
            sequence_bits,
            sequence_mask: i64::from(low_mask(sequence_bits)),
            timestamp_shift: low_bits as u8,
            fields: resolved,
            origin_bits,
        })
    }

    /// The zero point, in milliseconds since the UNIX epoch, subtracted from
    /// every packed timestamp.
    pub const fn epoch(&self) -> i64 {
        self.epoch
    }

    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    /// `2^sequence_bits - 1`
    pub const fn sequence_mask(&self) -> i64 {
        self.sequence_mask
    }

    /// Largest sequence value within one millisecond.
    pub const fn max_sequence(&self) -> u32 {
        self.sequence_mask as u32
    }

    /// Sequence bits plus all origin bits.
    pub const fn timestamp_shift(&self) -> u8 {
        self.timestamp_shift
    }

    /// Bits left for the timestamp below the reserved sign bit.
    pub const fn timestamp_bits(&self) -> u8 {
        USABLE_BITS as u8 - self.timestamp_shift
    }

    /// The last wall-clock millisecond this layout can encode without
    /// spilling into the reserved bit.
    pub fn max_timestamp(&self) -> i64 {
        let span = (1i64 << self.timestamp_bits()) - 1;
        self.epoch.saturating_add(span)
    }

    /// Resolved origin fields, most significant first.
    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    /// This configuration's origin values, in declaration order.
    pub fn origin_values(&self) -> Vec<u32> {
        self.fields.iter().map(|f| f.value).collect()
    }

    /// Position of the origin field called `name`, if any.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Packs a wall-clock timestamp and sequence with this configuration's own
    /// origin values.
    pub(crate) fn pack(&self, timestamp: i64, sequence: u32) -> i64 {
        (timestamp.wrapping_sub(self.epoch) << self.timestamp_shift)
            | self.origin_bits
            | (i64::from(sequence) & self.sequence_mask)
    }

    /// Packs arbitrary components into an ID using this layout.
    ///
    /// `timestamp` is wall-clock milliseconds (the epoch is subtracted here).
    /// Origin values and the sequence are masked to their field widths, so
    /// out-of-range inputs are truncated rather than bleeding into
    /// neighbouring fields.
    ///
    /// # Example
    ///
    /// ```
    /// use ferroflake::configure;
    ///
    /// let config = configure(1_700_000_000_000, &[1, 1]).unwrap();
    /// let id = config.compose(1_700_000_000_005, &[3, 4], 7);
    /// let parts = config.decompose(id);
    ///
    /// assert_eq!(parts.timestamp, 1_700_000_000_005);
    /// assert_eq!(parts.origin_values, vec![3, 4]);
    /// assert_eq!(parts.sequence, 7);
    /// ```
    pub fn compose(&self, timestamp: i64, origin_values: &[u32], sequence: u32) -> i64 {
        debug_assert_eq!(origin_values.len(), self.fields.len(), "origin count");
        let origins = self
            .fields
            .iter()
            .zip(origin_values)
            .fold(0i64, |acc, (field, &value)| {
                acc | (i64::from(value & field.max_value) << field.shift)
            });
        (timestamp.wrapping_sub(self.epoch) << self.timestamp_shift)
            | origins
            | (i64::from(sequence) & self.sequence_mask)
    }

    /// Splits an ID into its components. Never fails: any bit pattern decodes
    /// to something, whether or not this layout produced it.
    pub fn decompose(&self, id: i64) -> IdComponents {
        IdComponents {
            timestamp: (id >> self.timestamp_shift).wrapping_add(self.epoch),
            origin_values: self
                .fields
                .iter()
                .map(|f| ((id >> f.shift) & i64::from(f.max_value)) as u32)
                .collect(),
            sequence: (id & self.sequence_mask) as u32,
        }
    }
}

fn check_width(field: &str, bits: u8) -> Result<()> {
    if bits == 0 || bits > MAX_FIELD_BITS {
        return Err(Error::InvalidBitWidth {
            field: field.to_string(),
            bits,
        });
    }
    Ok(())
}

/// `2^bits - 1` for `1 <= bits <= 32`.
const fn low_mask(bits: u8) -> u32 {
    u32::MAX >> (MAX_FIELD_BITS - bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPOCH: i64 = 1_700_000_000_000;

    #[test]
    fn default_layout_shifts_and_masks() {
        let config = configure(EPOCH, &[1, 2]).unwrap();
        assert_eq!(config.sequence_bits(), 12);
        assert_eq!(config.sequence_mask(), 4095);
        assert_eq!(config.timestamp_shift(), 22);
        assert_eq!(config.timestamp_bits(), 41);

        let fields = config.fields();
        assert_eq!(fields[0].name, DATACENTER_ID);
        assert_eq!(fields[0].shift, 17);
        assert_eq!(fields[0].max_value, 31);
        assert_eq!(fields[1].name, WORKER_ID);
        assert_eq!(fields[1].shift, 12);
        assert_eq!(config.origin_values(), vec![1, 2]);
    }

    #[test]
    fn origin_value_boundaries() {
        assert!(configure(EPOCH, &[0, 0]).is_ok());
        assert!(configure(EPOCH, &[31, 31]).is_ok());
        assert_eq!(
            configure(EPOCH, &[32, 0]),
            Err(Error::InvalidOriginValue {
                field: DATACENTER_ID.to_string(),
                value: 32,
                max: 31,
            })
        );
        assert_eq!(
            configure(EPOCH, &[0, 32]),
            Err(Error::InvalidOriginValue {
                field: WORKER_ID.to_string(),
                value: 32,
                max: 31,
            })
        );
    }

    #[test]
    fn first_invalid_field_is_reported() {
        let err = configure(EPOCH, &[40, 50]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid origin value for `dataCenterId`: 40 exceeds maximum 31"
        );
        assert!(matches!(
            err,
            Error::InvalidOriginValue { ref field, value: 40, .. } if field == DATACENTER_ID
        ));
    }

    #[test]
    fn custom_layout_packs_most_significant_first() {
        let fields = [
            OriginField::new("region", 3),
            OriginField::new("rack", 4),
            OriginField::new("node", 6),
        ];
        let config = Config::resolve(EPOCH, &[5, 9, 60], &fields, 10).unwrap();
        let shifts: Vec<u8> = config.fields().iter().map(|f| f.shift).collect();
        assert_eq!(shifts, vec![20, 16, 10]);
        assert_eq!(config.timestamp_shift(), 23);
        assert_eq!(config.field_index("rack"), Some(1));
        assert_eq!(config.field_index("missing"), None);
    }

    #[test]
    fn layout_without_origin_fields() {
        let config = Config::resolve(0, &[], &[], 16).unwrap();
        assert_eq!(config.timestamp_shift(), 16);
        let id = config.pack(1_000, 3);
        assert_eq!(id, (1_000 << 16) | 3);
    }

    #[test]
    fn mismatched_origin_count_is_rejected() {
        assert_eq!(
            configure(EPOCH, &[1]),
            Err(Error::OriginCountMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn invalid_bit_widths_are_rejected() {
        let err = Config::resolve(EPOCH, &[0, 0], &OriginField::defaults(), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidBitWidth { bits: 0, .. }));

        let fields = [OriginField::new("wide", 33)];
        let err = Config::resolve(EPOCH, &[0], &fields, 12).unwrap_err();
        assert!(matches!(err, Error::InvalidBitWidth { bits: 33, .. }));
    }

    #[test]
    fn layout_without_timestamp_room_is_rejected() {
        let fields = [OriginField::new("a", 32), OriginField::new("b", 20)];
        let err = Config::resolve(EPOCH, &[0, 0], &fields, 11).unwrap_err();
        assert_eq!(err, Error::LayoutOverflow { bits: 63 });
    }

    #[test]
    fn compose_masks_out_of_range_components() {
        let config = configure(EPOCH, &[0, 0]).unwrap();
        let id = config.compose(EPOCH, &[0xFF, 0], 0x1_0001);
        let parts = config.decompose(id);
        assert_eq!(parts.origin_values, vec![31, 0]);
        assert_eq!(parts.sequence, 1);
        assert_eq!(parts.timestamp, EPOCH);
    }

    #[test]
    fn decompose_reverses_pack() {
        let config = configure(EPOCH, &[1, 1]).unwrap();
        let id = config.pack(EPOCH + 5, 0);
        assert_eq!(id, (5 << 22) | (1 << 17) | (1 << 12));

        let parts = config.decompose(id);
        assert_eq!(parts.timestamp, EPOCH + 5);
        assert_eq!(parts.origin_values, vec![1, 1]);
        assert_eq!(parts.sequence, 0);
    }

    #[test]
    fn decompose_accepts_any_bit_pattern() {
        let config = configure(EPOCH, &[1, 1]).unwrap();
        for id in [0, -1, i64::MIN, i64::MAX] {
            let parts = config.decompose(id);
            assert!(parts.sequence <= config.max_sequence());
        }
    }

    #[test]
    fn max_timestamp_spans_the_timestamp_field() {
        let config = configure(0, &[0, 0]).unwrap();
        assert_eq!(config.max_timestamp(), (1 << 41) - 1);
        let id = config.pack(config.max_timestamp(), config.max_sequence());
        assert!(id > 0);
    }
}
