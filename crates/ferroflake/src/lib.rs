//! # ferroflake
//!
//! Compact, time-ordered, 64-bit Snowflake-style IDs with a bit layout chosen
//! at runtime.
//!
//! An ID packs, from most to least significant bit: a reserved sign bit, the
//! milliseconds elapsed since a caller-chosen epoch, any number of origin
//! fields (by default a 5-bit datacenter ID and a 5-bit worker ID), and a
//! per-millisecond sequence (12 bits by default).
//!
//! ```
//! use ferroflake::{configure, SnowflakeGenerator};
//!
//! let config = configure(1_700_000_000_000, &[1, 1])?;
//! let generator = SnowflakeGenerator::new(config);
//!
//! let id = generator.generate()?;
//! let parts = generator.decode(id);
//! assert_eq!(parts.origin_values, vec![1, 1]);
//! # Ok::<(), ferroflake::Error>(())
//! ```
//!
//! Generators do not coordinate with each other. Uniqueness across a fleet
//! holds only if every live generator is given distinct origin values.
//!
//! ## Features
//!
//! - `parking-lot`: use `parking_lot` mutexes (no lock poisoning).
//! - `cache-padded`: pad the generator state to a cache line.
//! - `tracing`: emit `tracing` spans and events from the generator.
//! - `serde`: derive `Serialize`/`Deserialize` for [`IdComponents`] and
//!   [`OriginField`].
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod generator;
mod layout;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::layout::*;
pub use crate::time::*;
