use core::fmt::Write;
use ferroflake::{Config, IdComponents};
use serde::Serialize;

/// One decoded ID as printed by `decode --json`.
#[derive(Serialize)]
pub struct DecodedRecord<'a> {
    pub id: i64,
    #[serde(flatten)]
    pub components: &'a IdComponents,
}

/// `<id> timestamp=<ms> <field>=<value>... sequence=<n>`
pub fn render_plain(config: &Config, id: i64, parts: &IdComponents) -> String {
    let mut line = format!("{id} timestamp={}", parts.timestamp);
    for (field, value) in config.fields().iter().zip(&parts.origin_values) {
        let _ = write!(line, " {}={}", field.name, value);
    }
    let _ = write!(line, " sequence={}", parts.sequence);
    line
}

pub fn render_json(id: i64, parts: &IdComponents) -> serde_json::Result<String> {
    serde_json::to_string(&DecodedRecord {
        id,
        components: parts,
    })
}

/// A human-readable summary of the resolved layout, most significant field
/// first.
pub fn render_layout(config: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "epoch          : {}", config.epoch());
    let _ = writeln!(
        out,
        "timestamp      : {} bits << {} (until {})",
        config.timestamp_bits(),
        config.timestamp_shift(),
        config.max_timestamp()
    );
    for field in config.fields() {
        let _ = writeln!(
            out,
            "{:<15}: {} bits << {} (max {}, value {})",
            field.name, field.bits, field.shift, field.max_value, field.value
        );
    }
    let _ = writeln!(
        out,
        "sequence       : {} bits (max {} per ms)",
        config.sequence_bits(),
        u64::from(config.max_sequence()) + 1
    );
    out
}
