use crate::Config;
use core::fmt;

/// Renders an ID as a table of its bit fields under a given layout.
///
/// ```text
/// 0x0000000001421000 (21106688)
///     +--------------+----------------+--------------------+----------------+---------------+
///     | reserved (1) | timestamp (41) |  dataCenterId (5)  |  workerId (5)  | sequence (12) |
///     +--------------+----------------+--------------------+----------------+---------------+
///     |      0       |       5        |         1          |       1        |       0       |
///     |     0x0      |      0x5       |        0x1         |      0x1       |      0x0      |
///     +--------------+----------------+--------------------+----------------+---------------+
/// ```
///
/// The timestamp column shows the raw field (milliseconds since the layout's
/// epoch), not the wall-clock time.
pub struct LayoutView<'a> {
    config: &'a Config,
    id: i64,
}

struct Column {
    label: String,
    value: u64,
}

impl<'a> LayoutView<'a> {
    pub fn new(config: &'a Config, id: i64) -> Self {
        Self { config, id }
    }

    fn columns(&self) -> Vec<Column> {
        let config = self.config;
        let id = self.id;
        let mut columns = Vec::with_capacity(config.fields().len() + 3);

        columns.push(Column {
            label: "reserved (1)".to_string(),
            value: (id as u64) >> 63,
        });
        columns.push(Column {
            label: format!("timestamp ({})", config.timestamp_bits()),
            value: ((id as u64) >> config.timestamp_shift()) & ((1 << config.timestamp_bits()) - 1),
        });
        for field in config.fields() {
            columns.push(Column {
                label: format!("{} ({})", field.name, field.bits),
                value: ((id >> field.shift) & i64::from(field.max_value)) as u64,
            });
        }
        columns.push(Column {
            label: format!("sequence ({})", config.sequence_bits()),
            value: (id & config.sequence_mask()) as u64,
        });
        columns
    }
}

fn center(s: impl ToString, width: usize) -> String {
    let s = s.to_string();
    let pad = width.saturating_sub(s.len());
    let left = pad / 2;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(pad - left))
}

fn border(f: &mut fmt::Formatter<'_>, widths: &[usize]) -> fmt::Result {
    write!(f, "    +")?;
    for &w in widths {
        write!(f, "{}+", "-".repeat(w))?;
    }
    writeln!(f)
}

fn row(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    write!(f, "    |")?;
    for (cell, &w) in cells.iter().zip(widths) {
        write!(f, "{}|", center(cell, w))?;
    }
    writeln!(f)
}

impl fmt::Display for LayoutView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.columns();

        let labels: Vec<String> = columns.iter().map(|c| c.label.clone()).collect();
        let decimals: Vec<String> = columns.iter().map(|c| c.value.to_string()).collect();
        let hexes: Vec<String> = columns.iter().map(|c| format!("0x{:x}", c.value)).collect();

        // +2 for padding
        let widths: Vec<usize> = (0..columns.len())
            .map(|i| labels[i].len().max(decimals[i].len()).max(hexes[i].len()) + 2)
            .collect();

        writeln!(f, "0x{:016x} ({})", self.id, self.id)?;
        border(f, &widths)?;
        row(f, &labels, &widths)?;
        border(f, &widths)?;
        row(f, &decimals, &widths)?;
        row(f, &hexes, &widths)?;
        border(f, &widths)
    }
}

impl fmt::Debug for LayoutView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
