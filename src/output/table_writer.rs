//! Result table output
//!
//! A plain text table: the `# ID MEAN MAX MIN` header, then one
//! space-separated row per feature with the statistics to two decimals.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use log::info;

use crate::stats::CellStats;
use crate::utils::format_utils::format_fixed2;

/// Header line of every table
pub const TABLE_HEADER: &str = "# ID MEAN MAX MIN";

/// Statistics of one feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultRow {
    pub id: i64,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

impl ResultRow {
    pub fn new(id: i64, stats: &CellStats) -> Self {
        ResultRow { id, mean: stats.mean, max: stats.max, min: stats.min }
    }

    /// The row as written, without line ending
    pub fn format(&self) -> String {
        format!("{} {} {} {}", self.id, format_fixed2(self.mean), format_fixed2(self.max), format_fixed2(self.min))
    }
}

/// Writes result tables
pub struct TableWriter;

impl TableWriter {
    /// Writes the table to `writer`
    pub fn write_to(rows: &[ResultRow], writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "{}", TABLE_HEADER)?;
        for row in rows {
            writeln!(writer, "{}", row.format())?;
        }
        Ok(())
    }

    /// Writes the table to `path`, replacing any existing file
    ///
    /// The parent directory must exist.
    pub fn write(rows: &[ResultRow], path: &str) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        Self::write_to(rows, &mut writer)?;
        writer.flush()?;

        info!("Wrote {} rows to {}", rows.len(), path);
        Ok(())
    }
}
