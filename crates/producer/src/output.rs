//! JSON document emission

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

/// Write `records` as one compact JSON array followed by a newline.
///
/// Returns the number of records written.
pub fn write_document<W: Write, T: Serialize>(mut writer: W, records: &[T]) -> Result<usize> {
    serde_json::to_writer(&mut writer, records).context("Failed to serialize metric document")?;
    writeln!(writer).context("Failed to write metric document")?;
    writer.flush().context("Failed to flush metric document")?;

    Ok(records.len())
}
