//! Delimited text encoding for record tables.

use serde::Serialize;

/// Encodes `rows` as comma-separated text with a header row.
///
/// Column names and order come from the row type's field order. Fields that
/// contain commas, quotes or newlines are quoted. An empty slice encodes to
/// an empty buffer (no header).
pub fn encode_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
