//! CSV serialization of records for an explicit column order.

use csv::{Terminator, WriterBuilder};
use serde_json::Value;

use crate::error::ReportError;
use crate::record::Record;

/// Writes a header row from `headers`, then one row per record.
///
/// Columns missing from a record are written as empty cells. Rows end in
/// `\r\n` and use standard CSV quoting.
///
/// # Errors
///
/// Returns [`ReportError::Csv`] if the writer fails, or [`ReportError::Utf8`]
/// if the output is not valid UTF-8.
pub fn to_csv<'a, I>(records: I, headers: &[String]) -> Result<String, ReportError>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for record in records {
        writer.write_record(headers.iter().map(|column| cell_text(record.get(column))))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Renders a cell: strings raw, `null` and missing as empty, anything else as JSON text.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
