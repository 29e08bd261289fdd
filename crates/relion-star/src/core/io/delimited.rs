use super::writer::format_float;
use crate::core::error::StarError;
use crate::core::models::table::Table;
use crate::core::models::value::Value;
use std::io::Write;

/// Writes a table as delimited text with a header row of labels.
///
/// Floats use the same fixed precision as the STAR writer; quoting follows
/// the CSV conventions of the `csv` crate rather than STAR rules.
pub fn write_delimited(
    table: &Table,
    writer: impl Write,
    delimiter: u8,
    float_precision: usize,
) -> Result<(), StarError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    csv_writer.write_record(table.labels())?;
    for row in table.rows() {
        csv_writer.write_record(row.values().iter().map(|value| match value {
            Value::Int(v) => v.to_string(),
            Value::Float(v) => format_float(*v, float_precision),
            Value::Str(v) => v.clone(),
        }))?;
    }
    csv_writer.flush()?;
    Ok(())
}
