use crate::core::error::StarError;
use crate::core::models::star_file::{BlockStyle, DataBlock, StarFile};
use crate::core::models::table::Table;
use crate::core::models::value::{ColumnType, Value};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::debug;

/// Relion writes six decimals for coordinates, shifts and defocus values.
pub const DEFAULT_FLOAT_PRECISION: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct WriteOptions {
    /// Number of decimals written for float values.
    pub float_precision: usize,
    /// Append Relion's `#N` column index to each label declaration.
    pub column_numbers: bool,
    /// Pad fields so that columns line up.
    pub align_columns: bool,
    /// Written as `# <text>` before each block header.
    pub header_comment: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            float_precision: DEFAULT_FLOAT_PRECISION,
            column_numbers: true,
            align_columns: true,
            header_comment: None,
        }
    }
}

pub fn format_float(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let mut text = format!("{:.*}", precision, value);
    if precision == 0 {
        text.push('.');
    }
    text
}

const RESERVED_PREFIXES: [&str; 5] = ["data_", "loop_", "save_", "global_", "stop_"];

fn needs_quoting(s: &str) -> bool {
    if s.is_empty()
        || s.contains(char::is_whitespace)
        || s.starts_with(['_', '#', '\'', '"'])
    {
        return true;
    }
    let lower = s.to_ascii_lowercase();
    if RESERVED_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return true;
    }
    ColumnType::infer(s) != ColumnType::Str
}

/// A quoted value ends at the first quote character followed by whitespace,
/// so a quote is only usable if no such pair occurs inside the text.
fn pick_quote(s: &str) -> Option<char> {
    if s.contains(['\n', '\r']) {
        return None;
    }
    ['"', '\''].into_iter().find(|&quote| {
        !s.chars()
            .zip(s.chars().skip(1))
            .any(|(c, next)| c == quote && next.is_whitespace())
    })
}

/// Quotes a string when writing it bare would change how it reads back.
///
/// # Errors
///
/// Returns [`StarError::UnwritableValue`] when no quoting reads back as the
/// same text: the value holds a line break, or both quote characters occur
/// followed by whitespace.
pub fn quote_if_needed(s: &str) -> Result<String, StarError> {
    if !needs_quoting(s) {
        return Ok(s.to_string());
    }
    let quote = pick_quote(s).ok_or_else(|| StarError::UnwritableValue(s.to_string()))?;
    Ok(format!("{quote}{s}{quote}"))
}

pub fn format_value(value: &Value, precision: usize) -> Result<String, StarError> {
    match value {
        Value::Int(v) => Ok(v.to_string()),
        Value::Float(v) => Ok(format_float(*v, precision)),
        Value::Str(v) => quote_if_needed(v),
    }
}

fn write_pairs(table: &Table, writer: &mut impl Write, options: &WriteOptions) -> Result<(), StarError> {
    let width = if options.align_columns {
        table.labels().map(|l| l.len() + 1).max().unwrap_or(0)
    } else {
        0
    };
    if let Some(row) = table.row(0) {
        let fields = row
            .values()
            .iter()
            .map(|v| format_value(v, options.float_precision))
            .collect::<Result<Vec<_>, _>>()?;
        for (column, field) in table.columns().iter().zip(fields) {
            let label = format!("_{}", column.label());
            writeln!(writer, "{:<width$} {}", label, field, width = width)?;
        }
    }
    Ok(())
}

fn write_loop(table: &Table, writer: &mut impl Write, options: &WriteOptions) -> Result<(), StarError> {
    if table.num_columns() == 0 {
        return Ok(());
    }
    let formatted = table
        .rows()
        .map(|row| {
            row.values()
                .iter()
                .map(|v| format_value(v, options.float_precision))
                .collect::<Result<Vec<String>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    writeln!(writer, "loop_")?;
    for (i, label) in table.labels().enumerate() {
        if options.column_numbers {
            writeln!(writer, "_{} #{}", label, i + 1)?;
        } else {
            writeln!(writer, "_{}", label)?;
        }
    }

    if !options.align_columns {
        for fields in &formatted {
            writeln!(writer, "{}", fields.join(" "))?;
        }
        return Ok(());
    }

    let mut widths = vec![0usize; table.num_columns()];
    for row in &formatted {
        for (width, field) in widths.iter_mut().zip(row) {
            *width = (*width).max(field.chars().count());
        }
    }
    let numeric: Vec<bool> = table.columns().iter().map(|c| c.kind().is_numeric()).collect();

    for row in &formatted {
        let mut line = String::new();
        for (i, field) in row.iter().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            let pad = widths[i].saturating_sub(field.chars().count());
            let last = i + 1 == row.len();
            if numeric[i] {
                line.extend(std::iter::repeat_n(' ', pad));
                line.push_str(field);
            } else {
                line.push_str(field);
                if !last {
                    line.extend(std::iter::repeat_n(' ', pad));
                }
            }
        }
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

pub fn write_block(
    block: &DataBlock,
    writer: &mut impl Write,
    options: &WriteOptions,
) -> Result<(), StarError> {
    if block.name().contains(char::is_whitespace) {
        return Err(StarError::InvalidBlockName(block.name().to_string()));
    }
    if let Some(comment) = &options.header_comment {
        writeln!(writer, "# {}", comment)?;
        writeln!(writer)?;
    }
    writeln!(writer, "data_{}", block.name())?;
    writeln!(writer)?;

    let table = block.table();
    match block.style() {
        BlockStyle::Pairs if table.len() == 1 => write_pairs(table, writer, options)?,
        _ => write_loop(table, writer, options)?,
    }
    writeln!(writer)?;
    Ok(())
}

pub fn write_file(
    file: &StarFile,
    writer: &mut impl Write,
    options: &WriteOptions,
) -> Result<(), StarError> {
    for block in file.blocks() {
        write_block(block, writer, options)?;
    }
    debug!(
        "Wrote {} data block(s) with {} float decimals",
        file.len(),
        options.float_precision
    );
    Ok(())
}
