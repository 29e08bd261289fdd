use super::parser::{self, ParseOptions};
use super::writer::{self, WriteOptions};
use crate::core::error::StarError;
use crate::core::models::star_file::{BlockStyle, DataBlock, StarFile};
use crate::core::models::table::Table;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Defines the interface for reading and writing STAR content.
///
/// Implementors only provide the stream-based methods; the path-based
/// helpers open buffered files and delegate to them.
pub trait StarFormat: Sized {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a value from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the reader fails.
    fn read_from(reader: &mut impl BufRead, options: &ParseOptions) -> Result<Self, Self::Error>;

    /// Writes the value in STAR syntax.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    fn write_to(&self, writer: &mut impl Write, options: &WriteOptions) -> Result<(), Self::Error>;

    /// Reads a value from a file path.
    fn read_from_path<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, options)
    }

    /// Writes the value to a file path, creating or truncating it.
    fn write_to_path<P: AsRef<Path>>(&self, path: P, options: &WriteOptions) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer, options)?;
        writer.flush()?;
        Ok(())
    }
}

impl StarFormat for StarFile {
    type Error = StarError;

    fn read_from(reader: &mut impl BufRead, options: &ParseOptions) -> Result<Self, Self::Error> {
        parser::parse_reader(reader, options)
    }

    fn write_to(&self, writer: &mut impl Write, options: &WriteOptions) -> Result<(), Self::Error> {
        writer::write_file(self, writer, options)
    }
}

/// A bare table reads from a single-block file and writes as an unnamed
/// `data_` block.
impl StarFormat for Table {
    type Error = StarError;

    fn read_from(reader: &mut impl BufRead, options: &ParseOptions) -> Result<Self, Self::Error> {
        parser::parse_reader(reader, options)?.into_table(None)
    }

    fn write_to(&self, writer: &mut impl Write, options: &WriteOptions) -> Result<(), Self::Error> {
        let block = DataBlock::new("", BlockStyle::Loop, self.clone());
        writer::write_block(&block, writer, options)
    }
}

impl StarFile {
    pub fn parse_str(content: &str, options: &ParseOptions) -> Result<Self, StarError> {
        parser::parse_str(content, options)
    }

    /// Serializes the file into a string.
    ///
    /// # Errors
    ///
    /// Fails for the same content [`writer::write_file`] rejects, such as a
    /// string value that no quoting can represent.
    pub fn to_star_string(&self, options: &WriteOptions) -> Result<String, StarError> {
        let mut buffer = Vec::new();
        writer::write_file(self, &mut buffer, options)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl FromStr for StarFile {
    type Err = StarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_str(s, &ParseOptions::default())
    }
}
