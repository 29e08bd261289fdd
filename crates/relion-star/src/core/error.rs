use crate::core::models::table::TableError;
use crate::core::models::value::ColumnType;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StarError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },

    #[error("File contains {count} data blocks; a block name is required")]
    AmbiguousBlock { count: usize },

    #[error("Data block '{0}' not found")]
    BlockNotFound(String),

    #[error("No data blocks found")]
    EmptyFile,

    #[error("Invalid data block name '{0}': names must not contain whitespace")]
    InvalidBlockName(String),

    #[error("Value {0:?} cannot be written: it contains a line break or both quote characters followed by whitespace")]
    UnwritableValue(String),

    #[error("Invalid label type file '{path}': {message}")]
    TypeHints { path: String, message: String },

    #[error("Delimited export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Table(#[from] TableError),
}

impl StarError {
    pub(crate) fn parse(line: usize, kind: ParseErrorKind) -> Self {
        StarError::Parse { line, kind }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("expected {expected} fields, found {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("value '{value}' in column '{column}' cannot be read as {expected}")]
    TypeCoercion {
        column: String,
        value: String,
        expected: ColumnType,
    },

    #[error("'{0}' appears before any data_ block header")]
    MissingBlockHeader(String),

    #[error("duplicate data block name '{0}'")]
    DuplicateBlock(String),

    #[error("duplicate label '{0}'")]
    DuplicateLabel(String),

    #[error("label '{0}' follows data rows")]
    LabelAfterData(String),

    #[error("loop_ declares no labels")]
    UnterminatedLoop,

    #[error("data row in a loop without labels")]
    LoopWithoutLabels,

    #[error("label '{0}' has no value")]
    MissingValue(String),

    #[error("block mixes loop_ and key/value entries")]
    MixedBlock,

    #[error("unterminated quoted value")]
    UnterminatedQuote,

    #[error("unexpected content '{0}'")]
    Unexpected(String),
}
