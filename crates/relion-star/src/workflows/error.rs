use thiserror::Error;

use crate::core::error::StarError;
use crate::core::models::table::TableError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Star(#[from] StarError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Row {row} has a non-finite value in column '{label}'")]
    InvalidValue { row: usize, label: String },

    #[error("Row {row} references optics group {group}, which is not defined")]
    UnknownOpticsGroup { row: usize, group: i64 },

    #[error("Input table '{0}' has no rows")]
    EmptyInput(String),
}
