//! # Core Models Module
//!
//! In-memory representation of STAR metadata.
//!
//! - [`value`] - The tagged cell value (`Int | Float | Str`) and column types
//! - [`table`] - Typed, ordered tables with the column and row access API
//! - [`star_file`] - Named blocks and the ordered file that holds them
//!
//! ```ignore
//! use relion_star::core::models::{table::Table, value::ColumnType};
//!
//! let mut table = Table::with_columns([
//!     ("rlnImageName", ColumnType::Str),
//!     ("rlnDefocusU", ColumnType::Float),
//! ])?;
//! table.add_row(vec!["000001@particles.mrcs".into(), 10000.0.into()])?;
//! ```

pub mod star_file;
pub mod table;
pub mod value;
