//! # Core Module
//!
//! The building blocks for working with Relion STAR metadata.
//!
//! ## Architecture
//!
//! - **Data Model** ([`models`]) - Typed values, tables, and multi-block files
//! - **File I/O** ([`io`]) - STAR parsing and writing, table locators, CSV export
//! - **Label Types** ([`labels`]) - Declared value types of known Relion labels
//! - **Errors** ([`error`]) - Parse and lookup errors shared by the layers above
//!
//! Every operation here is a synchronous transformation of values the caller
//! owns. There is no process-wide state; parse settings travel in
//! [`io::parser::ParseOptions`] and write settings in
//! [`io::writer::WriteOptions`].

pub mod error;
pub mod io;
pub mod labels;
pub mod models;
