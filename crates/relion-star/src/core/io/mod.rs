//! Provides reading and writing of STAR files.
//!
//! The parser and writer are pure transformations between text and
//! [`StarFile`](crate::core::models::star_file::StarFile) values. The
//! [`traits::StarFormat`] trait adds buffered file helpers on top of them, and
//! [`locator::TableLocator`] resolves the `block@path` notation used by Relion
//! job outputs.

pub mod delimited;
pub mod locator;
pub mod parser;
pub mod traits;
pub mod writer;
