//! # relion-star
//!
//! Reading, writing, and column-level access for STAR metadata files as
//! produced and consumed by Relion.
//!
//! ## Architectural Philosophy
//!
//! The library is split into two layers with a one-way dependency.
//!
//! - **[`core`]: The Foundation.** Typed values and tables (`Value`, `Table`,
//!   `StarFile`), the STAR parser and writer, the label registry, and the
//!   error types every other layer builds on. Parsing keeps all state in a
//!   per-call context, so concurrent reads of different files need no
//!   coordination.
//!
//! - **[`workflows`]: Metadata Procedures.** Operations that combine several
//!   tables or derive new columns, such as defocus grouping and the optics
//!   join of Relion 3.1 files.
//!
//! ## Example
//!
//! ```
//! use relion_star::core::io::parser::ParseOptions;
//! use relion_star::core::io::writer::WriteOptions;
//! use relion_star::core::models::star_file::StarFile;
//!
//! let text = "data_\nloop_\n_rlnImageName\n_rlnDefocusU\n1@a.mrcs 10000.5\n2@a.mrcs 10250.0\n";
//! let star = StarFile::parse_str(text, &ParseOptions::relion()).unwrap();
//! let table = star.table(None).unwrap();
//! assert_eq!(table.float_column("rlnDefocusU").unwrap(), vec![10000.5, 10250.0]);
//!
//! let written = star.to_star_string(&WriteOptions::default()).unwrap();
//! assert!(written.starts_with("data_\n"));
//! ```

pub mod core;
pub mod workflows;
