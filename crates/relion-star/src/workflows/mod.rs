//! # Workflows Module
//!
//! Higher-level metadata operations built on the [`core`](crate::core) table
//! model, as used when preparing Relion refinement inputs.
//!
//! ## Architecture
//!
//! - **Defocus Groups** ([`defocus`]) - Grouping of particles by mean defocus
//!   into `rlnGroupNumber`
//! - **Optics Join** ([`optics`]) - Copying per-group optics columns into the
//!   particle or micrograph rows of a Relion 3.1 file
//! - **Error Handling** ([`error`]) - Workflow errors wrapping the core ones
//!
//! Workflows never modify their inputs in place unless they take `&mut Table`,
//! and they report progress through `tracing`.

pub mod defocus;
pub mod error;
pub mod optics;
