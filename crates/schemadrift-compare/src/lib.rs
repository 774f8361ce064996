//! Comparison engine for schemadrift.
//!
//! [`SchemaComparer`] walks a model snapshot against a database snapshot and
//! builds a [`CompareLog`](schemadrift_core::CompareLog) tree. The first pass
//! matches entities to tables and compares columns, keys, indexes and check
//! constraints; a clean first pass may be followed by a scan for database
//! objects the model never referenced.

mod brackets;
mod check_constraints;
mod columns;
mod comparer;
mod errors;
mod foreign_keys;
mod indexes;
mod logger;
mod report;
mod tables;
mod unused;

pub use brackets::{normalize, remove_unnecessary_brackets};
pub use comparer::{CompareOutcome, SchemaComparer};
pub use errors::{CompareError, Result};
pub use report::flatten;
