//! Core contracts and helpers for schemadrift.
//!
//! This crate defines both sides of a comparison (the model snapshot and the
//! database snapshot), the comparison log tree, run configuration and the
//! engine dialects shared by the introspector, the comparer and the CLI.

pub mod config;
pub mod constraints;
pub mod dialect;
pub mod error;
pub mod log;
pub mod model;
pub mod model_json;
pub mod naming;
pub mod redaction;
pub mod schema;
pub mod types;
pub mod validation;

pub use config::{CompareConfig, LogIgnore};
pub use constraints::{
    CheckConstraint, Constraint, FkAction, FkMatchType, ForeignKey, Index, PrimaryKey,
    UniqueConstraint,
};
pub use dialect::{Dialect, PostgresDialect, SqlServerDialect, dialect_for};
pub use error::{Error, Result};
pub use log::{CompareAttribute, CompareLog, CompareState, CompareType};
pub use model::{
    ColumnMapping, ModelSchema, SchemaCheckConstraint, SchemaEntity, SchemaForeignKey,
    SchemaIndex, SchemaKey, SchemaProperty,
};
pub use model_json::{model_json_schema, parse_model_json};
pub use naming::{Collation, schema_table, split_schema_table};
pub use redaction::{RedactedConnection, redact_connection_string};
pub use schema::{Column, DatabaseSchema, Schema, Table, TableKind};
pub use types::{
    DefaultLiteral, DeleteBehavior, GeneratedExpression, GeneratedKind, IdentityGeneration,
    ValueGenerated, is_integer_clr_type,
};
pub use validation::{validate_model, validate_schema};

/// Current contract version for `database.schema.json` artifacts.
pub const SCHEMA_VERSION: &str = "0.1";
