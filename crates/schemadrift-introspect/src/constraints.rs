//! Per-engine extraction of constraint records the comparer consumes.

use async_trait::async_trait;

use schemadrift_core::{FkAction, FkMatchType, Result};

/// Check constraint as listed by the catalog, keyed by its owning table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConstraintRecord {
    pub schema: String,
    pub table: String,
    pub name: String,
    /// Clause text without the `CHECK` keyword.
    pub clause: String,
}

/// Foreign key as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRecord {
    pub schema: String,
    pub table: String,
    /// Some drivers cannot report the name; such keys are left unchecked.
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_update: FkAction,
    pub on_delete: FkAction,
    pub match_type: FkMatchType,
}

/// Raw column type facts used to build the comparable store type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTypeInfo {
    /// Type as the catalog formats it, including modifiers.
    pub base_type: String,
    /// Non-default compression method, if any.
    pub compression: Option<String>,
}

/// Catalog capability implemented once per database engine.
#[async_trait]
pub trait ConstraintReader {
    /// Explicit check constraints of the given schemas, excluding the
    /// engine's implicit not-null entries.
    async fn read_check_constraints(&self, schemas: &[String])
    -> Result<Vec<CheckConstraintRecord>>;

    /// Foreign keys declared on tables of the given schemas.
    async fn read_foreign_keys(&self, schemas: &[String]) -> Result<Vec<ForeignKeyRecord>>;

    /// Store type string as a model would declare it.
    fn format_column_type(&self, column: &ColumnTypeInfo) -> String;
}
