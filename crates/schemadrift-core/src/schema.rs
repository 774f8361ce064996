use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constraints::{CheckConstraint, Constraint, ForeignKey, Index, PrimaryKey, UniqueConstraint};
use crate::types::{GeneratedExpression, GeneratedKind, IdentityGeneration, ValueGenerated};

/// Top-level snapshot of a live database catalog.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DatabaseSchema {
    /// Contract version for this snapshot format.
    pub schema_version: String,
    /// Database engine identifier (e.g. `postgres`).
    pub engine: String,
    /// Database name when available.
    pub database: Option<String>,
    /// Schema unqualified names resolve to (e.g. `public`, `dbo`).
    #[serde(default)]
    pub default_schema: Option<String>,
    /// Schemas captured from the database.
    pub schemas: Vec<Schema>,
    /// Optional fingerprint of the snapshot for cache/validation purposes.
    #[serde(default)]
    pub fingerprint: Option<String>,
}

impl DatabaseSchema {
    /// Iterate over every table-like object with its schema name.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.schemas.iter().flat_map(|schema| {
            schema
                .tables
                .iter()
                .map(move |table| (schema.name.as_str(), table))
        })
    }
}

/// A namespace containing tables and related objects.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Schema {
    pub name: String,
    pub tables: Vec<Table>,
}

/// A table-like object (table, view, materialized view, foreign table, partitioned table).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    pub name: String,
    pub kind: TableKind,
    #[serde(default)]
    pub comment: Option<String>,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
    pub indexes: Vec<Index>,
    /// Period columns of a system-versioned (temporal) table.
    #[serde(default)]
    pub temporal_period_columns: Vec<String>,
}

impl Table {
    pub fn is_view(&self) -> bool {
        matches!(self.kind, TableKind::View | TableKind::MaterializedView)
    }

    pub fn primary_key(&self) -> Option<&PrimaryKey> {
        self.constraints.iter().find_map(|constraint| match constraint {
            Constraint::PrimaryKey(pk) => Some(pk),
            _ => None,
        })
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> {
        self.constraints.iter().filter_map(|constraint| match constraint {
            Constraint::ForeignKey(fk) => Some(fk),
            _ => None,
        })
    }

    pub fn unique_constraints(&self) -> impl Iterator<Item = &UniqueConstraint> {
        self.constraints.iter().filter_map(|constraint| match constraint {
            Constraint::Unique(unique) => Some(unique),
            _ => None,
        })
    }

    pub fn check_constraints(&self) -> impl Iterator<Item = &CheckConstraint> {
        self.constraints.iter().filter_map(|constraint| match constraint {
            Constraint::Check(check) => Some(check),
            _ => None,
        })
    }
}

/// Kind of table represented in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Table,
    PartitionedTable,
    View,
    MaterializedView,
    ForeignTable,
    Other(String),
}

/// Column metadata for a table-like object.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub ordinal_position: i16,
    pub name: String,
    /// Store type as the engine formats it (e.g. `character varying(100)`).
    pub store_type: String,
    pub is_nullable: bool,
    /// Default expression, excluding computed column expressions.
    pub default: Option<String>,
    pub identity: Option<IdentityGeneration>,
    pub generated: Option<GeneratedExpression>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Column {
    pub fn computed_sql(&self) -> Option<&str> {
        self.generated
            .as_ref()
            .and_then(|generated| generated.expression.as_deref())
    }

    pub fn is_stored(&self) -> bool {
        matches!(
            self.generated.as_ref().map(|generated| generated.kind),
            Some(GeneratedKind::Stored)
        )
    }

    /// Value generation strategy implied by the catalog.
    pub fn value_generated(&self) -> ValueGenerated {
        if self.identity.is_some() {
            ValueGenerated::OnAdd
        } else if self.computed_sql().is_some() {
            ValueGenerated::OnAddOrUpdate
        } else if self.default.is_some() {
            ValueGenerated::OnAdd
        } else {
            ValueGenerated::Never
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> Column {
        Column {
            ordinal_position: 1,
            name: "Id".to_string(),
            store_type: "integer".to_string(),
            is_nullable: false,
            default: None,
            identity: None,
            generated: None,
            comment: None,
        }
    }

    #[test]
    fn value_generated_follows_catalog_hints() {
        let mut col = column();
        assert_eq!(col.value_generated(), ValueGenerated::Never);

        col.default = Some("0".to_string());
        assert_eq!(col.value_generated(), ValueGenerated::OnAdd);

        col.default = None;
        col.generated = Some(GeneratedExpression {
            kind: GeneratedKind::Stored,
            expression: Some("\"A\" + \"B\"".to_string()),
        });
        assert_eq!(col.value_generated(), ValueGenerated::OnAddOrUpdate);
        assert!(col.is_stored());

        col.generated = None;
        col.identity = Some(IdentityGeneration::ByDefault);
        assert_eq!(col.value_generated(), ValueGenerated::OnAdd);
    }
}
