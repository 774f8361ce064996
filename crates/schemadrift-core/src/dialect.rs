//! Engine-specific helpers the comparer needs at comparison time.

use crate::constraints::CheckConstraint;
use crate::error::{Error, Result};
use crate::types::DefaultLiteral;

/// Comparison-time behaviour that differs between database engines.
pub trait Dialect {
    /// Engine identifier matching `DatabaseSchema::engine`.
    fn engine(&self) -> &'static str;

    /// Schema that unqualified names resolve to.
    fn default_schema(&self) -> &'static str;

    /// Render a model literal default the way the engine stores it.
    fn sql_literal(&self, literal: &DefaultLiteral) -> String;

    /// True for catalog entries that only restate column nullability.
    fn is_implicit_not_null(&self, check: &CheckConstraint) -> bool {
        check.expression.trim_end().ends_with(" IS NOT NULL")
            || check
                .name
                .as_deref()
                .is_some_and(|name| name.ends_with("_not_null"))
    }
}

/// PostgreSQL literal and naming rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    fn default_schema(&self) -> &'static str {
        "public"
    }

    fn sql_literal(&self, literal: &DefaultLiteral) -> String {
        match literal {
            DefaultLiteral::Bool(true) => "TRUE".to_string(),
            DefaultLiteral::Bool(false) => "FALSE".to_string(),
            DefaultLiteral::Integer(value) => value.to_string(),
            DefaultLiteral::Float(value) => format_float(*value),
            DefaultLiteral::Decimal(value) => value.clone(),
            DefaultLiteral::Text(value) => quote(value),
            DefaultLiteral::Guid(value) => format!("'{value}'::uuid"),
            DefaultLiteral::DateTime(value) => {
                format!("TIMESTAMP '{}'", value.replace('T', " "))
            }
        }
    }
}

/// SQL Server literal and naming rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl Dialect for SqlServerDialect {
    fn engine(&self) -> &'static str {
        "sqlserver"
    }

    fn default_schema(&self) -> &'static str {
        "dbo"
    }

    fn sql_literal(&self, literal: &DefaultLiteral) -> String {
        match literal {
            DefaultLiteral::Bool(value) => format!("CAST({} AS bit)", u8::from(*value)),
            DefaultLiteral::Integer(value) => value.to_string(),
            DefaultLiteral::Float(value) => format!("{}E0", format_float(*value)),
            DefaultLiteral::Decimal(value) => value.clone(),
            DefaultLiteral::Text(value) => format!("N{}", quote(value)),
            DefaultLiteral::Guid(value) => quote(value),
            DefaultLiteral::DateTime(value) => quote(value),
        }
    }

    fn is_implicit_not_null(&self, _check: &CheckConstraint) -> bool {
        false
    }
}

/// Pick the dialect for an engine identifier.
pub fn dialect_for(engine: &str) -> Result<Box<dyn Dialect>> {
    match engine {
        "postgres" | "postgresql" => Ok(Box::new(PostgresDialect)),
        "sqlserver" | "mssql" => Ok(Box::new(SqlServerDialect)),
        other => Err(Error::Unsupported(format!("no dialect for engine '{other}'"))),
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_literals() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.sql_literal(&DefaultLiteral::Bool(true)), "TRUE");
        assert_eq!(dialect.sql_literal(&DefaultLiteral::Integer(42)), "42");
        assert_eq!(dialect.sql_literal(&DefaultLiteral::Float(2.0)), "2.0");
        assert_eq!(
            dialect.sql_literal(&DefaultLiteral::Text("O'Neil".to_string())),
            "'O''Neil'"
        );
    }

    #[test]
    fn sqlserver_literals() {
        let dialect = SqlServerDialect;
        assert_eq!(
            dialect.sql_literal(&DefaultLiteral::Bool(false)),
            "CAST(0 AS bit)"
        );
        assert_eq!(
            dialect.sql_literal(&DefaultLiteral::Text("abc".to_string())),
            "N'abc'"
        );
    }

    #[test]
    fn postgres_filters_not_null_artefacts() {
        let dialect = PostgresDialect;
        let implicit = CheckConstraint {
            name: Some("Book_Title_not_null".to_string()),
            expression: "\"Title\" IS NOT NULL".to_string(),
        };
        let explicit = CheckConstraint {
            name: Some("ck_new_one".to_string()),
            expression: "((\"Description\" IS NOT NULL))".to_string(),
        };
        assert!(dialect.is_implicit_not_null(&implicit));
        assert!(!dialect.is_implicit_not_null(&explicit));
    }

    #[test]
    fn unknown_engine_is_unsupported() {
        assert!(dialect_for("oracle").is_err());
        assert_eq!(dialect_for("postgres").map(|d| d.engine()).ok(), Some("postgres"));
    }
}
