use async_trait::async_trait;
use sqlx::PgPool;

use schemadrift_core::{FkAction, Result};

use crate::constraints::{
    CheckConstraintRecord, ColumnTypeInfo, ConstraintReader, ForeignKeyRecord,
};

use super::queries;
use super::utils::fk_match_from_code;

/// PostgreSQL implementation of [`ConstraintReader`].
#[derive(Debug, Clone)]
pub struct PostgresConstraintReader {
    pool: PgPool,
}

impl PostgresConstraintReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConstraintReader for PostgresConstraintReader {
    async fn read_check_constraints(
        &self,
        schemas: &[String],
    ) -> Result<Vec<CheckConstraintRecord>> {
        let rows = queries::list_check_constraints(&self.pool, schemas).await?;
        Ok(rows
            .into_iter()
            .map(|row| CheckConstraintRecord {
                schema: row.table_schema,
                table: row.table_name,
                name: row.name,
                clause: row.clause,
            })
            .collect())
    }

    async fn read_foreign_keys(&self, schemas: &[String]) -> Result<Vec<ForeignKeyRecord>> {
        let rows = queries::list_foreign_keys(&self.pool, schemas).await?;
        Ok(rows
            .into_iter()
            .map(|row| ForeignKeyRecord {
                schema: row.table_schema,
                table: row.table_name,
                name: row.name,
                columns: row.columns,
                referenced_schema: row.referenced_schema,
                referenced_table: row.referenced_table,
                referenced_columns: row.referenced_columns,
                on_update: FkAction::from_sql(&row.update_rule),
                on_delete: FkAction::from_sql(&row.delete_rule),
                match_type: fk_match_from_code(&row.match_code),
            })
            .collect())
    }

    fn format_column_type(&self, column: &ColumnTypeInfo) -> String {
        format_postgres_column_type(column)
    }
}

/// `format_type` output, plus ` COMPRESSION <method>` when the column
/// overrides the default compression.
pub fn format_postgres_column_type(column: &ColumnTypeInfo) -> String {
    match &column.compression {
        Some(method) => format!("{} COMPRESSION {method}", column.base_type),
        None => column.base_type.clone(),
    }
}
