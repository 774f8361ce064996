use sqlx::PgPool;

use schemadrift_core::{DatabaseSchema, Result, SCHEMA_VERSION, Schema};

use crate::adapter::Adapter;
use crate::constraints::ConstraintReader;
use crate::options::IntrospectOptions;

mod mapper;
mod queries;
mod reader;
mod utils;

pub use reader::{PostgresConstraintReader, format_postgres_column_type};

/// Adapter for PostgreSQL databases.
#[derive(Debug, Clone)]
pub struct PostgresAdapter {
    pool: PgPool,
}

impl PostgresAdapter {
    /// Create a new adapter using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Adapter for PostgresAdapter {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn introspect(&self, opts: &IntrospectOptions) -> Result<DatabaseSchema> {
        introspect(&self.pool, opts).await
    }
}

/// Introspect Postgres with default options.
pub async fn introspect_postgres(pool: &PgPool) -> Result<DatabaseSchema> {
    introspect_postgres_with_options(pool, IntrospectOptions::default()).await
}

/// Introspect Postgres with caller-provided options.
pub async fn introspect_postgres_with_options(
    pool: &PgPool,
    opts: IntrospectOptions,
) -> Result<DatabaseSchema> {
    introspect(pool, &opts).await
}

/// Introspect a Postgres database according to the provided options.
pub async fn introspect(pool: &PgPool, opts: &IntrospectOptions) -> Result<DatabaseSchema> {
    let reader = PostgresConstraintReader::new(pool.clone());
    let database = queries::fetch_database_name(pool).await?;
    let default_schema = queries::fetch_default_schema(pool).await?;
    let schemas = mapper::filter_schemas(queries::list_schemas(pool).await?, opts);

    tracing::debug!(
        event = "catalog_read_started",
        database = %database,
        schemas = schemas.len()
    );

    let checks = reader.read_check_constraints(&schemas).await?;
    let foreign_keys = reader.read_foreign_keys(&schemas).await?;

    let mut schema_items = Vec::new();
    for schema_name in schemas {
        let mut tables = mapper::map_tables(queries::list_tables(pool, &schema_name).await?, opts);

        let mut columns = mapper::group_columns(
            queries::list_columns(pool, &schema_name).await?,
            opts,
            |info| reader.format_column_type(info),
        );
        let mut keys =
            mapper::group_key_constraints(queries::list_key_constraints(pool, &schema_name).await?);
        let mut table_checks = mapper::group_check_constraints(
            checks
                .iter()
                .filter(|record| record.schema == schema_name)
                .cloned()
                .collect(),
            &schema_name,
        );
        let mut table_fks = mapper::group_foreign_keys(
            foreign_keys
                .iter()
                .filter(|record| record.schema == schema_name)
                .cloned()
                .collect(),
            &schema_name,
        );
        let mut indexes = if opts.include_indexes {
            mapper::group_indexes(queries::list_indexes(pool, &schema_name).await?)
        } else {
            mapper::ByTable::new()
        };

        for table in &mut tables {
            table.columns = columns.remove(&table.name).unwrap_or_default();

            let mut constraints = keys.remove(&table.name).unwrap_or_default();
            constraints.extend(table_checks.remove(&table.name).unwrap_or_default());
            constraints.extend(table_fks.remove(&table.name).unwrap_or_default());
            mapper::sort_constraints(&mut constraints);
            table.constraints = constraints;

            table.indexes = indexes.remove(&table.name).unwrap_or_default();
        }

        tables.sort_by(|left, right| left.name.cmp(&right.name));
        schema_items.push(Schema {
            name: schema_name,
            tables,
        });
    }

    schema_items.sort_by(|left, right| left.name.cmp(&right.name));

    Ok(DatabaseSchema {
        schema_version: SCHEMA_VERSION.to_string(),
        engine: "postgres".to_string(),
        database: Some(database),
        default_schema,
        schemas: schema_items,
        fingerprint: None,
    })
}
