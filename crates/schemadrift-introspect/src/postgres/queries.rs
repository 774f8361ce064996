//! Catalog queries, one round trip per schema.
//!
//! Queries are checked at runtime (`query_as`) so the crate builds without a
//! live database. Catalog `"char"`, `name` and `sql_identifier` values are
//! cast to `text` so they decode as `String`.

use sqlx::PgPool;

use schemadrift_core::{Error, Result};

fn db_error(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}

pub async fn fetch_database_name(pool: &PgPool) -> Result<String> {
    sqlx::query_scalar::<_, String>("select current_database()::text")
        .fetch_one(pool)
        .await
        .map_err(db_error)
}

pub async fn fetch_default_schema(pool: &PgPool) -> Result<Option<String>> {
    sqlx::query_scalar::<_, Option<String>>("select current_schema()::text")
        .fetch_one(pool)
        .await
        .map_err(db_error)
}

pub async fn list_schemas(pool: &PgPool) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>("select nspname::text from pg_namespace order by nspname")
        .fetch_all(pool)
        .await
        .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawTable {
    pub name: String,
    pub relkind: String,
    pub comment: Option<String>,
}

pub async fn list_tables(pool: &PgPool, schema: &str) -> Result<Vec<RawTable>> {
    sqlx::query_as::<_, RawTable>(
        r#"
        select
          c.relname::text as name,
          c.relkind::text as relkind,
          pg_catalog.obj_description(c.oid, 'pg_class') as comment
        from pg_class c
        join pg_namespace n on n.oid = c.relnamespace
        where n.nspname = $1
          and c.relkind in ('r','p','v','m','f')
        order by c.relname
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawColumn {
    pub table_name: String,
    pub ordinal_position: i16,
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default: Option<String>,
    pub identity_generation: Option<String>,
    pub generated_code: String,
    pub generation_expression: Option<String>,
    pub compression_code: Option<String>,
    pub comment: Option<String>,
}

/// Columns of every relation in `schema`.
///
/// `attcompression` only exists from PostgreSQL 14, so it is read through
/// `to_jsonb` to stay compatible with older servers.
pub async fn list_columns(pool: &PgPool, schema: &str) -> Result<Vec<RawColumn>> {
    sqlx::query_as::<_, RawColumn>(
        r#"
        select
          c.relname::text as table_name,
          a.attnum as ordinal_position,
          a.attname::text as name,
          pg_catalog.format_type(a.atttypid, a.atttypmod) as data_type,
          (not a.attnotnull) as is_nullable,
          case
            when coalesce(to_jsonb(a) ->> 'attgenerated', '') = ''
              then pg_get_expr(ad.adbin, ad.adrelid)
          end as "default",
          case a.attidentity
            when 'a' then 'ALWAYS'
            when 'd' then 'BY DEFAULT'
          end as identity_generation,
          coalesce(to_jsonb(a) ->> 'attgenerated', '') as generated_code,
          case
            when coalesce(to_jsonb(a) ->> 'attgenerated', '') <> ''
              then pg_get_expr(ad.adbin, ad.adrelid)
          end as generation_expression,
          nullif(to_jsonb(a) ->> 'attcompression', '') as compression_code,
          pg_catalog.col_description(a.attrelid, a.attnum) as comment
        from pg_attribute a
        join pg_class c on c.oid = a.attrelid
        join pg_namespace n on n.oid = c.relnamespace
        left join pg_attrdef ad on ad.adrelid = a.attrelid and ad.adnum = a.attnum
        where n.nspname = $1
          and c.relkind in ('r','p','v','m','f')
          and a.attnum > 0
          and not a.attisdropped
        order by c.relname, a.attnum
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawKeyConstraint {
    pub table_name: String,
    pub name: String,
    /// `p` for primary keys, `u` for unique constraints.
    pub contype: String,
    pub columns: Vec<String>,
    pub is_deferrable: bool,
}

pub async fn list_key_constraints(pool: &PgPool, schema: &str) -> Result<Vec<RawKeyConstraint>> {
    sqlx::query_as::<_, RawKeyConstraint>(
        r#"
        select
          rel.relname::text as table_name,
          con.conname::text as name,
          con.contype::text as contype,
          array_agg(att.attname::text order by ord.ordinality) as columns,
          con.condeferrable as is_deferrable
        from pg_constraint con
        join pg_class rel on rel.oid = con.conrelid
        join pg_namespace nsp on nsp.oid = rel.relnamespace
        join unnest(con.conkey) with ordinality as ord(attnum, ordinality) on true
        join pg_attribute att on att.attrelid = rel.oid and att.attnum = ord.attnum
        where nsp.nspname = $1
          and con.contype in ('p','u')
        group by rel.relname, con.conname, con.contype, con.condeferrable
        order by rel.relname, con.conname
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawIndex {
    pub table_name: String,
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_primary: bool,
    pub method: String,
    pub definition: String,
}

/// Indexes with their key columns; expression keys have no column and are
/// left out of `columns`.
pub async fn list_indexes(pool: &PgPool, schema: &str) -> Result<Vec<RawIndex>> {
    sqlx::query_as::<_, RawIndex>(
        r#"
        select
          tbl.relname::text as table_name,
          idx.relname::text as name,
          coalesce(
            array_agg(att.attname::text order by k.ordinality)
              filter (where att.attname is not null),
            '{}'::text[]
          ) as columns,
          i.indisunique as is_unique,
          i.indisprimary as is_primary,
          am.amname::text as method,
          pg_get_indexdef(i.indexrelid) as definition
        from pg_index i
        join pg_class tbl on tbl.oid = i.indrelid
        join pg_namespace nsp on nsp.oid = tbl.relnamespace
        join pg_class idx on idx.oid = i.indexrelid
        join pg_am am on am.oid = idx.relam
        left join unnest(i.indkey::int2[]) with ordinality as k(attnum, ordinality) on true
        left join pg_attribute att on att.attrelid = tbl.oid and att.attnum = k.attnum
        where nsp.nspname = $1
        group by tbl.relname, idx.relname, i.indisunique, i.indisprimary, am.amname, i.indexrelid
        order by tbl.relname, idx.relname
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawCheckConstraint {
    pub table_schema: String,
    pub table_name: String,
    pub name: String,
    pub clause: String,
}

/// Check constraints from `information_schema`, which reports the bare
/// clause. Implicit `NOT NULL` entries listed there are filtered out.
pub async fn list_check_constraints(
    pool: &PgPool,
    schemas: &[String],
) -> Result<Vec<RawCheckConstraint>> {
    sqlx::query_as::<_, RawCheckConstraint>(
        r#"
        select
          tc.table_schema::text as table_schema,
          tc.table_name::text as table_name,
          cc.constraint_name::text as name,
          cc.check_clause::text as clause
        from information_schema.check_constraints cc
        join information_schema.table_constraints tc
          on tc.constraint_schema = cc.constraint_schema
         and tc.constraint_name = cc.constraint_name
        where tc.constraint_type = 'CHECK'
          and tc.table_schema::text = any($1)
          and cc.check_clause::text not like '% IS NOT NULL'
          and cc.constraint_name::text not like '%_not_null'
        order by tc.table_schema, tc.table_name, cc.constraint_name
        "#,
    )
    .bind(schemas)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawForeignKey {
    pub table_schema: String,
    pub table_name: String,
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub update_rule: String,
    pub delete_rule: String,
    pub match_code: String,
}

pub async fn list_foreign_keys(pool: &PgPool, schemas: &[String]) -> Result<Vec<RawForeignKey>> {
    sqlx::query_as::<_, RawForeignKey>(
        r#"
        select
          src_nsp.nspname::text as table_schema,
          src_rel.relname::text as table_name,
          con.conname::text as name,
          array_agg(src_att.attname::text order by s_ord.ordinality) as columns,
          ref_nsp.nspname::text as referenced_schema,
          ref_rel.relname::text as referenced_table,
          array_agg(ref_att.attname::text order by s_ord.ordinality) as referenced_columns,
          case con.confupdtype
            when 'a' then 'NO ACTION'
            when 'r' then 'RESTRICT'
            when 'c' then 'CASCADE'
            when 'n' then 'SET NULL'
            when 'd' then 'SET DEFAULT'
          end as update_rule,
          case con.confdeltype
            when 'a' then 'NO ACTION'
            when 'r' then 'RESTRICT'
            when 'c' then 'CASCADE'
            when 'n' then 'SET NULL'
            when 'd' then 'SET DEFAULT'
          end as delete_rule,
          con.confmatchtype::text as match_code
        from pg_constraint con
        join pg_class src_rel on src_rel.oid = con.conrelid
        join pg_namespace src_nsp on src_nsp.oid = src_rel.relnamespace
        join pg_class ref_rel on ref_rel.oid = con.confrelid
        join pg_namespace ref_nsp on ref_nsp.oid = ref_rel.relnamespace
        join unnest(con.conkey, con.confkey) with ordinality as s_ord(src_attnum, ref_attnum, ordinality) on true
        join pg_attribute src_att on src_att.attrelid = src_rel.oid and src_att.attnum = s_ord.src_attnum
        join pg_attribute ref_att on ref_att.attrelid = ref_rel.oid and ref_att.attnum = s_ord.ref_attnum
        where con.contype = 'f'
          and src_nsp.nspname::text = any($1)
        group by
          src_nsp.nspname, src_rel.relname, con.conname, ref_nsp.nspname, ref_rel.relname,
          con.confupdtype, con.confdeltype, con.confmatchtype
        order by src_nsp.nspname, src_rel.relname, con.conname
        "#,
    )
    .bind(schemas)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}
