use std::collections::BTreeMap;

use schemadrift_core::{
    CheckConstraint, Column, Constraint, ForeignKey, GeneratedExpression, Index, PrimaryKey,
    Table, TableKind, UniqueConstraint,
};

use crate::constraints::{CheckConstraintRecord, ColumnTypeInfo, ForeignKeyRecord};
use crate::options::IntrospectOptions;

use super::queries::{RawColumn, RawIndex, RawKeyConstraint, RawTable};
use super::utils::{
    compression_from_code, generated_kind_from_code, identity_from_text, relkind_to_table_kind,
};

/// Per-table grouping of catalog rows, keyed by table name.
pub type ByTable<T> = BTreeMap<String, Vec<T>>;

pub fn filter_schemas(raw: Vec<String>, opts: &IntrospectOptions) -> Vec<String> {
    raw.into_iter()
        .filter(|schema| opts.wants_schema(schema))
        .collect()
}

pub fn map_tables(raw: Vec<RawTable>, opts: &IntrospectOptions) -> Vec<Table> {
    raw.into_iter()
        .filter_map(|table| {
            let kind = relkind_to_table_kind(&table.relkind);
            if !table_kind_enabled(&kind, opts) {
                return None;
            }

            Some(Table {
                name: table.name,
                kind,
                comment: table.comment.filter(|_| opts.include_comments),
                columns: Vec::new(),
                constraints: Vec::new(),
                indexes: Vec::new(),
                temporal_period_columns: Vec::new(),
            })
        })
        .collect()
}

fn table_kind_enabled(kind: &TableKind, opts: &IntrospectOptions) -> bool {
    match kind {
        TableKind::View | TableKind::MaterializedView => opts.include_views,
        TableKind::ForeignTable => opts.include_foreign_tables,
        _ => true,
    }
}

pub fn group_columns(
    raw: Vec<RawColumn>,
    opts: &IntrospectOptions,
    format_type: impl Fn(&ColumnTypeInfo) -> String,
) -> ByTable<Column> {
    let mut grouped = ByTable::new();
    for col in raw {
        let store_type = format_type(&ColumnTypeInfo {
            base_type: col.data_type,
            compression: compression_from_code(col.compression_code.as_deref()),
        });
        let generated = generated_kind_from_code(&col.generated_code).map(|kind| {
            GeneratedExpression {
                kind,
                expression: col.generation_expression,
            }
        });

        grouped.entry(col.table_name).or_insert_with(Vec::new).push(Column {
            ordinal_position: col.ordinal_position,
            name: col.name,
            store_type,
            is_nullable: col.is_nullable,
            default: col.default,
            identity: identity_from_text(col.identity_generation.as_deref()),
            generated,
            comment: col.comment.filter(|_| opts.include_comments),
        });
    }
    grouped
}

pub fn group_key_constraints(raw: Vec<RawKeyConstraint>) -> ByTable<Constraint> {
    let mut grouped = ByTable::new();
    for key in raw {
        let constraint = if key.contype == "p" {
            Constraint::PrimaryKey(PrimaryKey {
                name: Some(key.name),
                columns: key.columns,
            })
        } else {
            Constraint::Unique(UniqueConstraint {
                name: Some(key.name),
                columns: key.columns,
                is_deferrable: key.is_deferrable,
            })
        };
        grouped.entry(key.table_name).or_insert_with(Vec::new).push(constraint);
    }
    grouped
}

pub fn group_check_constraints(
    records: Vec<CheckConstraintRecord>,
    schema: &str,
) -> ByTable<Constraint> {
    let mut grouped = ByTable::new();
    for record in records.into_iter().filter(|record| record.schema == schema) {
        grouped
            .entry(record.table)
            .or_insert_with(Vec::new)
            .push(Constraint::Check(CheckConstraint {
                name: Some(record.name),
                expression: record.clause,
            }));
    }
    grouped
}

pub fn group_foreign_keys(records: Vec<ForeignKeyRecord>, schema: &str) -> ByTable<Constraint> {
    let mut grouped = ByTable::new();
    for record in records.into_iter().filter(|record| record.schema == schema) {
        grouped
            .entry(record.table)
            .or_insert_with(Vec::new)
            .push(Constraint::ForeignKey(ForeignKey {
                name: record.name,
                columns: record.columns,
                referenced_schema: record.referenced_schema,
                referenced_table: record.referenced_table,
                referenced_columns: record.referenced_columns,
                on_update: record.on_update,
                on_delete: record.on_delete,
                match_type: record.match_type,
            }));
    }
    grouped
}

pub fn group_indexes(raw: Vec<RawIndex>) -> ByTable<Index> {
    let mut grouped = ByTable::new();
    for idx in raw {
        grouped.entry(idx.table_name).or_insert_with(Vec::new).push(Index {
            name: idx.name,
            columns: idx.columns,
            is_unique: idx.is_unique,
            is_primary: idx.is_primary,
            method: Some(idx.method),
            definition: Some(idx.definition),
        });
    }
    grouped
}

pub fn sort_constraints(constraints: &mut [Constraint]) {
    constraints.sort_by_key(constraint_key);
}

fn constraint_key(constraint: &Constraint) -> (u8, String, String) {
    match constraint {
        Constraint::PrimaryKey(pk) => (0, pk.name.clone().unwrap_or_default(), pk.columns.join("|")),
        Constraint::Unique(unique) => (
            1,
            unique.name.clone().unwrap_or_default(),
            unique.columns.join("|"),
        ),
        Constraint::Check(check) => (
            2,
            check.name.clone().unwrap_or_default(),
            check.expression.clone(),
        ),
        Constraint::ForeignKey(fk) => (3, fk.name.clone().unwrap_or_default(), fk.columns.join("|")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemadrift_core::{FkAction, FkMatchType, GeneratedKind};

    fn raw_column(table: &str, name: &str) -> RawColumn {
        RawColumn {
            table_name: table.to_string(),
            ordinal_position: 1,
            name: name.to_string(),
            data_type: "text".to_string(),
            is_nullable: true,
            default: None,
            identity_generation: None,
            generated_code: String::new(),
            generation_expression: None,
            compression_code: None,
            comment: Some("note".to_string()),
        }
    }

    #[test]
    fn groups_columns_by_table_and_formats_types() {
        let mut computed = raw_column("Book", "Slug");
        computed.generated_code = "s".to_string();
        computed.generation_expression = Some("lower(\"Title\")".to_string());
        let mut compressed = raw_column("Review", "Body");
        compressed.compression_code = Some("p".to_string());

        let grouped = group_columns(
            vec![raw_column("Book", "Title"), computed, compressed],
            &IntrospectOptions::default(),
            |info| match &info.compression {
                Some(method) => format!("{} COMPRESSION {method}", info.base_type),
                None => info.base_type.clone(),
            },
        );

        let book = &grouped["Book"];
        assert_eq!(book.len(), 2);
        assert!(book[0].comment.is_none(), "comments are off by default");
        assert_eq!(book[1].computed_sql(), Some("lower(\"Title\")"));
        assert_eq!(
            book[1].generated.as_ref().map(|generated| generated.kind),
            Some(GeneratedKind::Stored)
        );
        assert_eq!(grouped["Review"][0].store_type, "text COMPRESSION pglz");
    }

    #[test]
    fn keeps_only_records_of_the_requested_schema() {
        let record = |schema: &str, name: &str| ForeignKeyRecord {
            schema: schema.to_string(),
            table: "Book".to_string(),
            name: Some(name.to_string()),
            columns: vec!["AuthorId".to_string()],
            referenced_schema: schema.to_string(),
            referenced_table: "Author".to_string(),
            referenced_columns: vec!["AuthorId".to_string()],
            on_update: FkAction::NoAction,
            on_delete: FkAction::Cascade,
            match_type: FkMatchType::Simple,
        };
        let grouped = group_foreign_keys(
            vec![record("public", "FK_Book_Author"), record("audit", "FK_Other")],
            "public",
        );
        assert_eq!(grouped["Book"].len(), 1);
    }

    #[test]
    fn primary_keys_sort_first() {
        let mut constraints = group_key_constraints(vec![
            RawKeyConstraint {
                table_name: "Book".to_string(),
                name: "AK_Book_Isbn".to_string(),
                contype: "u".to_string(),
                columns: vec!["Isbn".to_string()],
                is_deferrable: false,
            },
            RawKeyConstraint {
                table_name: "Book".to_string(),
                name: "PK_Book".to_string(),
                contype: "p".to_string(),
                columns: vec!["BookId".to_string()],
                is_deferrable: false,
            },
        ])
        .remove("Book")
        .unwrap_or_default();
        sort_constraints(&mut constraints);
        assert!(matches!(constraints[0], Constraint::PrimaryKey(_)));
    }
}
