use std::collections::{HashMap, HashSet};

use schemadrift_core::{CompareAttribute, CompareLog, CompareType, SchemaEntity, Table};

use crate::columns::bool_text;
use crate::comparer::Comparison;
use crate::logger::CompareLogger;
use crate::tables::DbTable;

/// An index or unique constraint of a database table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DbIndex<'t> {
    pub name: &'t str,
    pub columns: &'t [String],
    pub is_unique: bool,
    pub is_primary: bool,
}

/// Indexes and unique constraints of `table` keyed by name. A unique
/// constraint and the index backing it share one entry.
pub(crate) fn indexes_by_name<'t>(
    table: &'t Table,
    key_of: impl Fn(&str) -> String,
) -> Vec<(String, DbIndex<'t>)> {
    let mut seen = HashSet::new();
    let mut indexes = Vec::new();
    let candidates = table
        .indexes
        .iter()
        .map(|index| DbIndex {
            name: &index.name,
            columns: &index.columns,
            is_unique: index.is_unique,
            is_primary: index.is_primary,
        })
        .chain(table.unique_constraints().filter_map(|unique| {
            unique.name.as_deref().map(|name| DbIndex {
                name,
                columns: &unique.columns,
                is_unique: true,
                is_primary: false,
            })
        }));
    for index in candidates {
        let name_key = key_of(index.name);
        if seen.insert(name_key.clone()) {
            indexes.push((name_key, index));
        }
    }
    indexes
}

impl<'a> Comparison<'a> {
    pub(crate) fn compare_indexes(
        &mut self,
        logs: &mut Vec<CompareLog>,
        entity: &'a SchemaEntity,
        db_table: DbTable<'a>,
        key: &str,
    ) {
        let collation = self.collation;
        let db_indexes: HashMap<String, DbIndex<'a>> =
            indexes_by_name(db_table.table, |name| collation.key(name))
                .into_iter()
                .collect();

        for owner in self.with_folded_owned(entity) {
            for index in &owner.indexes {
                let columns: Vec<&str> = index
                    .properties
                    .iter()
                    .map(|property| self.column_in_table(owner, property, key))
                    .collect();
                let logger =
                    CompareLogger::new(CompareType::Index, columns.join(","), self.config);

                let Some(db_index) = index
                    .name
                    .as_deref()
                    .and_then(|name| db_indexes.get(&collation.key(name)))
                else {
                    logger.not_in_database(
                        logs,
                        index.name.as_deref(),
                        CompareAttribute::IndexConstraintName,
                        None,
                    );
                    continue;
                };
                self.usage.mark_index(collation, key, db_index.name);

                let mut error = false;
                for &column in &columns {
                    let present = db_index
                        .columns
                        .iter()
                        .any(|db_column| collation.equals(db_column, column));
                    if !present {
                        logger.not_in_database(logs, Some(column), CompareAttribute::NotSet, None);
                        error = true;
                    }
                }
                error |= logger.check_different(
                    logs,
                    Some(bool_text(index.is_unique)),
                    Some(bool_text(db_index.is_unique)),
                    CompareAttribute::Unique,
                    None,
                );

                if !error {
                    logger.mark_as_ok(logs, index.name.as_deref(), None);
                }
            }
        }
    }
}
