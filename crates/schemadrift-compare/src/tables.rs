//! Database-side lookup tables and usage tracking.

use std::collections::{HashMap, HashSet};

use schemadrift_core::{Collation, DatabaseSchema, Table, schema_table, split_schema_table};

use crate::errors::{CompareError, Result};

/// A database table or view with its `[schema.]table` key.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DbTable<'a> {
    pub schema: &'a str,
    pub table: &'a Table,
}

impl DbTable<'_> {
    pub fn key(&self, default_schema: &str) -> String {
        schema_table(Some(self.schema), &self.table.name, default_schema)
    }
}

/// Tables and views of a snapshot, keyed by `[schema.]table` under the run's
/// collation, with the configured ignore list already removed.
#[derive(Debug)]
pub(crate) struct TableIndex<'a> {
    collation: Collation,
    default_schema: String,
    tables: Vec<DbTable<'a>>,
    by_key: HashMap<String, usize>,
}

impl<'a> TableIndex<'a> {
    /// Build the index, removing every table named in `ignored`.
    ///
    /// An ignored name that matches no table in the snapshot is fatal.
    pub fn build(
        database: &'a DatabaseSchema,
        default_schema: &str,
        collation: Collation,
        ignored: &[&str],
    ) -> Result<Self> {
        let all: Vec<DbTable<'a>> = database
            .tables()
            .map(|(schema, table)| DbTable { schema, table })
            .collect();

        let mut removed = HashSet::new();
        for entry in ignored {
            let (schema, table) = split_schema_table(entry, default_schema);
            let position = all.iter().position(|candidate| {
                collation.equals(candidate.schema, schema)
                    && collation.equals(&candidate.table.name, table)
            });
            match position {
                Some(position) => {
                    removed.insert(position);
                }
                None => return Err(CompareError::IgnoredTableNotFound(entry.to_string())),
            }
        }

        let tables: Vec<DbTable<'a>> = all
            .into_iter()
            .enumerate()
            .filter(|(position, _)| !removed.contains(position))
            .map(|(_, table)| table)
            .collect();

        let mut by_key = HashMap::new();
        for (position, table) in tables.iter().enumerate() {
            by_key
                .entry(collation.key(&table.key(default_schema)))
                .or_insert(position);
        }

        Ok(Self {
            collation,
            default_schema: default_schema.to_string(),
            tables,
            by_key,
        })
    }

    pub fn get(&self, key: &str) -> Option<DbTable<'a>> {
        self.by_key
            .get(&self.collation.key(key))
            .map(|position| self.tables[*position])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(&self.collation.key(key))
    }

    /// Tables in snapshot order.
    pub fn iter(&self) -> impl Iterator<Item = DbTable<'a>> + '_ {
        self.tables.iter().copied()
    }

    pub fn key_of(&self, table: &DbTable<'_>) -> String {
        table.key(&self.default_schema)
    }
}

/// Database objects the model was found to use during the first pass.
#[derive(Debug, Default)]
pub(crate) struct Usage {
    tables: HashSet<String>,
    columns: HashMap<String, HashSet<String>>,
    indexes: HashMap<String, HashSet<String>>,
}

impl Usage {
    pub fn mark_table(&mut self, collation: Collation, table_key: &str) {
        self.tables.insert(collation.key(table_key));
    }

    pub fn mark_column(&mut self, collation: Collation, table_key: &str, column: &str) {
        self.columns
            .entry(collation.key(table_key))
            .or_default()
            .insert(collation.key(column));
    }

    pub fn mark_index(&mut self, collation: Collation, table_key: &str, index: &str) {
        self.indexes
            .entry(collation.key(table_key))
            .or_default()
            .insert(collation.key(index));
    }

    pub fn is_table_used(&self, collation: Collation, table_key: &str) -> bool {
        self.tables.contains(&collation.key(table_key))
    }

    pub fn is_column_used(&self, collation: Collation, table_key: &str, column: &str) -> bool {
        self.columns
            .get(&collation.key(table_key))
            .is_some_and(|columns| columns.contains(&collation.key(column)))
    }

    pub fn is_index_used(&self, collation: Collation, table_key: &str, index: &str) -> bool {
        self.indexes
            .get(&collation.key(table_key))
            .is_some_and(|indexes| indexes.contains(&collation.key(index)))
    }
}
