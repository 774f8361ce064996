//! Second pass: database objects the model never referenced.

use schemadrift_core::{CompareAttribute, CompareLog, CompareType};

use crate::comparer::Comparison;
use crate::indexes::indexes_by_name;
use crate::logger::CompareLogger;

impl Comparison<'_> {
    /// Report unused tables, columns and indexes as `ExtraInDatabase`.
    ///
    /// Tables no entity maps to are only reported when an ignore list was
    /// configured, since without one the database may legitimately hold
    /// tables owned by other applications.
    pub(crate) fn report_unused(&self, logs: &mut Vec<CompareLog>) {
        let collation = self.collation;
        let before = logs.len();

        for db_table in self.tables.iter() {
            let key = self.tables.key_of(&db_table);

            if !self.usage.is_table_used(collation, &key) {
                if self.config.tables_to_ignore.is_some() && !db_table.table.is_view() {
                    CompareLogger::new(CompareType::Table, key.as_str(), self.config)
                        .extra_in_database(
                            logs,
                            Some(key.as_str()),
                            CompareAttribute::TableName,
                            None,
                        );
                }
                continue;
            }

            let logger = CompareLogger::new(CompareType::Column, key.as_str(), self.config);
            for column in &db_table.table.columns {
                if !self.usage.is_column_used(collation, &key, &column.name) {
                    logger.extra_in_database(
                        logs,
                        Some(column.name.as_str()),
                        CompareAttribute::ColumnName,
                        None,
                    );
                }
            }

            let logger = CompareLogger::new(CompareType::Index, key.as_str(), self.config);
            let primary_name = db_table
                .table
                .primary_key()
                .and_then(|pk| pk.name.as_deref());
            for (_, index) in indexes_by_name(db_table.table, |name| collation.key(name)) {
                if index.is_primary
                    || primary_name.is_some_and(|pk| collation.equals(pk, index.name))
                {
                    continue;
                }
                if !self.usage.is_index_used(collation, &key, index.name) {
                    logger.extra_in_database(
                        logs,
                        Some(index.name),
                        CompareAttribute::IndexConstraintName,
                        None,
                    );
                }
            }
        }

        tracing::debug!(event = "unused_scan_finished", reported = logs.len() - before);
    }
}
