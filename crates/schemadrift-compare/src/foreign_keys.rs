use std::collections::HashMap;

use schemadrift_core::{
    CompareAttribute, CompareLog, CompareType, DeleteBehavior, ForeignKey, SchemaEntity,
    SchemaForeignKey,
};

use crate::comparer::Comparison;
use crate::logger::CompareLogger;
use crate::tables::DbTable;

impl<'a> Comparison<'a> {
    pub(crate) fn compare_foreign_keys(
        &self,
        logs: &mut Vec<CompareLog>,
        entity: &'a SchemaEntity,
        db_table: DbTable<'a>,
        key: &str,
    ) {
        let table = db_table.table;
        if table
            .foreign_keys()
            .any(|fk| fk.name.as_deref().is_none_or(str::is_empty))
        {
            tracing::warn!(
                event = "foreign_keys_not_checked",
                entity = %entity.name,
                table = %key,
                "database reported a foreign key without a name"
            );
            CompareLogger::new(CompareType::ForeignKey, entity.clr_name(), self.config)
                .mark_as_not_checked(logs, None, None, CompareAttribute::ConstraintName);
            return;
        }

        let db_keys: HashMap<String, &ForeignKey> = table
            .foreign_keys()
            .filter_map(|fk| {
                fk.name
                    .as_deref()
                    .map(|name| (self.collation.key(name), fk))
            })
            .collect();

        for dependent in self.with_folded_owned(entity) {
            for fk in &dependent.foreign_keys {
                // No constraint when the dependent is not mapped to a table.
                let Some(name) = fk.constraint_name.as_deref() else {
                    continue;
                };
                if self.is_same_table_or_tpt(dependent, fk, key) {
                    continue;
                }

                let logger = CompareLogger::new(CompareType::ForeignKey, name, self.config);
                let Some(db_fk) = db_keys.get(&self.collation.key(name)) else {
                    logger.not_in_database(
                        logs,
                        Some(name),
                        CompareAttribute::ConstraintName,
                        None,
                    );
                    continue;
                };

                let mut error = false;
                for property in &fk.properties {
                    let column = self.column_in_table(dependent, property, key);
                    let present = db_fk
                        .columns
                        .iter()
                        .any(|db_column| self.collation.equals(db_column, column));
                    if !present {
                        logger.not_in_database(logs, Some(column), CompareAttribute::NotSet, None);
                        error = true;
                    }
                }

                let expected = fk.delete_behavior.as_str();
                let found = if db_fk.on_delete == fk.delete_behavior.referential_action() {
                    expected
                } else {
                    DeleteBehavior::describe_action(db_fk.on_delete)
                };
                error |= logger.check_different(
                    logs,
                    Some(expected),
                    Some(found),
                    CompareAttribute::DeleteBehavior,
                    None,
                );

                if !error {
                    logger.mark_as_ok(logs, Some(name), None);
                }
            }
        }
    }

    /// Column that `property` of `entity` maps to in the table `key`,
    /// falling back to the property name when it is not mapped there.
    pub(crate) fn column_in_table<'p>(
        &self,
        entity: &'p SchemaEntity,
        property: &'p str,
        key: &str,
    ) -> &'p str
    where
        'a: 'p,
    {
        self.model
            .find_property(entity, property)
            .and_then(|found| found.resolve(key, false, &self.default_schema, self.collation))
            .unwrap_or(property)
    }

    /// Foreign keys created by table splitting, owned types or
    /// table-per-type mapping link a table to itself (or to its base type's
    /// table) through the same key columns. They are skipped.
    fn is_same_table_or_tpt(&self, entity: &SchemaEntity, fk: &SchemaForeignKey, key: &str) -> bool {
        let all_in_table = fk.properties.iter().all(|name| {
            let declaring = self
                .model
                .find_property(entity, name)
                .map(|property| entity.declaring_entity_of(property))
                .and_then(|declaring| self.model.entity(declaring))
                .unwrap_or(entity);
            self.store_key_of(declaring)
                .is_some_and(|declaring_key| self.collation.equals(&declaring_key, key))
        });

        let Some(principal) = self.model.entity(&fk.principal_entity) else {
            return false;
        };
        let shares_table = self
            .store_key_of(principal)
            .is_some_and(|principal_key| self.collation.equals(&principal_key, key));
        if !shares_table && !self.derives_from(entity, &principal.name) {
            return false;
        }
        let mut principal_columns = Vec::with_capacity(fk.principal_properties.len());
        for name in &fk.principal_properties {
            let Some(property) = self.model.find_property(principal, name) else {
                return false;
            };
            let declaring = self
                .model
                .entity(principal.declaring_entity_of(property))
                .unwrap_or(principal);
            let Some(declaring_key) = self.store_key_of(declaring) else {
                return false;
            };
            // A missing principal table is reported by the entity match.
            if !self.tables.contains(&declaring_key) {
                return false;
            }
            principal_columns.push(property.resolve(
                &declaring_key,
                false,
                &self.default_schema,
                self.collation,
            ));
        }

        let dependent_columns: Vec<Option<&str>> = fk
            .properties
            .iter()
            .map(|name| {
                self.model
                    .find_property(entity, name)
                    .and_then(|property| {
                        property.resolve(key, false, &self.default_schema, self.collation)
                    })
            })
            .collect();

        all_in_table && dependent_columns == principal_columns
    }

    fn derives_from(&self, entity: &SchemaEntity, ancestor: &str) -> bool {
        let mut current = entity.base_entity.as_deref();
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            current = self.model.entity(name).and_then(|base| base.base_entity.as_deref());
        }
        false
    }
}
