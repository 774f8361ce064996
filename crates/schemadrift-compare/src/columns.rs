//! Property-to-column and primary key comparison for one matched table.

use std::collections::HashMap;

use schemadrift_core::{
    Column, CompareAttribute, CompareLog, CompareType, SchemaEntity, SchemaProperty,
    ValueGenerated, is_integer_clr_type,
};

use crate::brackets::normalize;
use crate::comparer::{Comparison, NO_PRIMARY_KEY};
use crate::logger::CompareLogger;
use crate::tables::DbTable;

fn nullable_text(is_nullable: bool) -> &'static str {
    if is_nullable { "NULL" } else { "NOT NULL" }
}

pub(crate) fn bool_text(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Primary key facts of the matched table, shared by every property check.
struct PrimaryKeyCheck<'l> {
    logger: CompareLogger<'l>,
    db_name: Option<&'l str>,
    db_columns: Vec<&'l str>,
    error: bool,
}

impl<'a> Comparison<'a> {
    pub(crate) fn compare_columns(
        &mut self,
        logs: &mut Vec<CompareLog>,
        entity: &'a SchemaEntity,
        db_table: DbTable<'a>,
        key: &str,
    ) {
        let model = self.model;
        let table = db_table.table;
        let is_view = entity.is_view;
        let model_pk_name = if is_view {
            NO_PRIMARY_KEY
        } else {
            model
                .primary_key_of(entity)
                .and_then(|pk| pk.name.as_deref())
                .unwrap_or(NO_PRIMARY_KEY)
        };
        let db_pk = table.primary_key();

        let mut pk = PrimaryKeyCheck {
            logger: CompareLogger::new(CompareType::PrimaryKey, model_pk_name, self.config),
            db_name: db_pk.and_then(|pk| pk.name.as_deref()),
            db_columns: db_pk
                .map(|pk| pk.columns.iter().map(String::as_str).collect())
                .unwrap_or_default(),
            error: false,
        };
        if !is_view {
            pk.error |= pk.logger.check_different(
                logs,
                Some(model_pk_name),
                Some(pk.db_name.unwrap_or(NO_PRIMARY_KEY)),
                CompareAttribute::ConstraintName,
                None,
            );
        }

        let folded = self.with_folded_owned(entity);
        let documents: Vec<_> = folded
            .iter()
            .flat_map(|owner| model.json_documents_of(&owner.name))
            .collect();
        for document in documents {
            let navigation = document
                .owner_navigation
                .as_deref()
                .unwrap_or(&document.name);
            CompareLogger::new(CompareType::Property, navigation, self.config).mark_as_ok(
                logs,
                Some(navigation),
                None,
            );
            if let Some(column) = &document.json_column {
                self.usage.mark_column(self.collation, key, column);
            }
        }

        let columns: HashMap<String, &Column> = table
            .columns
            .iter()
            .map(|column| (self.collation.key(&column.name), column))
            .collect();

        for (position, owner) in folded.into_iter().enumerate() {
            let is_owned = position > 0;
            for property in &owner.properties {
                if is_owned && owner.is_primary_key(&property.name) {
                    continue;
                }
                if property.is_shadow
                    && table
                        .temporal_period_columns
                        .iter()
                        .any(|period| period == &property.name)
                {
                    // Managed by the engine; only recorded as used.
                    if let Some(column) =
                        property.resolve(key, is_view, &self.default_schema, self.collation)
                    {
                        self.usage.mark_column(self.collation, key, column);
                    }
                    continue;
                }
                self.compare_property(
                    logs, owner, property, &columns, &mut pk, key, is_view, is_owned,
                );
            }
        }

        if !pk.error {
            pk.logger.mark_as_ok(logs, Some(model_pk_name), None);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn compare_property(
        &mut self,
        logs: &mut Vec<CompareLog>,
        entity: &SchemaEntity,
        property: &SchemaProperty,
        columns: &HashMap<String, &Column>,
        pk: &mut PrimaryKeyCheck<'_>,
        key: &str,
        is_view: bool,
        is_owned: bool,
    ) {
        // Not mapped to this table: TPH siblings, split tables, owned types
        // stored elsewhere.
        let Some(column_name) =
            property.resolve(key, is_view, &self.default_schema, self.collation)
        else {
            return;
        };
        let logger = CompareLogger::new(CompareType::Property, &property.name, self.config);

        let Some(column) = columns.get(&self.collation.key(column_name)) else {
            logger.not_in_database(logs, Some(column_name), CompareAttribute::ColumnName, None);
            return;
        };
        self.usage.mark_column(self.collation, key, &column.name);

        let mut error =
            self.compare_property_to_column(logs, &logger, entity, property, column, is_view, is_owned);

        if !is_view && !is_owned {
            let in_model_pk = self
                .model
                .primary_key_of(entity)
                .is_some_and(|pk_key| pk_key.properties.iter().any(|name| name == &property.name));
            let in_db_pk = pk
                .db_columns
                .iter()
                .any(|pk_column| self.collation.equals(pk_column, column_name));

            if in_model_pk && !in_db_pk {
                pk.logger
                    .not_in_database(logs, Some(column_name), CompareAttribute::ColumnName, None);
                pk.error = true;
                error = true;
            } else if !in_model_pk && in_db_pk {
                pk.logger.extra_in_database(
                    logs,
                    Some(column_name),
                    CompareAttribute::ColumnName,
                    pk.db_name,
                );
                pk.error = true;
            }
        }

        if !error {
            logger.mark_as_ok(logs, Some(column_name), None);
        }
    }

    /// Compare every attribute of the column, returning true if any differed.
    #[allow(clippy::too_many_arguments)]
    fn compare_property_to_column(
        &self,
        logs: &mut Vec<CompareLog>,
        logger: &CompareLogger<'_>,
        entity: &SchemaEntity,
        property: &SchemaProperty,
        column: &Column,
        is_view: bool,
        is_owned: bool,
    ) -> bool {
        let mut error = logger.check_different(
            logs,
            Some(property.column_type.as_str()),
            Some(column.store_type.as_str()),
            CompareAttribute::ColumnType,
            None,
        );
        error |= logger.check_different(
            logs,
            Some(nullable_text(property.is_nullable)),
            Some(nullable_text(column.is_nullable)),
            CompareAttribute::Nullability,
            None,
        );
        error |= logger.check_different(
            logs,
            normalize(property.computed_sql.as_deref()),
            normalize(column.computed_sql()),
            CompareAttribute::ComputedColumnSql,
            None,
        );
        if property.computed_sql.is_some() {
            error |= logger.check_different(
                logs,
                Some(bool_text(property.is_stored.unwrap_or(false))),
                Some(bool_text(column.is_stored())),
                CompareAttribute::PersistentComputedColumn,
                None,
            );
        }

        let model_default = match &property.default_value {
            Some(literal) => Some(self.dialect.sql_literal(literal)),
            None => normalize(property.default_sql.as_deref()).map(str::to_string),
        };
        error |= logger.check_different(
            logs,
            model_default.as_deref(),
            normalize(column.default.as_deref()),
            CompareAttribute::DefaultValueSql,
            None,
        );

        if !is_view {
            error |= self.check_value_generated(logs, logger, entity, property, column, is_owned);
        }
        error
    }

    fn check_value_generated(
        &self,
        logs: &mut Vec<CompareLog>,
        logger: &CompareLogger<'_>,
        entity: &SchemaEntity,
        property: &SchemaProperty,
        column: &Column,
        is_owned: bool,
    ) -> bool {
        let is_key = self
            .model
            .primary_key_of(entity)
            .is_some_and(|pk_key| pk_key.properties.iter().any(|name| name == &property.name));

        // Owned keys are generated by the owner.
        if is_key && is_owned {
            return false;
        }
        // Shared primary key whose value comes from another entity.
        if is_key && self.has_foreign_principal(entity, property) {
            return false;
        }

        let found = column.value_generated();
        if found == ValueGenerated::Never
            && property.value_generated == ValueGenerated::OnAdd
            && is_key
            && !is_integer_clr_type(&property.clr_type)
        {
            return false;
        }

        logger.check_different(
            logs,
            Some(property.value_generated.as_str()),
            Some(found.as_str()),
            CompareAttribute::ValueGenerated,
            None,
        )
    }

    fn has_foreign_principal(&self, entity: &SchemaEntity, property: &SchemaProperty) -> bool {
        let declaring = entity.declaring_entity_of(property);
        entity.foreign_keys.iter().any(|fk| {
            fk.properties.iter().any(|name| name == &property.name) && fk.principal_entity != declaring
        })
    }
}
