//! Entry point of a comparison run.

use serde::{Deserialize, Serialize};

use schemadrift_core::{
    Collation, CompareAttribute, CompareConfig, CompareLog, CompareType, DatabaseSchema, Dialect,
    ModelSchema, SchemaEntity, dialect_for, validate_model, validate_schema,
};

use crate::errors::Result;
use crate::logger::CompareLogger;
use crate::report;
use crate::tables::{TableIndex, Usage};

/// Placeholder used when either side has no primary key.
pub(crate) const NO_PRIMARY_KEY: &str = "- no primary key -";

/// Result of one comparison run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareOutcome {
    /// True when any non-ignored node is an error.
    pub has_errors: bool,
    pub logs: Vec<CompareLog>,
}

impl CompareOutcome {
    /// Newline-joined text rendering of every non-`Ok`, non-ignored node.
    pub fn report(&self) -> String {
        report::flatten(&self.logs)
    }
}

/// Compares a model snapshot against a database snapshot.
pub struct SchemaComparer {
    config: CompareConfig,
    dialect: Option<Box<dyn Dialect>>,
}

impl SchemaComparer {
    pub fn new(config: CompareConfig) -> Self {
        Self {
            config,
            dialect: None,
        }
    }

    /// Use `dialect` instead of the one implied by the snapshot's engine.
    pub fn with_dialect(mut self, dialect: Box<dyn Dialect>) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Run both passes and return the log tree.
    ///
    /// Discrepancies are reported in the outcome; an `Err` means the inputs
    /// or the configuration could not be used at all.
    pub fn compare(
        &self,
        model: &ModelSchema,
        database: &DatabaseSchema,
    ) -> Result<CompareOutcome> {
        validate_model(model)?;
        validate_schema(database)?;

        let fallback;
        let dialect: &dyn Dialect = match &self.dialect {
            Some(dialect) => dialect.as_ref(),
            None => {
                fallback = dialect_for(&database.engine)?;
                fallback.as_ref()
            }
        };
        let default_schema = database
            .default_schema
            .clone()
            .unwrap_or_else(|| dialect.default_schema().to_string());
        let collation = self.config.collation();
        let tables = TableIndex::build(
            database,
            &default_schema,
            collation,
            &self.config.ignored_tables(),
        )?;

        tracing::info!(
            event = "comparison_started",
            context = %model.context_name,
            entities = model.entities.len(),
            tables = tables.iter().count(),
            engine = dialect.engine()
        );

        let mut comparison = Comparison {
            config: &self.config,
            dialect,
            model,
            collation,
            default_schema,
            tables,
            usage: Usage::default(),
        };

        let mut logs = Vec::new();
        let context_logger =
            CompareLogger::new(CompareType::DbContext, &model.context_name, &self.config);
        context_logger.mark_as_ok(&mut logs, Some(model.context_name.as_str()), None);
        comparison.report_unmapped(&context_logger, &mut logs);
        comparison.compare_entities(&mut logs[0].sub_logs);
        comparison.compare_check_constraints(&context_logger, &mut logs);

        let first_pass_errors = logs.iter().any(CompareLog::has_errors);
        if !first_pass_errors && self.config.check_unused_database_objects {
            comparison.report_unused(&mut logs[0].sub_logs);
        }

        let has_errors = logs.iter().any(CompareLog::has_errors);
        tracing::info!(
            event = "comparison_finished",
            context = %model.context_name,
            has_errors,
            unused_scan = !first_pass_errors && self.config.check_unused_database_objects
        );

        Ok(CompareOutcome { has_errors, logs })
    }
}

/// State shared by the comparers during a single run.
pub(crate) struct Comparison<'a> {
    pub config: &'a CompareConfig,
    pub dialect: &'a dyn Dialect,
    pub model: &'a ModelSchema,
    pub collation: Collation,
    pub default_schema: String,
    pub tables: TableIndex<'a>,
    pub usage: Usage,
}

impl<'a> Comparison<'a> {
    /// Entities matched against a table of their own. Owned types sharing
    /// their owner's table and JSON documents are compared through the owner.
    fn is_standalone(&self, entity: &SchemaEntity) -> bool {
        if entity.is_mapped_to_json {
            return false;
        }
        if !entity.is_owned {
            return true;
        }
        match entity.owner.as_deref().and_then(|owner| self.model.entity(owner)) {
            Some(owner) => !entity.is_stored_with(owner),
            None => entity.table_name.is_some(),
        }
    }

    /// `[schema.]table` key of the store object holding `entity`'s columns.
    pub fn store_key_of(&self, entity: &SchemaEntity) -> Option<String> {
        let mut current = entity;
        loop {
            if current.is_owned && !self.is_standalone(current) {
                match current.owner.as_deref().and_then(|owner| self.model.entity(owner)) {
                    Some(owner) => {
                        current = owner;
                        continue;
                    }
                    None => return None,
                }
            }
            return current.store_name(&self.default_schema);
        }
    }

    /// Entity plus the owned types folded into its table.
    pub fn with_folded_owned(&self, entity: &'a SchemaEntity) -> Vec<&'a SchemaEntity> {
        let mut entities = vec![entity];
        entities.extend(self.model.owned_in_table_of(entity));
        entities
    }

    /// One context-level `NotChecked` entry naming every entity without a
    /// table or view.
    fn report_unmapped(&self, context_logger: &CompareLogger<'_>, logs: &mut Vec<CompareLog>) {
        let unmapped: Vec<&str> = self
            .model
            .entities
            .iter()
            .filter(|entity| self.is_standalone(entity) && entity.table_name.is_none())
            .map(SchemaEntity::clr_name)
            .collect();
        if !unmapped.is_empty() {
            context_logger.mark_as_not_checked(
                logs,
                Some(unmapped.join(", ").as_str()),
                None,
                CompareAttribute::NotMappedToDatabase,
            );
        }
    }

    fn compare_entities(&mut self, logs: &mut Vec<CompareLog>) {
        let model = self.model;

        let standalone: Vec<&'a SchemaEntity> = model
            .entities
            .iter()
            .filter(|entity| self.is_standalone(entity))
            .collect();

        for entity in standalone {
            let Some(key) = entity.store_name(&self.default_schema) else {
                continue;
            };
            let logger = CompareLogger::new(CompareType::Entity, entity.clr_name(), self.config);

            match self.tables.get(&key) {
                Some(db_table) => {
                    tracing::debug!(
                        event = "entity_matched",
                        entity = %entity.name,
                        table = %key,
                        is_view = entity.is_view
                    );
                    self.usage.mark_table(self.collation, &key);
                    let log = logger.mark_as_ok(logs, Some(key.as_str()), None);
                    self.compare_columns(&mut log.sub_logs, entity, db_table, &key);
                    self.compare_foreign_keys(&mut log.sub_logs, entity, db_table, &key);
                    self.compare_indexes(&mut log.sub_logs, entity, db_table, &key);
                }
                None => {
                    tracing::debug!(event = "entity_unmatched", entity = %entity.name, table = %key);
                    logger.not_in_database(
                        logs,
                        Some(key.as_str()),
                        CompareAttribute::TableName,
                        None,
                    );
                }
            }
        }
    }
}
