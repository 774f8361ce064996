//! Context-level check constraint comparison.

use std::collections::{HashMap, HashSet};

use schemadrift_core::{CompareAttribute, CompareLog, split_schema_table};

use crate::brackets::remove_unnecessary_brackets;
use crate::comparer::Comparison;
use crate::logger::CompareLogger;

/// One check constraint from either side, keyed by table and name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CheckRecord {
    table: String,
    name: String,
    clause: String,
    key: String,
}

impl CheckRecord {
    fn text(&self) -> String {
        format!("{} {} {}", self.table, self.name, self.clause)
    }
}

impl Comparison<'_> {
    pub(crate) fn compare_check_constraints(
        &self,
        logger: &CompareLogger<'_>,
        logs: &mut Vec<CompareLog>,
    ) {
        let mut model_checks = self.model_check_constraints();
        let mut db_checks = self.database_check_constraints();
        model_checks.sort_by(|left, right| left.name.cmp(&right.name));
        db_checks.sort_by(|left, right| left.name.cmp(&right.name));

        let model_by_key: HashMap<&str, &CheckRecord> = model_checks
            .iter()
            .map(|check| (check.key.as_str(), check))
            .collect();
        let db_keys: HashSet<&str> = db_checks.iter().map(|check| check.key.as_str()).collect();

        for db_check in &db_checks {
            match model_by_key.get(db_check.key.as_str()) {
                Some(model_check) => {
                    let expected = remove_unnecessary_brackets(&model_check.clause);
                    let found = remove_unnecessary_brackets(&db_check.clause);
                    if !self.collation.equals(expected, found) {
                        logger.check_different(
                            logs,
                            Some(model_check.text().as_str()),
                            Some(db_check.text().as_str()),
                            CompareAttribute::CheckConstraint,
                            None,
                        );
                    }
                }
                None => logger.extra_in_database(
                    logs,
                    Some(db_check.text().as_str()),
                    CompareAttribute::CheckConstraint,
                    None,
                ),
            }
        }

        for model_check in &model_checks {
            if !db_keys.contains(model_check.key.as_str()) {
                logger.not_in_database(
                    logs,
                    Some(model_check.text().as_str()),
                    CompareAttribute::CheckConstraint,
                    None,
                );
            }
        }
    }

    fn check_key(&self, table_key: &str, name: &str) -> String {
        format!("{}\u{0}{}", self.collation.key(table_key), self.collation.key(name))
    }

    fn model_check_constraints(&self) -> Vec<CheckRecord> {
        let mut seen = HashSet::new();
        let mut checks = Vec::new();
        for entity in self.model.entities.iter().filter(|entity| !entity.is_view) {
            if entity.check_constraints.is_empty() {
                continue;
            }
            let Some(table_key) = self.store_key_of(entity) else {
                continue;
            };
            let (_, table) = split_schema_table(&table_key, &self.default_schema);
            for check in &entity.check_constraints {
                let key = self.check_key(&table_key, &check.name);
                if seen.insert(key.clone()) {
                    checks.push(CheckRecord {
                        table: table.to_string(),
                        name: check.name.clone(),
                        clause: format!("(({}))", check.sql),
                        key,
                    });
                }
            }
        }
        checks
    }

    /// Explicit check constraints of the tables the model maps to.
    fn database_check_constraints(&self) -> Vec<CheckRecord> {
        let mapped: HashSet<String> = self
            .model
            .entities
            .iter()
            .filter(|entity| !entity.is_view)
            .filter_map(|entity| self.store_key_of(entity))
            .map(|key| self.collation.key(&key))
            .collect();

        let mut checks = Vec::new();
        for db_table in self.tables.iter() {
            if db_table.table.is_view() {
                continue;
            }
            let table_key = self.tables.key_of(&db_table);
            if !mapped.contains(&self.collation.key(&table_key)) {
                continue;
            }
            for check in db_table.table.check_constraints() {
                if self.dialect.is_implicit_not_null(check) {
                    continue;
                }
                let name = check.name.as_deref().unwrap_or_default();
                checks.push(CheckRecord {
                    table: db_table.table.name.clone(),
                    name: name.to_string(),
                    clause: check.expression.clone(),
                    key: self.check_key(&table_key, name),
                });
            }
        }
        checks
    }
}
