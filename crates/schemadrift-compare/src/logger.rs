//! Builder for [`CompareLog`] nodes.
//!
//! A logger is bound to one comparison type and subject. Every entry it
//! emits is matched against the configured ignore patterns before it is
//! appended; matching entries are kept in the tree with `ignored` set.

use schemadrift_core::{
    Collation, CompareAttribute, CompareConfig, CompareLog, CompareState, CompareType,
};

pub(crate) struct CompareLogger<'a> {
    compare_type: CompareType,
    default_name: String,
    config: &'a CompareConfig,
}

impl<'a> CompareLogger<'a> {
    pub fn new(
        compare_type: CompareType,
        default_name: impl Into<String>,
        config: &'a CompareConfig,
    ) -> Self {
        Self {
            compare_type,
            default_name: default_name.into(),
            config,
        }
    }

    fn collation(&self) -> Collation {
        self.config.collation()
    }

    fn push<'l>(
        &self,
        logs: &'l mut Vec<CompareLog>,
        state: CompareState,
        name: Option<&str>,
        attribute: CompareAttribute,
        expected: Option<&str>,
        found: Option<&str>,
    ) -> &'l mut CompareLog {
        let mut log = CompareLog::new(
            self.compare_type,
            state,
            name.unwrap_or(&self.default_name),
            attribute,
            expected.map(str::to_string),
            found.map(str::to_string),
        );
        log.ignored = self.config.should_ignore(&log);
        if log.ignored {
            tracing::debug!(
                event = "log_ignored",
                compare_type = %log.compare_type,
                name = %log.name,
                state = log.state.label()
            );
        }
        logs.push(log);
        let last = logs.len() - 1;
        &mut logs[last]
    }

    /// Append an `Ok` node and return it so children can be added under it.
    pub fn mark_as_ok<'l>(
        &self,
        logs: &'l mut Vec<CompareLog>,
        expected: Option<&str>,
        name: Option<&str>,
    ) -> &'l mut CompareLog {
        self.push(
            logs,
            CompareState::Ok,
            name,
            CompareAttribute::NotSet,
            expected,
            None,
        )
    }

    /// Record a `Different` node when `expected` and `found` disagree under
    /// the configured collation. Returns true when they differ, whether or
    /// not the entry matched an ignore pattern.
    pub fn check_different(
        &self,
        logs: &mut Vec<CompareLog>,
        expected: Option<&str>,
        found: Option<&str>,
        attribute: CompareAttribute,
        name: Option<&str>,
    ) -> bool {
        let same = match (expected, found) {
            (None, None) => true,
            (Some(expected), Some(found)) => self.collation().equals(expected, found),
            _ => false,
        };
        if !same {
            self.push(
                logs,
                CompareState::Different,
                name,
                attribute,
                expected,
                found,
            );
        }
        !same
    }

    pub fn not_in_database(
        &self,
        logs: &mut Vec<CompareLog>,
        expected: Option<&str>,
        attribute: CompareAttribute,
        name: Option<&str>,
    ) {
        self.push(
            logs,
            CompareState::NotInDatabase,
            name,
            attribute,
            expected,
            None,
        );
    }

    pub fn extra_in_database(
        &self,
        logs: &mut Vec<CompareLog>,
        found: Option<&str>,
        attribute: CompareAttribute,
        name: Option<&str>,
    ) {
        self.push(
            logs,
            CompareState::ExtraInDatabase,
            name,
            attribute,
            None,
            found,
        );
    }

    pub fn mark_as_not_checked(
        &self,
        logs: &mut Vec<CompareLog>,
        expected: Option<&str>,
        name: Option<&str>,
        attribute: CompareAttribute,
    ) {
        self.push(
            logs,
            CompareState::NotChecked,
            name,
            attribute,
            expected,
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemadrift_core::LogIgnore;

    #[test]
    fn ok_node_accepts_children() {
        let config = CompareConfig::default();
        let entity = CompareLogger::new(CompareType::Entity, "Book", &config);
        let property = CompareLogger::new(CompareType::Property, "Title", &config);

        let mut logs = Vec::new();
        let node = entity.mark_as_ok(&mut logs, Some("Book"), None);
        property.not_in_database(
            &mut node.sub_logs,
            Some("Title"),
            CompareAttribute::ColumnName,
            None,
        );

        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].sub_logs[0].state, CompareState::NotInDatabase);
        assert!(logs[0].has_errors());
    }

    #[test]
    fn check_different_respects_collation() {
        let config = CompareConfig {
            case_sensitive: false,
            ..CompareConfig::default()
        };
        let logger = CompareLogger::new(CompareType::Property, "Title", &config);
        let mut logs = Vec::new();

        assert!(!logger.check_different(
            &mut logs,
            Some("TEXT"),
            Some("text"),
            CompareAttribute::ColumnType,
            None
        ));
        assert!(!logger.check_different(&mut logs, None, None, CompareAttribute::DefaultValueSql, None));
        assert!(logger.check_different(
            &mut logs,
            None,
            Some("0"),
            CompareAttribute::DefaultValueSql,
            None
        ));
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].found.as_deref(), Some("0"));
    }

    #[test]
    fn ignored_entries_are_kept_but_not_errors() {
        let mut pattern = LogIgnore::new(CompareType::Index);
        pattern.attribute = Some(CompareAttribute::IndexConstraintName);
        let config = CompareConfig {
            logs_to_ignore: vec![pattern],
            ..CompareConfig::default()
        };
        let logger = CompareLogger::new(CompareType::Index, "Title", &config);
        let mut logs = Vec::new();
        logger.not_in_database(&mut logs, Some("IX_Book_Title"), CompareAttribute::IndexConstraintName, None);

        assert_eq!(logs.len(), 1);
        assert!(logs[0].ignored);
        assert!(!logs[0].has_errors());
    }
}
