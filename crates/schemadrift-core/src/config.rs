use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::log::{CompareAttribute, CompareLog, CompareState, CompareType};
use crate::naming::Collation;

/// Options for one comparison run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CompareConfig {
    /// Comma-delimited `[schema.]table` list removed from the database side
    /// before matching. `None` also means unmapped database tables are not
    /// reported by the unused-object scan.
    pub tables_to_ignore: Option<String>,
    /// Patterns of log entries that never count as errors.
    pub logs_to_ignore: Vec<LogIgnore>,
    pub case_sensitive: bool,
    /// Run the unused-object scan after a clean first pass.
    pub check_unused_database_objects: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            tables_to_ignore: None,
            logs_to_ignore: Vec::new(),
            case_sensitive: true,
            check_unused_database_objects: true,
        }
    }
}

impl CompareConfig {
    pub fn collation(&self) -> Collation {
        Collation::from_case_sensitive(self.case_sensitive)
    }

    /// Trimmed, non-empty entries of `tables_to_ignore`.
    pub fn ignored_tables(&self) -> Vec<&str> {
        self.tables_to_ignore
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `log` matches any configured ignore pattern.
    pub fn should_ignore(&self, log: &CompareLog) -> bool {
        self.logs_to_ignore.iter().any(|pattern| pattern.matches(log))
    }
}

/// Pattern matched against emitted log entries. Unset fields match anything.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LogIgnore {
    pub compare_type: CompareType,
    #[serde(default)]
    pub state: Option<CompareState>,
    /// Subject name; `*` matches any run of characters.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attribute: Option<CompareAttribute>,
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub found: Option<String>,
}

impl LogIgnore {
    pub fn new(compare_type: CompareType) -> Self {
        Self {
            compare_type,
            state: None,
            name: None,
            attribute: None,
            expected: None,
            found: None,
        }
    }

    pub fn matches(&self, log: &CompareLog) -> bool {
        self.compare_type == log.compare_type
            && self.state.is_none_or(|state| state == log.state)
            && self
                .name
                .as_deref()
                .is_none_or(|pattern| glob_match(pattern, &log.name))
            && self.attribute.is_none_or(|attribute| attribute == log.attribute)
            && optional_matches(self.expected.as_deref(), log.expected.as_deref())
            && optional_matches(self.found.as_deref(), log.found.as_deref())
    }
}

fn optional_matches(pattern: Option<&str>, value: Option<&str>) -> bool {
    match pattern {
        None => true,
        Some(pattern) => glob_match(pattern, value.unwrap_or_default()),
    }
}

/// Match `text` against a pattern where `*` stands for any run of characters.
fn glob_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return text.is_empty();
    };
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };

    let parts: Vec<&str> = parts.collect();
    let Some((last, middle)) = parts.split_last() else {
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.len() >= last.len() && rest.ends_with(last)
}
