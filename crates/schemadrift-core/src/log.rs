use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of object a [`CompareLog`] node describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CompareType {
    DbContext,
    Entity,
    Property,
    ForeignKey,
    Index,
    PrimaryKey,
    CheckConstraint,
    Table,
    Column,
}

impl CompareType {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareType::DbContext => "DbContext",
            CompareType::Entity => "Entity",
            CompareType::Property => "Property",
            CompareType::ForeignKey => "ForeignKey",
            CompareType::Index => "Index",
            CompareType::PrimaryKey => "PrimaryKey",
            CompareType::CheckConstraint => "CheckConstraint",
            CompareType::Table => "Table",
            CompareType::Column => "Column",
        }
    }
}

impl fmt::Display for CompareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome recorded on a [`CompareLog`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CompareState {
    Ok,
    ExtraInDatabase,
    NotInDatabase,
    Different,
    NotChecked,
}

impl CompareState {
    /// States that make a run fail unless the node is ignored.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            CompareState::ExtraInDatabase | CompareState::NotInDatabase | CompareState::Different
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            CompareState::Ok => "OK",
            CompareState::ExtraInDatabase => "EXTRA IN DATABASE",
            CompareState::NotInDatabase => "NOT IN DATABASE",
            CompareState::Different => "DIFFERENT",
            CompareState::NotChecked => "NOT CHECKED",
        }
    }
}

/// Which aspect of the subject a node compares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CompareAttribute {
    #[default]
    NotSet,
    TableName,
    ColumnName,
    ColumnType,
    Nullability,
    ComputedColumnSql,
    PersistentComputedColumn,
    DefaultValueSql,
    ValueGenerated,
    ConstraintName,
    DeleteBehavior,
    Unique,
    IndexConstraintName,
    CheckConstraint,
    NotMappedToDatabase,
}

impl CompareAttribute {
    /// Lower-case words used in the text report.
    pub fn words(self) -> &'static str {
        match self {
            CompareAttribute::NotSet => "",
            CompareAttribute::TableName => "table name",
            CompareAttribute::ColumnName => "column name",
            CompareAttribute::ColumnType => "column type",
            CompareAttribute::Nullability => "nullability",
            CompareAttribute::ComputedColumnSql => "computed column sql",
            CompareAttribute::PersistentComputedColumn => "persistent computed column",
            CompareAttribute::DefaultValueSql => "default value sql",
            CompareAttribute::ValueGenerated => "value generated",
            CompareAttribute::ConstraintName => "constraint name",
            CompareAttribute::DeleteBehavior => "delete behavior",
            CompareAttribute::Unique => "unique",
            CompareAttribute::IndexConstraintName => "index constraint name",
            CompareAttribute::CheckConstraint => "check constraint",
            CompareAttribute::NotMappedToDatabase => "not mapped to database",
        }
    }
}

/// A node of the comparison report tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompareLog {
    pub compare_type: CompareType,
    pub state: CompareState,
    pub name: String,
    #[serde(default)]
    pub attribute: CompareAttribute,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found: Option<String>,
    /// Matched an ignore pattern: kept for visibility, never an error.
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignored: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_logs: Vec<CompareLog>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl CompareLog {
    pub fn new(
        compare_type: CompareType,
        state: CompareState,
        name: impl Into<String>,
        attribute: CompareAttribute,
        expected: Option<String>,
        found: Option<String>,
    ) -> Self {
        Self {
            compare_type,
            state,
            name: name.into(),
            attribute,
            expected,
            found,
            ignored: false,
            sub_logs: Vec::new(),
        }
    }

    /// True when this node alone counts towards the run's error verdict.
    pub fn is_error(&self) -> bool {
        self.state.is_error() && !self.ignored
    }

    /// True when this node or any descendant counts as an error.
    pub fn has_errors(&self) -> bool {
        self.is_error() || self.sub_logs.iter().any(CompareLog::has_errors)
    }
}

impl CompareLog {
    /// Render this node as one report line, with `prefix` inserted before
    /// the comparison type (e.g. `Book->`).
    pub fn render(&self, prefix: &str) -> String {
        let mut line = format!(
            "{}: {prefix}{} '{}'",
            self.state.label(),
            self.compare_type,
            self.name
        );
        if self.attribute != CompareAttribute::NotSet {
            line.push_str(", ");
            line.push_str(self.attribute.words());
        }
        match self.state {
            CompareState::Ok => {}
            CompareState::Different => {
                line.push_str(&format!(
                    ". Expected = {}, found = {}",
                    self.expected.as_deref().unwrap_or("<null>"),
                    self.found.as_deref().unwrap_or("<null>")
                ));
            }
            _ => {
                if let Some(expected) = &self.expected {
                    line.push_str(&format!(". Expected = {expected}"));
                }
                match (&self.expected, &self.found) {
                    (Some(_), Some(found)) => line.push_str(&format!(", found = {found}")),
                    (None, Some(found)) => line.push_str(&format!(". Found = {found}")),
                    _ => {}
                }
            }
        }
        line
    }
}

impl fmt::Display for CompareLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(""))
    }
}
