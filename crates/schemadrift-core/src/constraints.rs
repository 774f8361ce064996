use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Primary key definition preserving column order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PrimaryKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Unique constraint definition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UniqueConstraint {
    pub name: Option<String>,
    pub columns: Vec<String>,
    #[serde(default)]
    pub is_deferrable: bool,
}

/// Check constraint as reported by the catalog.
///
/// `expression` holds the bare clause text (for example
/// `(("Title" IS NOT NULL))`), not a full `CHECK (...)` definition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CheckConstraint {
    pub name: Option<String>,
    pub expression: String,
}

/// Referential action on a foreign key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FkAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
    Unknown,
}

impl FkAction {
    /// SQL spelling of the action, as written in DDL.
    pub fn as_sql(self) -> &'static str {
        match self {
            FkAction::NoAction => "NO ACTION",
            FkAction::Restrict => "RESTRICT",
            FkAction::Cascade => "CASCADE",
            FkAction::SetNull => "SET NULL",
            FkAction::SetDefault => "SET DEFAULT",
            FkAction::Unknown => "UNKNOWN",
        }
    }

    /// Parse the SQL spelling used by catalog views (`information_schema`,
    /// `sys.foreign_keys`). Unrecognised text maps to `Unknown`.
    pub fn from_sql(text: &str) -> FkAction {
        match text.trim().to_ascii_uppercase().replace('_', " ").as_str() {
            "NO ACTION" => FkAction::NoAction,
            "RESTRICT" => FkAction::Restrict,
            "CASCADE" => FkAction::Cascade,
            "SET NULL" => FkAction::SetNull,
            "SET DEFAULT" => FkAction::SetDefault,
            _ => FkAction::Unknown,
        }
    }
}

/// Foreign key match semantics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FkMatchType {
    Full,
    Partial,
    Simple,
    Unknown,
}

/// Foreign key definition preserving column ordering.
///
/// `name` is `None` when the driver could not report the constraint name.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_update: FkAction,
    pub on_delete: FkAction,
    pub match_type: FkMatchType,
}

/// Index definition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_primary: bool,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
}

/// Table-level constraint definitions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    PrimaryKey(PrimaryKey),
    ForeignKey(ForeignKey),
    Unique(UniqueConstraint),
    Check(CheckConstraint),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_action_spellings() {
        assert_eq!(FkAction::from_sql("SET NULL"), FkAction::SetNull);
        assert_eq!(FkAction::from_sql("set_default"), FkAction::SetDefault);
        assert_eq!(FkAction::from_sql(" cascade "), FkAction::Cascade);
        assert_eq!(FkAction::from_sql("whatever"), FkAction::Unknown);
    }
}
