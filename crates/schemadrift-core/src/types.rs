use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constraints::FkAction;

/// Identity generation strategy for columns using `GENERATED ... AS IDENTITY`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IdentityGeneration {
    Always,
    ByDefault,
}

/// Storage kind of a computed column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GeneratedKind {
    Stored,
    Virtual,
}

/// Information about computed column expressions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedExpression {
    pub kind: GeneratedKind,
    pub expression: Option<String>,
}

/// When a column value is supplied by the database rather than the application.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum ValueGenerated {
    #[default]
    Never,
    OnAdd,
    OnAddOrUpdate,
}

impl ValueGenerated {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueGenerated::Never => "Never",
            ValueGenerated::OnAdd => "OnAdd",
            ValueGenerated::OnAddOrUpdate => "OnAddOrUpdate",
        }
    }
}

impl fmt::Display for ValueGenerated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delete behaviour declared on a model relationship.
///
/// The `Client*` variants are enforced by the application only; the database
/// side of such a relationship is `NO ACTION`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum DeleteBehavior {
    #[default]
    ClientSetNull,
    Restrict,
    SetNull,
    Cascade,
    ClientCascade,
    NoAction,
    ClientNoAction,
}

impl DeleteBehavior {
    pub fn as_str(self) -> &'static str {
        match self {
            DeleteBehavior::ClientSetNull => "ClientSetNull",
            DeleteBehavior::Restrict => "Restrict",
            DeleteBehavior::SetNull => "SetNull",
            DeleteBehavior::Cascade => "Cascade",
            DeleteBehavior::ClientCascade => "ClientCascade",
            DeleteBehavior::NoAction => "NoAction",
            DeleteBehavior::ClientNoAction => "ClientNoAction",
        }
    }

    /// Referential action this behaviour is expected to create in the database.
    pub fn referential_action(self) -> FkAction {
        match self {
            DeleteBehavior::Cascade => FkAction::Cascade,
            DeleteBehavior::Restrict => FkAction::Restrict,
            DeleteBehavior::SetNull => FkAction::SetNull,
            DeleteBehavior::ClientSetNull
            | DeleteBehavior::ClientCascade
            | DeleteBehavior::NoAction
            | DeleteBehavior::ClientNoAction => FkAction::NoAction,
        }
    }

    /// Name a database action would be described by when it does not match
    /// the declared behaviour.
    pub fn describe_action(action: FkAction) -> &'static str {
        match action {
            FkAction::NoAction => "NoAction",
            FkAction::Restrict => "Restrict",
            FkAction::Cascade => "Cascade",
            FkAction::SetNull => "SetNull",
            FkAction::SetDefault => "SetDefault",
            FkAction::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DeleteBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal default value declared on a model property.
///
/// Rendered to SQL through the target engine's [`crate::Dialect`] before it
/// is compared with the catalog default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DefaultLiteral {
    Bool(bool),
    Integer(i64),
    Float(f64),
    /// Exact decimal kept as text to avoid float rounding.
    Decimal(String),
    Text(String),
    Guid(String),
    /// ISO-8601 timestamp without offset, e.g. `2020-01-01T00:00:00`.
    DateTime(String),
}

const INTEGER_CLR_TYPES: &[&str] = &[
    "byte", "sbyte", "short", "ushort", "int", "uint", "long", "ulong", "Byte", "SByte", "Int16",
    "UInt16", "Int32", "UInt32", "Int64", "UInt64",
];

/// Returns true for non-nullable integral CLR type names.
pub fn is_integer_clr_type(clr_type: &str) -> bool {
    let bare = clr_type.strip_prefix("System.").unwrap_or(clr_type);
    INTEGER_CLR_TYPES.contains(&bare)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_behaviours_expect_no_action() {
        assert_eq!(
            DeleteBehavior::ClientSetNull.referential_action(),
            FkAction::NoAction
        );
        assert_eq!(
            DeleteBehavior::ClientCascade.referential_action(),
            FkAction::NoAction
        );
        assert_eq!(DeleteBehavior::Cascade.referential_action(), FkAction::Cascade);
        assert_eq!(DeleteBehavior::SetNull.referential_action(), FkAction::SetNull);
    }

    #[test]
    fn recognises_integer_clr_types() {
        assert!(is_integer_clr_type("int"));
        assert!(is_integer_clr_type("System.Int64"));
        assert!(!is_integer_clr_type("int?"));
        assert!(!is_integer_clr_type("Guid"));
        assert!(!is_integer_clr_type("string"));
    }

    #[test]
    fn default_literal_uses_tagged_json() {
        let literal: DefaultLiteral =
            serde_json::from_str(r#"{"type":"text","value":"abc"}"#).expect("parse literal");
        assert_eq!(literal, DefaultLiteral::Text("abc".to_string()));
    }
}
