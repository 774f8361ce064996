use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// String collation used for name lookups and value comparisons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Collation {
    #[default]
    CaseSensitive,
    CaseInsensitive,
}

impl Collation {
    pub fn from_case_sensitive(case_sensitive: bool) -> Self {
        if case_sensitive {
            Collation::CaseSensitive
        } else {
            Collation::CaseInsensitive
        }
    }

    /// Dictionary key for `value` under this collation.
    pub fn key(self, value: &str) -> String {
        match self {
            Collation::CaseSensitive => value.to_string(),
            Collation::CaseInsensitive => value.to_lowercase(),
        }
    }

    pub fn equals(self, left: &str, right: &str) -> bool {
        match self {
            Collation::CaseSensitive => left == right,
            Collation::CaseInsensitive => left.to_lowercase() == right.to_lowercase(),
        }
    }
}

/// Form the `[schema.]table` display name used on both sides of a comparison.
///
/// Objects in the default schema are left unqualified.
pub fn schema_table(schema: Option<&str>, table: &str, default_schema: &str) -> String {
    match schema {
        Some(schema) if !schema.is_empty() && schema != default_schema => {
            format!("{schema}.{table}")
        }
        _ => table.to_string(),
    }
}

/// Split a `[schema.]table` reference, filling in the default schema.
pub fn split_schema_table<'a>(reference: &'a str, default_schema: &'a str) -> (&'a str, &'a str) {
    match reference.split_once('.') {
        Some((schema, table)) => (schema, table),
        None => (default_schema, reference),
    }
}
