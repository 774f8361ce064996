use schemadrift_core::{FkMatchType, GeneratedKind, IdentityGeneration, TableKind};

/// Convert a Postgres `relkind` code to a typed table kind.
pub fn relkind_to_table_kind(code: &str) -> TableKind {
    match code {
        "r" => TableKind::Table,
        "p" => TableKind::PartitionedTable,
        "v" => TableKind::View,
        "m" => TableKind::MaterializedView,
        "f" => TableKind::ForeignTable,
        other => TableKind::Other(other.to_string()),
    }
}

/// Convert a `confmatchtype` code to the match semantics.
pub fn fk_match_from_code(code: &str) -> FkMatchType {
    match code {
        "f" => FkMatchType::Full,
        "p" => FkMatchType::Partial,
        "s" => FkMatchType::Simple,
        _ => FkMatchType::Unknown,
    }
}

/// Map textual identity generation to the snapshot enum.
pub fn identity_from_text(identity: Option<&str>) -> Option<IdentityGeneration> {
    match identity? {
        "ALWAYS" => Some(IdentityGeneration::Always),
        "BY DEFAULT" => Some(IdentityGeneration::ByDefault),
        _ => None,
    }
}

/// Convert an `attgenerated` code; empty means not generated.
pub fn generated_kind_from_code(code: &str) -> Option<GeneratedKind> {
    match code {
        "s" => Some(GeneratedKind::Stored),
        "v" => Some(GeneratedKind::Virtual),
        _ => None,
    }
}

/// Name of an `attcompression` method code.
pub fn compression_from_code(code: Option<&str>) -> Option<String> {
    match code? {
        "p" => Some("pglz".to_string()),
        "l" => Some("lz4".to_string()),
        _ => None,
    }
}
