/// Options that control which catalog objects are captured.
#[derive(Debug, Clone)]
pub struct IntrospectOptions {
    /// Restrict the snapshot to these schemas. `None` captures every
    /// non-system schema.
    pub schemas: Option<Vec<String>>,
    pub include_system_schemas: bool,
    /// Capture views and materialized views (entities can map to views).
    pub include_views: bool,
    pub include_foreign_tables: bool,
    pub include_indexes: bool,
    pub include_comments: bool,
}

impl Default for IntrospectOptions {
    fn default() -> Self {
        Self {
            schemas: None,
            include_system_schemas: false,
            include_views: true,
            include_foreign_tables: false,
            include_indexes: true,
            include_comments: false,
        }
    }
}

impl IntrospectOptions {
    /// Options limited to the given schemas; an empty list means all schemas.
    pub fn for_schemas(schemas: Vec<String>) -> Self {
        Self {
            schemas: (!schemas.is_empty()).then_some(schemas),
            ..Self::default()
        }
    }

    pub(crate) fn is_system_schema(name: &str) -> bool {
        name.starts_with("pg_") || name == "information_schema"
    }

    pub(crate) fn wants_schema(&self, name: &str) -> bool {
        match &self.schemas {
            Some(list) => list.iter().any(|item| item == name),
            None => self.include_system_schemas || !Self::is_system_schema(name),
        }
    }
}
