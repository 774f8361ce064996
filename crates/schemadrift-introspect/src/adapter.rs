use async_trait::async_trait;

use schemadrift_core::{DatabaseSchema, Result};

use crate::options::IntrospectOptions;

/// Trait implemented by database adapters that can capture a schema snapshot.
#[async_trait]
pub trait Adapter {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Introspect the database and return a snapshot ready for comparison.
    async fn introspect(&self, opts: &IntrospectOptions) -> Result<DatabaseSchema>;
}
