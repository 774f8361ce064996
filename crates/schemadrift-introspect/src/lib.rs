//! Database introspection adapters.

pub mod adapter;
pub mod constraints;
pub mod options;
pub mod postgres;

pub use adapter::Adapter;
pub use constraints::{CheckConstraintRecord, ColumnTypeInfo, ConstraintReader, ForeignKeyRecord};
pub use options::IntrospectOptions;
pub use postgres::{
    PostgresAdapter, PostgresConstraintReader, introspect_postgres,
    introspect_postgres_with_options,
};

pub use schemadrift_core::DatabaseSchema;
