//! Schema implied by application model metadata.
//!
//! These types are produced by an exporter that reflects over the
//! application's object-relational model. The comparer only needs the tree
//! shape, so nothing here depends on how the metadata was read.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::naming::{Collation, schema_table};
use crate::types::{DefaultLiteral, DeleteBehavior, ValueGenerated};

/// Model-side snapshot for one application context.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModelSchema {
    /// Name of the context the entities belong to; used as the root log subject.
    pub context_name: String,
    pub entities: Vec<SchemaEntity>,
}

impl ModelSchema {
    pub fn entity(&self, name: &str) -> Option<&SchemaEntity> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    /// Owned entities stored in `owner`'s table, directly or through nested
    /// owned types. JSON-mapped and separately-tabled owned types are left out.
    pub fn owned_in_table_of<'a>(&'a self, owner: &SchemaEntity) -> Vec<&'a SchemaEntity> {
        let mut found = Vec::new();
        let mut pending = vec![owner.name.as_str()];
        while let Some(current) = pending.pop() {
            for entity in &self.entities {
                if entity.is_owned
                    && !entity.is_mapped_to_json
                    && entity.owner.as_deref() == Some(current)
                    && entity.is_stored_with(owner)
                {
                    pending.push(entity.name.as_str());
                    found.push(entity);
                }
            }
        }
        found
    }

    /// JSON-mapped owned entities whose document lives in `owner`'s table.
    pub fn json_documents_of<'a>(&'a self, owner: &str) -> Vec<&'a SchemaEntity> {
        self.entities
            .iter()
            .filter(|entity| entity.is_mapped_to_json && entity.owner.as_deref() == Some(owner))
            .collect()
    }

    /// Primary key of `entity`, inherited from its base types when needed.
    pub fn primary_key_of<'a>(&'a self, entity: &'a SchemaEntity) -> Option<&'a SchemaKey> {
        let mut current = Some(entity);
        while let Some(candidate) = current {
            if candidate.primary_key.is_some() {
                return candidate.primary_key.as_ref();
            }
            current = candidate
                .base_entity
                .as_deref()
                .and_then(|base| self.entity(base));
        }
        None
    }

    /// Property `name` of `entity` or of one of its base types.
    pub fn find_property<'a>(
        &'a self,
        entity: &'a SchemaEntity,
        name: &str,
    ) -> Option<&'a SchemaProperty> {
        let mut current = Some(entity);
        while let Some(candidate) = current {
            if let Some(property) = candidate.property(name) {
                return Some(property);
            }
            current = candidate
                .base_entity
                .as_deref()
                .and_then(|base| self.entity(base));
        }
        None
    }
}

/// One entity type of the model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemaEntity {
    /// Unique entity name within the model.
    pub name: String,
    /// Short CLR type name used in reports; defaults to `name`.
    #[serde(default)]
    pub clr_type: Option<String>,
    /// Table or view the entity maps to; `None` when not mapped.
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub is_view: bool,
    #[serde(default)]
    pub is_owned: bool,
    /// Owning entity for owned types.
    #[serde(default)]
    pub owner: Option<String>,
    /// Navigation on the owner that holds this owned type.
    #[serde(default)]
    pub owner_navigation: Option<String>,
    #[serde(default)]
    pub is_mapped_to_json: bool,
    /// Owner column holding the JSON document of a JSON-mapped owned type.
    #[serde(default)]
    pub json_column: Option<String>,
    #[serde(default)]
    pub base_entity: Option<String>,
    #[serde(default)]
    pub properties: Vec<SchemaProperty>,
    #[serde(default)]
    pub primary_key: Option<SchemaKey>,
    #[serde(default)]
    pub foreign_keys: Vec<SchemaForeignKey>,
    #[serde(default)]
    pub indexes: Vec<SchemaIndex>,
    #[serde(default)]
    pub check_constraints: Vec<SchemaCheckConstraint>,
}

impl SchemaEntity {
    pub fn clr_name(&self) -> &str {
        self.clr_type.as_deref().unwrap_or(&self.name)
    }

    /// `[schema.]table` this entity maps to, if any.
    pub fn store_name(&self, default_schema: &str) -> Option<String> {
        self.table_name
            .as_deref()
            .map(|table| schema_table(self.schema.as_deref(), table, default_schema))
    }

    /// True when this entity shares `owner`'s table: either no table of its
    /// own is set, or it names the same table.
    pub fn is_stored_with(&self, owner: &SchemaEntity) -> bool {
        match &self.table_name {
            None => true,
            Some(table) => {
                Some(table) == owner.table_name.as_ref() && self.schema == owner.schema
            }
        }
    }

    pub fn property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn is_primary_key(&self, property: &str) -> bool {
        self.primary_key
            .as_ref()
            .is_some_and(|key| key.properties.iter().any(|name| name == property))
    }

    /// Entity that declares `property`, falling back to this entity.
    pub fn declaring_entity_of<'a>(&'a self, property: &'a SchemaProperty) -> &'a str {
        property.declaring_entity.as_deref().unwrap_or(&self.name)
    }
}

/// Column-level descriptor of a model property.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemaProperty {
    pub name: String,
    /// CLR type name, e.g. `int`, `Guid`, `string`.
    pub clr_type: String,
    /// Entity that declares the property when inherited from a base type.
    #[serde(default)]
    pub declaring_entity: Option<String>,
    /// Column this property maps to in each store object.
    #[serde(default)]
    pub columns: Vec<ColumnMapping>,
    pub column_type: String,
    pub is_nullable: bool,
    #[serde(default)]
    pub computed_sql: Option<String>,
    #[serde(default)]
    pub is_stored: Option<bool>,
    #[serde(default)]
    pub default_value: Option<DefaultLiteral>,
    #[serde(default)]
    pub default_sql: Option<String>,
    #[serde(default)]
    pub value_generated: ValueGenerated,
    #[serde(default)]
    pub is_shadow: bool,
}

impl SchemaProperty {
    /// Column name of this property in the given store object, or `None`
    /// when the property is not mapped there (TPH siblings, split tables,
    /// owned types stored elsewhere).
    pub fn resolve(
        &self,
        table_key: &str,
        is_view: bool,
        default_schema: &str,
        collation: Collation,
    ) -> Option<&str> {
        self.columns
            .iter()
            .find(|mapping| {
                mapping.is_view == is_view
                    && collation.equals(&mapping.store_name(default_schema), table_key)
            })
            .map(|mapping| mapping.column.as_str())
    }
}

/// Mapping of a property to a column of one table or view.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnMapping {
    #[serde(default)]
    pub schema: Option<String>,
    pub table: String,
    #[serde(default)]
    pub is_view: bool,
    pub column: String,
}

impl ColumnMapping {
    pub fn store_name(&self, default_schema: &str) -> String {
        schema_table(self.schema.as_deref(), &self.table, default_schema)
    }
}

/// Primary or alternate key.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemaKey {
    /// Constraint name; `None` for keyless mappings.
    #[serde(default)]
    pub name: Option<String>,
    pub properties: Vec<String>,
}

/// Foreign key declared by a relationship.
///
/// Update behaviour is not modelled: relationships always imply
/// `NO ACTION` on update.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemaForeignKey {
    /// `None` when the dependent is not mapped to a table (some views).
    #[serde(default)]
    pub constraint_name: Option<String>,
    pub properties: Vec<String>,
    pub principal_entity: String,
    pub principal_properties: Vec<String>,
    #[serde(default)]
    pub delete_behavior: DeleteBehavior,
}

/// Index declared on an entity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemaIndex {
    /// Database name of the index.
    #[serde(default)]
    pub name: Option<String>,
    pub properties: Vec<String>,
    #[serde(default)]
    pub is_unique: bool,
}

/// Check constraint declared on the entity's table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemaCheckConstraint {
    pub name: String,
    /// Predicate as written in the model, without the `CHECK` keyword.
    pub sql: String,
}
