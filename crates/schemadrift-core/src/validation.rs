use std::collections::{BTreeMap, BTreeSet};

use crate::constraints::Constraint;
use crate::error::{Error, Result};
use crate::model::{ModelSchema, SchemaEntity};
use crate::schema::DatabaseSchema;

/// Validate internal consistency of a database snapshot.
///
/// This checks:
/// - duplicate schemas/tables/columns
/// - primary key, unique and index columns exist
/// - foreign key columns exist (referenced tables may live outside the snapshot)
pub fn validate_schema(schema: &DatabaseSchema) -> Result<()> {
    let mut seen_schemas = BTreeSet::new();

    for db_schema in &schema.schemas {
        if !seen_schemas.insert(db_schema.name.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "duplicate schema name: {}",
                db_schema.name
            )));
        }

        let mut tables = BTreeSet::new();
        for table in &db_schema.tables {
            if !tables.insert(table.name.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate table name: {}.{}",
                    db_schema.name, table.name
                )));
            }

            let mut columns = BTreeSet::new();
            for column in &table.columns {
                if !columns.insert(column.name.as_str()) {
                    return Err(Error::InvalidSchema(format!(
                        "duplicate column name: {}.{}.{}",
                        db_schema.name, table.name, column.name
                    )));
                }
            }

            let missing = |kind: &str, column: &str| {
                Error::InvalidSchema(format!(
                    "{kind} column not found: {}.{}.{}",
                    db_schema.name, table.name, column
                ))
            };

            for constraint in &table.constraints {
                let (kind, referenced) = match constraint {
                    Constraint::PrimaryKey(pk) => ("primary key", &pk.columns),
                    Constraint::ForeignKey(fk) => ("foreign key", &fk.columns),
                    Constraint::Unique(unique) => ("unique", &unique.columns),
                    Constraint::Check(_) => continue,
                };
                if let Some(column) = referenced.iter().find(|c| !columns.contains(c.as_str())) {
                    return Err(missing(kind, column));
                }
            }

            for index in &table.indexes {
                if let Some(column) = index.columns.iter().find(|c| !columns.contains(c.as_str())) {
                    return Err(missing("index", column));
                }
            }
        }
    }

    Ok(())
}

/// Validate internal consistency of a model snapshot.
///
/// This checks:
/// - duplicate entity names and duplicate properties within an entity
/// - key, index and foreign key properties exist on the entity
/// - owners, base types and relationship principals exist
pub fn validate_model(model: &ModelSchema) -> Result<()> {
    let mut entities: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for entity in &model.entities {
        let mut properties = BTreeSet::new();
        for property in &entity.properties {
            if !properties.insert(property.name.as_str()) {
                return Err(Error::InvalidModel(format!(
                    "duplicate property name: {}.{}",
                    entity.name, property.name
                )));
            }
        }
        if entities.insert(entity.name.as_str(), properties).is_some() {
            return Err(Error::InvalidModel(format!(
                "duplicate entity name: {}",
                entity.name
            )));
        }
    }

    let entity_exists = |name: &str, role: &str, entity: &str| {
        if entities.contains_key(name) {
            Ok(())
        } else {
            Err(Error::InvalidModel(format!(
                "{role} entity not found: {name} (referenced by {entity})"
            )))
        }
    };

    for entity in &model.entities {
        let properties = entities.get(entity.name.as_str()).cloned().unwrap_or_default();
        let check_properties = |kind: &str, names: &[String]| -> Result<()> {
            match names.iter().find(|name| !properties.contains(name.as_str())) {
                Some(name) => Err(Error::InvalidModel(format!(
                    "{kind} property not found: {}.{}",
                    entity.name, name
                ))),
                None => Ok(()),
            }
        };

        if let Some(owner) = &entity.owner {
            entity_exists(owner, "owner", &entity.name)?;
        } else if entity.is_owned {
            return Err(Error::InvalidModel(format!(
                "owned entity has no owner: {}",
                entity.name
            )));
        }
        if let Some(base) = &entity.base_entity {
            entity_exists(base, "base", &entity.name)?;
        }
        if let Some(key) = &entity.primary_key {
            check_properties("primary key", &key.properties)?;
        }
        for index in &entity.indexes {
            check_properties("index", &index.properties)?;
        }
        for fk in &entity.foreign_keys {
            check_properties("foreign key", &fk.properties)?;
            entity_exists(&fk.principal_entity, "principal", &entity.name)?;
            if fk.properties.len() != fk.principal_properties.len() {
                return Err(Error::InvalidModel(format!(
                    "foreign key {} on {} has {} properties but {} principal properties",
                    fk.constraint_name.as_deref().unwrap_or("<unnamed>"),
                    entity.name,
                    fk.properties.len(),
                    fk.principal_properties.len()
                )));
            }
        }
    }

    for entity in &model.entities {
        check_chain(model, entity, "base", |entity| entity.base_entity.as_deref())?;
        check_chain(model, entity, "owner", |entity| entity.owner.as_deref())?;
    }

    Ok(())
}

/// Reject cyclic base-type or ownership chains.
fn check_chain<'m>(
    model: &'m ModelSchema,
    entity: &'m SchemaEntity,
    role: &str,
    next: impl Fn(&'m SchemaEntity) -> Option<&'m str>,
) -> Result<()> {
    let mut current = next(entity);
    let mut steps = 0;
    while let Some(name) = current {
        steps += 1;
        if name == entity.name || steps > model.entities.len() {
            return Err(Error::InvalidModel(format!(
                "{role} chain of {} is cyclic",
                entity.name
            )));
        }
        current = model.entity(name).and_then(&next);
    }
    Ok(())
}
