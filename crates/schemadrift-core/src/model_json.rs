use jsonschema::JSONSchema;
use schemars::schema_for;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::ModelSchema;

/// JSON Schema describing the model snapshot file format.
pub fn model_json_schema() -> Result<Value> {
    serde_json::to_value(schema_for!(ModelSchema)).map_err(|err| Error::Other(err.to_string()))
}

/// Parse a model snapshot, validating it against [`model_json_schema`] first
/// so structural mistakes are reported with their JSON pointer.
pub fn parse_model_json(contents: &str) -> Result<ModelSchema> {
    let instance: Value = serde_json::from_str(contents)
        .map_err(|err| Error::InvalidModel(format!("model is not valid json: {err}")))?;

    let schema = model_json_schema()?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| Error::Other(err.to_string()))?;

    if let Err(errors) = compiled.validate(&instance) {
        let issues: Vec<String> = errors
            .map(|error| {
                let path = error.instance_path.to_string();
                let path = if path.is_empty() { "/".to_string() } else { path };
                format!("{path}: {error}")
            })
            .collect();
        return Err(Error::InvalidModel(issues.join("; ")));
    }

    serde_json::from_value(instance).map_err(|err| Error::InvalidModel(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_model() {
        let model = parse_model_json(
            r#"{
              "context_name": "BookContext",
              "entities": [
                {
                  "name": "Book",
                  "table_name": "Book",
                  "properties": [
                    {
                      "name": "BookId",
                      "clr_type": "int",
                      "columns": [{ "table": "Book", "column": "BookId" }],
                      "column_type": "integer",
                      "is_nullable": false,
                      "value_generated": "OnAdd"
                    }
                  ],
                  "primary_key": { "name": "PK_Book", "properties": ["BookId"] }
                }
              ]
            }"#,
        )
        .expect("parse model");
        assert_eq!(model.context_name, "BookContext");
        assert_eq!(model.entities[0].properties[0].columns[0].column, "BookId");
    }

    #[test]
    fn reports_structural_errors_with_pointer() {
        let err = parse_model_json(r#"{ "context_name": "Ctx", "entities": [ { "table_name": "Book" } ] }"#)
            .expect_err("missing entity name");
        let message = err.to_string();
        assert!(message.starts_with("invalid model: /entities/0"), "{message}");
    }
}
