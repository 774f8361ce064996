use schemadrift_core::{DeleteBehavior, ValueGenerated, model_json_schema, parse_model_json};

#[test]
fn model_schema_describes_entities() {
    let schema = model_json_schema().expect("generate schema");
    let required = schema["required"].as_array().expect("required list");
    assert!(required.iter().any(|value| value == "context_name"));
    assert!(required.iter().any(|value| value == "entities"));
    assert!(schema["definitions"]["SchemaEntity"].is_object());
    assert!(schema["definitions"]["SchemaProperty"].is_object());
}

#[test]
fn parses_relationships_and_defaults() {
    let model = parse_model_json(
        r#"{
          "context_name": "BookContext",
          "entities": [
            {
              "name": "Author",
              "table_name": "Authors",
              "properties": [
                {
                  "name": "AuthorId",
                  "clr_type": "int",
                  "columns": [{ "table": "Authors", "column": "AuthorId" }],
                  "column_type": "integer",
                  "is_nullable": false,
                  "value_generated": "OnAdd"
                }
              ],
              "primary_key": { "name": "PK_Authors", "properties": ["AuthorId"] }
            },
            {
              "name": "Book",
              "table_name": "Books",
              "properties": [
                {
                  "name": "BookId",
                  "clr_type": "int",
                  "columns": [{ "table": "Books", "column": "BookId" }],
                  "column_type": "integer",
                  "is_nullable": false
                },
                {
                  "name": "AuthorId",
                  "clr_type": "int",
                  "columns": [{ "table": "Books", "column": "AuthorId" }],
                  "column_type": "integer",
                  "is_nullable": false,
                  "default_value": { "type": "integer", "value": 1 }
                }
              ],
              "primary_key": { "name": "PK_Books", "properties": ["BookId"] },
              "foreign_keys": [
                {
                  "constraint_name": "FK_Books_Authors_AuthorId",
                  "properties": ["AuthorId"],
                  "principal_entity": "Author",
                  "principal_properties": ["AuthorId"],
                  "delete_behavior": "Cascade"
                }
              ]
            }
          ]
        }"#,
    )
    .expect("parse model");

    let book = model.entity("Book").expect("book entity");
    assert_eq!(book.foreign_keys[0].delete_behavior, DeleteBehavior::Cascade);
    assert_eq!(book.properties[0].value_generated, ValueGenerated::Never);
    assert!(book.check_constraints.is_empty());
    assert!(schemadrift_core::validate_model(&model).is_ok());
}

#[test]
fn rejects_wrong_property_types() {
    let err = parse_model_json(
        r#"{
          "context_name": "Ctx",
          "entities": [
            { "name": "Book", "properties": [ { "name": "Id", "clr_type": "int", "column_type": "integer", "is_nullable": "no" } ] }
          ]
        }"#,
    )
    .expect_err("nullability must be a boolean");
    assert!(
        err.to_string().contains("/entities/0/properties/0/is_nullable"),
        "{err}"
    );
}
