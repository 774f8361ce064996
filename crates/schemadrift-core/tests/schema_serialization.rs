use schemadrift_core::{DatabaseSchema, Schema};

#[test]
fn serializes_schema_deterministically() {
    let schema = DatabaseSchema {
        schema_version: "0.1".to_string(),
        engine: "postgres".to_string(),
        database: Some("db".to_string()),
        default_schema: Some("public".to_string()),
        schemas: vec![Schema {
            name: "public".to_string(),
            tables: Vec::new(),
        }],
        fingerprint: None,
    };

    let json = serde_json::to_string_pretty(&schema).expect("serialize schema");
    let expected = r#"{
  "schema_version": "0.1",
  "engine": "postgres",
  "database": "db",
  "default_schema": "public",
  "schemas": [
    {
      "name": "public",
      "tables": []
    }
  ],
  "fingerprint": null
}"#;
    assert_eq!(json, expected);
}

#[test]
fn snapshots_without_default_schema_still_load() {
    let schema: DatabaseSchema = serde_json::from_str(
        r#"{"schema_version":"0.1","engine":"postgres","database":null,"schemas":[]}"#,
    )
    .expect("parse schema");
    assert!(schema.default_schema.is_none());
    assert!(schema.fingerprint.is_none());
}
