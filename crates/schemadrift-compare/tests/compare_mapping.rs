use schemadrift_compare::{CompareOutcome, SchemaComparer};
use schemadrift_core::{
    CompareConfig, CompareState, CompareType, DatabaseSchema, ModelSchema, SqlServerDialect,
};
use serde_json::{Value, json};

fn property(name: &str, clr_type: &str, column_type: &str, table: &str) -> Value {
    json!({
        "name": name,
        "clr_type": clr_type,
        "columns": [{ "table": table, "column": name }],
        "column_type": column_type,
        "is_nullable": false
    })
}

fn column(name: &str, store_type: &str) -> Value {
    json!({
        "ordinal_position": 1,
        "name": name,
        "store_type": store_type,
        "is_nullable": false,
        "default": null,
        "identity": null,
        "generated": null
    })
}

fn table(name: &str, columns: Vec<Value>, pk: &str, pk_column: &str) -> Value {
    json!({
        "name": name,
        "kind": "table",
        "columns": columns,
        "constraints": [{ "kind": "primary_key", "name": pk, "columns": [pk_column] }],
        "indexes": [{
            "name": pk,
            "columns": [pk_column],
            "is_unique": true,
            "is_primary": true,
            "method": "btree",
            "definition": null
        }]
    })
}

fn snapshot(tables: Vec<Value>) -> Value {
    json!({
        "schema_version": "0.1",
        "engine": "postgres",
        "database": "shop",
        "default_schema": "public",
        "schemas": [{ "name": "public", "tables": tables }]
    })
}

fn run(model: Value, database: Value, config: CompareConfig) -> CompareOutcome {
    let model: ModelSchema = serde_json::from_value(model).expect("model");
    let database: DatabaseSchema = serde_json::from_value(database).expect("database");
    SchemaComparer::new(config)
        .compare(&model, &database)
        .expect("comparison runs")
}

fn book_model(extra_entities: Vec<Value>) -> Value {
    let mut entities = vec![json!({
        "name": "Book",
        "table_name": "Book",
        "properties": [
            property("BookId", "int", "integer", "Book"),
            property("Title", "string", "text", "Book")
        ],
        "primary_key": { "name": "PK_Book", "properties": ["BookId"] }
    })];
    entities.extend(extra_entities);
    json!({ "context_name": "ShopContext", "entities": entities })
}

fn book_table(extra_columns: Vec<Value>) -> Value {
    let mut columns = vec![column("BookId", "integer"), column("Title", "text")];
    columns.extend(extra_columns);
    table("Book", columns, "PK_Book", "BookId")
}

#[test]
fn table_per_type_foreign_key_is_not_checked() {
    let model = json!({
        "context_name": "ZooContext",
        "entities": [
            {
                "name": "Animal",
                "table_name": "Animal",
                "properties": [property("Id", "int", "integer", "Animal")],
                "primary_key": { "name": "PK_Animal", "properties": ["Id"] }
            },
            {
                "name": "Dog",
                "table_name": "Dog",
                "base_entity": "Animal",
                "properties": [property("Id", "int", "integer", "Dog")],
                "primary_key": { "name": "PK_Dog", "properties": ["Id"] },
                "foreign_keys": [{
                    "constraint_name": "FK_Dog_Animal_Id",
                    "properties": ["Id"],
                    "principal_entity": "Animal",
                    "principal_properties": ["Id"],
                    "delete_behavior": "Cascade"
                }]
            }
        ]
    });
    let database = snapshot(vec![
        table("Animal", vec![column("Id", "integer")], "PK_Animal", "Id"),
        table("Dog", vec![column("Id", "integer")], "PK_Dog", "Id"),
    ]);

    let outcome = run(model, database, CompareConfig::default());
    assert!(!outcome.has_errors, "{}", outcome.report());
    assert_eq!(outcome.report(), "");
}

#[test]
fn owned_type_columns_are_compared_under_the_owner() {
    let details = json!({
        "name": "BookDetails",
        "clr_type": "Details",
        "is_owned": true,
        "owner": "Book",
        "owner_navigation": "Details",
        "properties": [
            property("BookId", "int", "integer", "Book"),
            property("Isbn", "string", "text", "Book")
        ],
        "primary_key": { "properties": ["BookId"] },
        "foreign_keys": [{
            "constraint_name": "FK_BookDetails_Book_BookId",
            "properties": ["BookId"],
            "principal_entity": "Book",
            "principal_properties": ["BookId"],
            "delete_behavior": "Cascade"
        }]
    });
    let database = snapshot(vec![book_table(vec![column("Isbn", "varchar")])]);

    let outcome = run(book_model(vec![details]), database, CompareConfig::default());

    assert_eq!(
        outcome.report(),
        "DIFFERENT: Book->Property 'Isbn', column type. Expected = text, found = varchar"
    );
    let entities: Vec<&str> = outcome.logs[0]
        .sub_logs
        .iter()
        .map(|log| log.name.as_str())
        .collect();
    assert_eq!(entities, ["Book"]);
}

#[test]
fn json_document_marks_its_container_column_as_used() {
    let reviews = json!({
        "name": "Reviews",
        "is_owned": true,
        "owner": "Book",
        "owner_navigation": "Reviews",
        "is_mapped_to_json": true,
        "json_column": "Reviews"
    });
    let database = snapshot(vec![book_table(vec![column("Reviews", "jsonb")])]);

    let outcome = run(book_model(vec![reviews]), database, CompareConfig::default());

    assert!(!outcome.has_errors, "{}", outcome.report());
    let book = &outcome.logs[0].sub_logs[0];
    let navigation = book
        .sub_logs
        .iter()
        .find(|log| log.compare_type == CompareType::Property && log.name == "Reviews")
        .expect("navigation log");
    assert_eq!(navigation.state, CompareState::Ok);
}

#[test]
fn unmapped_entities_are_listed_as_not_checked() {
    let settings = json!({ "name": "Settings" });
    let database = snapshot(vec![book_table(Vec::new())]);

    let outcome = run(book_model(vec![settings]), database, CompareConfig::default());

    assert!(!outcome.has_errors);
    assert_eq!(
        outcome.report(),
        "NOT CHECKED: DbContext 'ShopContext', not mapped to database. Expected = Settings"
    );
    assert_eq!(outcome.logs.len(), 2);
    assert_eq!(outcome.logs[1].state, CompareState::NotChecked);
    assert!(
        outcome.logs[0]
            .sub_logs
            .iter()
            .all(|log| log.compare_type == CompareType::Entity)
    );
}

#[test]
fn defaults_compare_after_normalisation() {
    let mut model = book_model(Vec::new());
    let properties = model["entities"][0]["properties"]
        .as_array_mut()
        .expect("properties");
    let mut stock = property("Stock", "int", "integer", "Book");
    stock["default_value"] = json!({ "type": "integer", "value": 0 });
    stock["value_generated"] = json!("OnAdd");
    properties.push(stock);
    let mut added = property("AddedOn", "DateTime", "timestamp with time zone", "Book");
    added["default_sql"] = json!("(now())");
    added["value_generated"] = json!("OnAdd");
    properties.push(added);

    let mut stock_column = column("Stock", "integer");
    stock_column["default"] = json!("0");
    let mut added_column = column("AddedOn", "timestamp with time zone");
    added_column["default"] = json!("now()");
    let database = snapshot(vec![book_table(vec![stock_column, added_column])]);

    let outcome = run(model, database, CompareConfig::default());
    assert!(!outcome.has_errors, "{}", outcome.report());
}

#[test]
fn value_generation_mismatch_is_reported() {
    let mut model = book_model(Vec::new());
    model["entities"][0]["properties"][0]["value_generated"] = json!("OnAdd");
    let database = snapshot(vec![book_table(Vec::new())]);

    let outcome = run(model, database, CompareConfig::default());

    assert_eq!(
        outcome.report(),
        "DIFFERENT: Book->Property 'BookId', value generated. Expected = OnAdd, found = Never"
    );
}

#[test]
fn primary_key_membership_is_checked_both_ways() {
    let model = book_model(Vec::new());
    let mut database = snapshot(vec![book_table(Vec::new())]);
    database["schemas"][0]["tables"][0]["constraints"][0]["columns"] = json!(["Title"]);

    let outcome = run(model, database, CompareConfig::default());

    assert_eq!(
        outcome.report(),
        "NOT IN DATABASE: Book->PrimaryKey 'PK_Book', column name. Expected = BookId\n\
         EXTRA IN DATABASE: Book->PrimaryKey 'PK_Book', column name. Found = Title"
    );
}

#[test]
fn unused_database_objects_follow_a_clean_first_pass() {
    let audit = table("Audit", vec![column("AuditId", "integer")], "PK_Audit", "AuditId");
    let mut book = book_table(vec![column("Notes", "text")]);
    book["indexes"].as_array_mut().expect("indexes").push(json!({
        "name": "IX_Book_Title",
        "columns": ["Title"],
        "is_unique": false,
        "is_primary": false,
        "method": "btree",
        "definition": null
    }));
    let database = snapshot(vec![book, audit]);

    let outcome = run(
        book_model(Vec::new()),
        database.clone(),
        CompareConfig {
            tables_to_ignore: Some(String::new()),
            ..CompareConfig::default()
        },
    );
    assert!(outcome.has_errors);
    assert_eq!(
        outcome.report(),
        "EXTRA IN DATABASE: Column 'Book', column name. Found = Notes\n\
         EXTRA IN DATABASE: Index 'Book', index constraint name. Found = IX_Book_Title\n\
         EXTRA IN DATABASE: Table 'Audit', table name. Found = Audit"
    );

    let without_list = run(book_model(Vec::new()), database.clone(), CompareConfig::default());
    assert_eq!(
        without_list.report(),
        "EXTRA IN DATABASE: Column 'Book', column name. Found = Notes\n\
         EXTRA IN DATABASE: Index 'Book', index constraint name. Found = IX_Book_Title"
    );

    let skipped = run(
        book_model(Vec::new()),
        database,
        CompareConfig {
            check_unused_database_objects: false,
            ..CompareConfig::default()
        },
    );
    assert!(!skipped.has_errors);
    assert_eq!(skipped.report(), "");
}

#[test]
fn explicit_dialect_overrides_the_snapshot_engine() {
    let mut model = book_model(Vec::new());
    let mut flag = property("IsActive", "bool", "bit", "Book");
    flag["default_value"] = json!({ "type": "bool", "value": true });
    flag["value_generated"] = json!("OnAdd");
    model["entities"][0]["properties"]
        .as_array_mut()
        .expect("properties")
        .push(flag);

    let mut flag_column = column("IsActive", "bit");
    flag_column["default"] = json!("CAST(1 AS bit)");
    let database = snapshot(vec![book_table(vec![flag_column])]);

    let model: ModelSchema = serde_json::from_value(model).expect("model");
    let database: DatabaseSchema = serde_json::from_value(database).expect("database");
    let outcome = SchemaComparer::new(CompareConfig::default())
        .with_dialect(Box::new(SqlServerDialect))
        .compare(&model, &database)
        .expect("comparison runs");
    assert!(!outcome.has_errors, "{}", outcome.report());
}

fn view_property(name: &str, clr_type: &str, column_type: &str, view: &str) -> Value {
    let mut value = property(name, clr_type, column_type, view);
    value["columns"][0]["is_view"] = json!(true);
    value
}

fn add_properties(model: &mut Value, extra: Vec<Value>) {
    model["entities"][0]["properties"]
        .as_array_mut()
        .expect("properties")
        .extend(extra);
}

#[test]
fn temporal_period_columns_are_skipped_but_count_as_used() {
    let mut model = book_model(Vec::new());
    let mut extra = Vec::new();
    for name in ["PeriodStart", "PeriodEnd"] {
        let mut period = property(name, "DateTime", "datetime2", "Book");
        period["is_shadow"] = json!(true);
        extra.push(period);
    }
    add_properties(&mut model, extra);

    let mut book = book_table(vec![
        column("PeriodStart", "timestamp without time zone"),
        column("PeriodEnd", "timestamp without time zone"),
    ]);
    book["temporal_period_columns"] = json!(["PeriodStart", "PeriodEnd"]);

    let outcome = run(model, snapshot(vec![book]), CompareConfig::default());

    assert!(!outcome.has_errors, "{}", outcome.report());
    assert_eq!(outcome.report(), "");
    let book = &outcome.logs[0].sub_logs[0];
    assert!(book.sub_logs.iter().all(|log| !log.name.starts_with("Period")));
}

#[test]
fn json_document_of_a_nested_owned_type_is_found_through_its_owner() {
    let details = json!({
        "name": "Details",
        "is_owned": true,
        "owner": "Book",
        "owner_navigation": "Details",
        "properties": [property("Isbn", "string", "text", "Book")]
    });
    let tags = json!({
        "name": "Tags",
        "is_owned": true,
        "owner": "Details",
        "owner_navigation": "Tags",
        "is_mapped_to_json": true,
        "json_column": "Details_Tags"
    });
    let database = snapshot(vec![book_table(vec![
        column("Isbn", "text"),
        column("Details_Tags", "jsonb"),
    ])]);

    let outcome = run(book_model(vec![details, tags]), database, CompareConfig::default());

    assert!(!outcome.has_errors, "{}", outcome.report());
    let book = &outcome.logs[0].sub_logs[0];
    let navigation = book
        .sub_logs
        .iter()
        .find(|log| log.compare_type == CompareType::Property && log.name == "Tags")
        .expect("navigation log");
    assert_eq!(navigation.state, CompareState::Ok);
}

#[test]
fn unnamed_database_foreign_key_leaves_the_entity_unchecked() {
    let model = json!({
        "context_name": "ShopContext",
        "entities": [
            {
                "name": "Author",
                "table_name": "Author",
                "properties": [property("AuthorId", "int", "integer", "Author")],
                "primary_key": { "name": "PK_Author", "properties": ["AuthorId"] }
            },
            {
                "name": "Book",
                "table_name": "Book",
                "properties": [
                    property("BookId", "int", "integer", "Book"),
                    property("AuthorId", "int", "integer", "Book")
                ],
                "primary_key": { "name": "PK_Book", "properties": ["BookId"] },
                "foreign_keys": [{
                    "constraint_name": "FK_Book_Author_AuthorId",
                    "properties": ["AuthorId"],
                    "principal_entity": "Author",
                    "principal_properties": ["AuthorId"],
                    "delete_behavior": "Restrict"
                }]
            }
        ]
    });
    let mut book = table(
        "Book",
        vec![column("BookId", "integer"), column("AuthorId", "integer")],
        "PK_Book",
        "BookId",
    );
    book["constraints"].as_array_mut().expect("constraints").push(json!({
        "kind": "foreign_key",
        "name": null,
        "columns": ["AuthorId"],
        "referenced_schema": "public",
        "referenced_table": "Author",
        "referenced_columns": ["AuthorId"],
        "on_update": "no_action",
        "on_delete": "cascade",
        "match_type": "simple"
    }));
    let database = snapshot(vec![
        table("Author", vec![column("AuthorId", "integer")], "PK_Author", "AuthorId"),
        book,
    ]);

    let outcome = run(model, database, CompareConfig::default());

    assert!(!outcome.has_errors, "{}", outcome.report());
    assert_eq!(
        outcome.report(),
        "NOT CHECKED: Book->ForeignKey 'Book', constraint name"
    );
}

#[test]
fn non_integer_generated_key_may_lack_a_database_default() {
    let mut id = property("Id", "Guid", "uuid", "Token");
    id["value_generated"] = json!("OnAdd");
    let mut code = property("Code", "Guid", "uuid", "Token");
    code["value_generated"] = json!("OnAdd");
    let model = json!({
        "context_name": "ShopContext",
        "entities": [{
            "name": "Token",
            "table_name": "Token",
            "properties": [id, code],
            "primary_key": { "name": "PK_Token", "properties": ["Id"] }
        }]
    });
    let database = snapshot(vec![table(
        "Token",
        vec![column("Id", "uuid"), column("Code", "uuid")],
        "PK_Token",
        "Id",
    )]);

    let outcome = run(model, database, CompareConfig::default());

    assert_eq!(
        outcome.report(),
        "DIFFERENT: Token->Property 'Code', value generated. Expected = OnAdd, found = Never"
    );
}

#[test]
fn computed_columns_compare_sql_and_persistence() {
    let slug_model = |is_stored: bool| {
        let mut model = book_model(Vec::new());
        let mut slug = property("Slug", "string", "text", "Book");
        slug["computed_sql"] = json!("(lower(\"Title\"))");
        slug["is_stored"] = json!(is_stored);
        slug["value_generated"] = json!("OnAddOrUpdate");
        add_properties(&mut model, vec![slug]);
        model
    };
    let mut slug_column = column("Slug", "text");
    slug_column["generated"] = json!({ "kind": "stored", "expression": "lower(\"Title\")" });
    let database = snapshot(vec![book_table(vec![slug_column])]);

    let virtual_model = run(slug_model(false), database.clone(), CompareConfig::default());
    assert_eq!(
        virtual_model.report(),
        "DIFFERENT: Book->Property 'Slug', persistent computed column. Expected = False, found = True"
    );

    let stored_model = run(slug_model(true), database, CompareConfig::default());
    assert!(!stored_model.has_errors, "{}", stored_model.report());
}

#[test]
fn views_skip_primary_key_and_value_generation_checks() {
    let mut book_id = view_property("BookId", "int", "integer", "BookTitles");
    book_id["value_generated"] = json!("OnAdd");
    let model = json!({
        "context_name": "ShopContext",
        "entities": [{
            "name": "BookTitle",
            "table_name": "BookTitles",
            "is_view": true,
            "properties": [book_id, view_property("Title", "string", "text", "BookTitles")]
        }]
    });
    let database = snapshot(vec![json!({
        "name": "BookTitles",
        "kind": "view",
        "columns": [column("BookId", "integer"), column("Title", "text")],
        "constraints": [],
        "indexes": []
    })]);

    let outcome = run(model, database, CompareConfig::default());

    assert!(!outcome.has_errors, "{}", outcome.report());
    assert_eq!(outcome.report(), "");
}

#[test]
fn unique_constraint_is_matched_as_an_index() {
    let title_index = |is_unique: bool| {
        let mut model = book_model(Vec::new());
        model["entities"][0]["indexes"] = json!([{
            "name": "AK_Book_Title",
            "properties": ["Title"],
            "is_unique": is_unique
        }]);
        model
    };
    let mut book = book_table(Vec::new());
    book["constraints"].as_array_mut().expect("constraints").push(json!({
        "kind": "unique",
        "name": "AK_Book_Title",
        "columns": ["Title"]
    }));
    let database = snapshot(vec![book]);

    let unique = run(title_index(true), database.clone(), CompareConfig::default());
    assert!(!unique.has_errors, "{}", unique.report());
    assert_eq!(unique.report(), "");

    let plain = run(title_index(false), database, CompareConfig::default());
    assert_eq!(
        plain.report(),
        "DIFFERENT: Book->Index 'Title', unique. Expected = False, found = True"
    );
}
