use stateql_core::{Entity, Field, SchemaModel};

fn user_model() -> SchemaModel {
    let mut user = Entity::new("User");
    user.fields.push(Field::scalar("id", "text"));
    user.fields.push(Field::many(
        "friends",
        Some("User".to_string()),
        "befriendedBy",
    ));
    SchemaModel {
        entities: vec![user],
    }
}

#[test]
fn serializes_model_deterministically() {
    let json = serde_json::to_string_pretty(&user_model()).expect("serialize model");
    let expected = r#"{
  "entities": [
    {
      "name": "User",
      "fields": [
        {
          "name": "id",
          "kind": "scalar",
          "type_name": "text"
        },
        {
          "name": "friends",
          "kind": "many_relation",
          "target": "User",
          "through": "befriendedBy"
        }
      ]
    }
  ]
}"#;
    assert_eq!(json, expected);
}

#[test]
fn deserializes_flattened_field_kinds() {
    let json = r#"{"entities":[{"name":"User","fields":[
        {"name":"id","kind":"scalar","type_name":"text"},
        {"name":"friends","kind":"many_relation","target":"User","through":"befriendedBy"}
    ]}]}"#;
    let model: SchemaModel = serde_json::from_str(json).expect("parse model json");

    assert_eq!(model, user_model());
}
