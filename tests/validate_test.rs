//! Integration tests for document validation.

use std::sync::Arc;
use std::thread;

use fancy_regex::Regex;
use jsoncheck::{
    compile_schema, validate, AdditionalProperties, ArraySchema, ConfigError, ErrorMessage,
    JsonSchema, ObjectSchema, SimpleType, SimpleTypeSchema, ValidateError,
};
use serde_json::{json, Value};

fn locations(errors: &[ErrorMessage]) -> Vec<&str> {
    errors.iter().map(|e| e.location.as_str()).collect()
}

// === Leaf schemas ===

mod leaf {
    use super::*;

    fn samples() -> Vec<Value> {
        vec![
            json!(null),
            json!(false),
            json!("text"),
            json!(3),
            json!(-3),
            json!(3.25),
            json!([1]),
            json!({"a": 1}),
        ]
    }

    #[test]
    fn matching_kind_without_constraints_is_valid() {
        for ty in SimpleType::ALL {
            let schema = SimpleTypeSchema::new(ty);
            for value in samples().iter().filter(|v| ty.is_acceptable_type(v)) {
                assert!(schema.validate(value).is_empty(), "{ty} should accept {value}");
            }
        }
    }

    #[test]
    fn mismatched_kind_is_exactly_one_root_error() {
        for ty in SimpleType::ALL {
            let schema = SimpleTypeSchema::new(ty);
            for value in samples().iter().filter(|v| !ty.is_acceptable_type(v)) {
                let errors = schema.validate(value);
                assert_eq!(errors.len(), 1, "{ty} against {value}");
                assert_eq!(errors[0].location, "");
                assert_eq!(
                    errors[0].message,
                    format!("Invalid type: must be a {}", ty.description())
                );
            }
        }
    }

    #[test]
    fn set_pattern_fails_for_every_non_string_type() {
        for ty in SimpleType::ALL.into_iter().filter(|t| *t != SimpleType::String) {
            let mut schema = SimpleTypeSchema::new(ty);
            assert!(matches!(
                schema.set_pattern(Regex::new("a").unwrap()),
                Err(ConfigError::PatternRequiresString { .. })
            ));
            assert!(schema.pattern().is_none());
        }
    }

    #[test]
    fn unknown_formats_never_fail() {
        for ty in SimpleType::ALL {
            let mut schema = SimpleTypeSchema::new(ty);
            schema.set_format("color").unwrap();
            for value in samples().iter().filter(|v| ty.is_acceptable_type(v)) {
                assert!(schema.validate(value).is_empty());
            }
        }
    }

    #[test]
    fn assembly_order_does_not_matter() {
        let mut bounded_first = SimpleTypeSchema::new(SimpleType::Integer);
        bounded_first.set_minimum(1).unwrap();
        assert!(bounded_first.set_type(SimpleType::String).is_err());

        let mut string_first = SimpleTypeSchema::new(SimpleType::String);
        assert!(string_first.set_minimum(1).is_err());
    }

    #[test]
    fn enumeration_message_lists_members_in_declared_order() {
        let mut schema = SimpleTypeSchema::new(SimpleType::String);
        schema
            .set_enumeration(vec![json!("red"), json!("green"), json!("blue")])
            .unwrap();

        let errors = schema.validate(&json!("pink"));
        assert_eq!(errors.len(), 1);
        let message = &errors[0].message;
        assert!(message.contains("pink"));
        assert!(message.contains("one of"));
        let red = message.find("red").unwrap();
        let green = message.find("green").unwrap();
        let blue = message.find("blue").unwrap();
        assert!(red < green && green < blue);
    }
}

// === Containers ===

mod containers {
    use super::*;

    fn string_items(max_items: usize, min_items: usize) -> ArraySchema {
        let mut schema = ArraySchema::new();
        schema.set_items(SimpleTypeSchema::new(SimpleType::String));
        schema.set_max_items(max_items);
        schema.set_min_items(min_items);
        schema
    }

    #[test]
    fn max_items_cites_bound_and_size() {
        let errors = string_items(2, 0).validate(&json!(["a", "b", "c", "d"]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].location, "");
        assert!(errors[0].message.contains("size of 4"));
        assert!(errors[0].message.contains("maximum array size of 2"));
    }

    #[test]
    fn min_items_cites_bound_and_size() {
        let errors = string_items(0, 2).validate(&json!([]));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("size of 0"));
        assert!(errors[0].message.contains("minimum array size of 2"));
    }

    #[test]
    fn item_failure_at_index_two() {
        let errors = string_items(0, 0).validate(&json!(["a", "b", 3]));
        assert_eq!(locations(&errors), vec!["[2]"]);
    }

    #[test]
    fn every_invalid_item_contributes() {
        let errors = string_items(0, 0).validate(&json!([0, "a", true, "b", null]));
        assert_eq!(locations(&errors), vec!["[0]", "[2]", "[4]"]);
    }

    #[test]
    fn deep_paths_are_depth_first_left_to_right() {
        let mut tag = SimpleTypeSchema::new(SimpleType::String);
        tag.set_max_length(3).unwrap();
        let mut tags = ArraySchema::new();
        tags.set_items(tag);

        let mut item = ObjectSchema::new();
        item.set_property("id", SimpleTypeSchema::new(SimpleType::Integer));
        item.set_property("tags", tags);
        item.set_required(["id"]);
        item.set_additional_properties(AdditionalProperties::Deny);

        let mut items = ArraySchema::new();
        items.set_items(item);

        let mut root = ObjectSchema::new();
        root.set_property("items", items);

        let document = json!({
            "items": [
                { "id": 1, "tags": ["ok", "toolong"] },
                { "tags": ["fine", "x"], "colour": "red" },
                { "id": "2" }
            ]
        });

        let errors = JsonSchema::from(root).validate(&document);
        assert_eq!(
            locations(&errors),
            vec![
                ".items[0].tags[1]",
                ".items[1].id",
                ".items[1].tags[0]",
                ".items[1].colour",
                ".items[2].id",
            ]
        );
        assert_eq!(errors[1].message, "Missing required property: id");
        assert_eq!(errors[3].message, "Unexpected property: colour");
    }
}

// === Determinism and sharing ===

mod determinism {
    use super::*;

    fn schema() -> JsonSchema {
        compile_schema(&json!({
            "type": "array",
            "items": {
                "type": "object",
                "required": ["at"],
                "properties": {
                    "at": { "type": "string", "format": "date-time" },
                    "n": { "type": "integer", "minimum": 0, "exclusiveMinimum": true }
                }
            }
        }))
        .unwrap()
    }

    fn document() -> Value {
        json!([
            { "at": "2011-05-10T11:11:17Z", "n": 0 },
            { "n": 2 },
            { "at": "yesterday", "n": -1 }
        ])
    }

    #[test]
    fn validate_twice_gives_identical_results() {
        let schema = schema();
        let document = document();

        let first = schema.validate(&document);
        let second = schema.validate(&document);
        assert_eq!(first, second);
        assert_eq!(
            locations(&first),
            vec!["[0].n", "[1].at", "[2].at", "[2].n"]
        );
    }

    #[test]
    fn shared_schema_across_threads() {
        let schema = Arc::new(schema());
        let expected = schema.validate(&document());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let schema = Arc::clone(&schema);
                thread::spawn(move || schema.validate(&document()))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}

// === Top-level API ===

mod api {
    use super::*;

    #[test]
    fn validate_returns_all_errors() {
        let schema = json!({
            "type": "object",
            "properties": {
                "email": { "type": "string", "pattern": "@" },
                "age": { "type": "integer", "maximum": 150 }
            }
        });

        match validate(&schema, &json!({ "email": "nobody", "age": 200 })) {
            Err(ValidateError::Invalid { errors }) => {
                assert_eq!(locations(&errors), vec![".email", ".age"]);
                assert!(errors[0].message.contains("does not match"));
                assert!(errors[1].message.contains("150"));
                assert!(errors[1].message.contains("200"));
            }
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn untyped_formats_and_look_ahead_patterns() {
        let schema = json!({
            "properties": {
                "at": { "format": "date-time" },
                "home": { "format": "uri" },
                "login": { "pattern": "^(?!admin$)" }
            }
        });

        let ok = json!({ "at": "2011-05-10T11:11:17Z", "home": "/a%20b", "login": "ada" });
        assert!(validate(&schema, &ok).is_ok());

        let bad = json!({ "at": "noon", "home": "a b", "login": "admin" });
        match validate(&schema, &bad) {
            Err(ValidateError::Invalid { errors }) => {
                assert_eq!(locations(&errors), vec![".at", ".home", ".login"]);
            }
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn error_messages_serialize_for_reporting() {
        let error = ErrorMessage::new("[0].name", "Invalid type: must be a string");
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({ "location": "[0].name", "message": "Invalid type: must be a string" })
        );
    }
}

// === Agreement with a draft-4 validator ===

mod draft4_agreement {
    use super::*;

    fn assert_agrees(schema: Value, documents: &[Value]) {
        let ours = compile_schema(&schema).unwrap();
        let reference = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft4)
            .build(&schema)
            .unwrap();

        for document in documents {
            assert_eq!(
                ours.is_valid(document),
                reference.is_valid(document),
                "disagreement on {document} against {schema}"
            );
        }
    }

    #[test]
    fn leaf_keywords() {
        assert_agrees(
            json!({ "type": "string", "minLength": 2, "maxLength": 4, "pattern": "^[a-z]+$" }),
            &[
                json!("ab"),
                json!("abcd"),
                json!("a"),
                json!("abcde"),
                json!("AB"),
                json!(12),
                json!(null),
            ],
        );
        assert_agrees(
            json!({ "type": "integer", "minimum": 0, "maximum": 10, "exclusiveMaximum": true }),
            &[json!(0), json!(9), json!(10), json!(-1), json!(2.5), json!("3")],
        );
        assert_agrees(
            json!({ "type": "number", "minimum": 1.5, "exclusiveMinimum": true }),
            &[json!(1.5), json!(1.6), json!(2), json!(1), json!(true)],
        );
        assert_agrees(
            json!({ "type": "string", "enum": ["red", "green"] }),
            &[json!("red"), json!("green"), json!("blue"), json!(1)],
        );
    }

    #[test]
    fn containers() {
        assert_agrees(
            json!({
                "type": "array",
                "minItems": 1,
                "maxItems": 3,
                "items": { "type": "integer" }
            }),
            &[
                json!([1]),
                json!([1, 2, 3]),
                json!([]),
                json!([1, 2, 3, 4]),
                json!([1, "2"]),
                json!({}),
            ],
        );
        assert_agrees(
            json!({
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": { "type": "integer" },
                    "tags": { "type": "array", "items": { "type": "string" } }
                },
                "additionalProperties": false
            }),
            &[
                json!({ "id": 1 }),
                json!({ "id": 1, "tags": ["a", "b"] }),
                json!({}),
                json!({ "id": "1" }),
                json!({ "id": 1, "tags": [1] }),
                json!({ "id": 1, "extra": true }),
                json!([]),
            ],
        );
    }
}
