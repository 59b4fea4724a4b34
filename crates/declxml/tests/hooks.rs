//! Hooks: validating and transforming values around any processor.

mod common;

use common::strip_xml;
use declxml::{
    Error, Hooks, ProcessorExt, ProcessorLocation, ProcessorStateView, Result, Value, array,
    dictionary, integer, named_tuple, parse_from_str, serialize_to_string, string,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, thiserror::Error)]
#[error("Invalid value")]
struct ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    name: String,
    age: i64,
}

fn reject(state: &ProcessorStateView<'_>, _: Value) -> Result<Value> {
    Err(state.raise_error(ValidationError))
}

fn rejecting() -> Hooks {
    Hooks::new().after_parse(reject).before_serialize(reject)
}

/// Both directions must fail with [`ValidationError`] at `location`.
fn assert_rejected_at(processor: &dyn declxml::Processor, xml: &str, value: &Value, location: &str) {
    for err in [
        parse_from_str(processor, xml).unwrap_err(),
        serialize_to_string(processor, value, None).unwrap_err(),
    ] {
        assert!(err.downcast_custom::<ValidationError>().is_some(), "Got: {:?}", err);
        assert_eq!(err.to_string(), format!("Invalid value at {location}"));
    }
}

fn assert_round_trip(processor: &dyn declxml::Processor, xml: &str, value: &Value) {
    assert_eq!(&parse_from_str(processor, xml).unwrap(), value);
    assert_eq!(serialize_to_string(processor, value, None).unwrap(), xml);
}

// ============================================================================
// Error locations
// ============================================================================

#[test]
fn test_primitive_error_location() {
    let processor = dictionary("data", vec![integer("value").hooks(rejecting()).boxed()]);
    assert_rejected_at(
        &processor,
        "<data><value>1</value></data>",
        &Value::record([("value", Value::Int(1))]),
        "data/value",
    );
}

#[test]
fn test_nested_array_error_location() {
    let processor = dictionary(
        "data",
        vec![
            array(integer("value"))
                .nested("values")
                .hooks(rejecting())
                .boxed(),
        ],
    );
    assert_rejected_at(
        &processor,
        "<data><values><value>1</value></values></data>",
        &Value::record([("values", Value::from(vec![1]))]),
        "data/values",
    );
}

#[test]
fn test_root_array_error_location() {
    let processor = array(integer("value")).nested("data").hooks(rejecting());
    assert_rejected_at(
        &processor,
        "<data><value>1</value></data>",
        &Value::from(vec![1]),
        "data",
    );
}

#[test]
fn test_root_record_error_location() {
    let processor = dictionary("data", vec![integer("a").boxed()]).hooks(rejecting());
    assert_rejected_at(
        &processor,
        "<data><a>1</a></data>",
        &Value::record([("a", Value::Int(1))]),
        "data",
    );
}

#[test]
fn test_nested_record_error_location() {
    let processor = dictionary(
        "data",
        vec![
            dictionary("user", vec![string("name").boxed()])
                .hooks(rejecting())
                .boxed(),
        ],
    );
    assert_rejected_at(
        &processor,
        "<data><user><name>Bob</name></user></data>",
        &Value::record([("user", Value::record([("name", Value::from("Bob"))]))]),
        "data/user",
    );
}

#[test]
fn test_aggregate_error_location() {
    let processor = dictionary(
        "data",
        vec![
            named_tuple::<User>("user", vec![string("name").boxed(), integer("age").boxed()])
                .hooks(rejecting())
                .boxed(),
        ],
    );
    let user = User {
        name: "Bob".to_string(),
        age: 24,
    };
    assert_rejected_at(
        &processor,
        "<data><user><name>Bob</name><age>24</age></user></data>",
        &Value::record([("user", Value::object(user))]),
        "data/user",
    );
}

// ============================================================================
// Validation
// ============================================================================

fn unique_values() -> Hooks {
    fn validate(state: &ProcessorStateView<'_>, value: Value) -> Result<Value> {
        let items = value.as_array().unwrap_or_default();
        let distinct: HashSet<i64> = items.iter().filter_map(Value::as_i64).collect();
        if distinct.len() != items.len() {
            return Err(state.raise_error(ValidationError));
        }
        Ok(value)
    }
    Hooks::new().after_parse(validate).before_serialize(validate)
}

#[test]
fn test_validate_array() {
    let processor = array(integer("value")).nested("data").hooks(unique_values());

    let valid = strip_xml(
        r#"
        <data>
            <value>1</value>
            <value>2</value>
            <value>3</value>
        </data>
        "#,
    );
    assert_round_trip(&processor, &valid, &Value::from(vec![1, 2, 3]));

    let invalid = "<data><value>1</value><value>3</value><value>3</value></data>";
    let err = parse_from_str(&processor, invalid).unwrap_err();
    assert!(err.downcast_custom::<ValidationError>().is_some());
    let err = serialize_to_string(&processor, &Value::from(vec![1, 3, 3]), None).unwrap_err();
    assert!(err.downcast_custom::<ValidationError>().is_some());
}

#[test]
fn test_validate_aggregate_fields() {
    fn adult(state: &ProcessorStateView<'_>, value: Value) -> Result<Value> {
        let user = value
            .as_object()
            .and_then(|object| object.downcast_ref::<User>())
            .ok_or_else(|| state.raise_error("expected a user"))?;
        if user.age < 18 {
            return Err(state.raise_error(ValidationError));
        }
        Ok(value)
    }

    let processor = named_tuple::<User>("user", vec![string("name").boxed(), integer("age").boxed()])
        .hooks(Hooks::new().after_parse(adult).before_serialize(adult));

    let xml = "<user><name>Bob</name><age>24</age></user>";
    let bob = Value::object(User {
        name: "Bob".to_string(),
        age: 24,
    });
    assert_round_trip(&processor, xml, &bob);

    let err = parse_from_str(&processor, "<user><name>Tim</name><age>9</age></user>").unwrap_err();
    assert!(matches!(err, Error::Custom { .. }));
    assert!(err.downcast_custom::<ValidationError>().is_some());
}

#[test]
fn test_plain_message_error() {
    let processor = dictionary(
        "data",
        vec![
            integer("value")
                .hooks(Hooks::new().after_parse(|state, value| {
                    if value.as_i64().is_some_and(|n| n < 0) {
                        return Err(state.raise_error("value must not be negative"));
                    }
                    Ok(value)
                }))
                .boxed(),
        ],
    );

    let err = parse_from_str(&processor, "<data><value>-3</value></data>").unwrap_err();
    assert_eq!(err.to_string(), "value must not be negative at data/value");
}

#[test]
fn test_empty_hooks_pass_through() {
    let processor = dictionary("data", vec![integer("a").boxed(), integer("b").boxed()])
        .hooks(Hooks::new());
    assert_round_trip(
        &processor,
        "<data><a>1</a><b>2</b></data>",
        &Value::record([("a", Value::Int(1)), ("b", Value::Int(2))]),
    );
}

// ============================================================================
// Transforms
// ============================================================================

#[test]
fn test_transform_primitive() {
    let processor = dictionary(
        "data",
        vec![
            string("name")
                .hooks(
                    Hooks::new()
                        .after_parse(|_, value| Ok(value.as_str().map(str::to_uppercase).into()))
                        .before_serialize(|_, value| {
                            Ok(value.as_str().map(str::to_lowercase).into())
                        }),
                )
                .boxed(),
        ],
    );

    let value = parse_from_str(&processor, "<data><name>bob</name></data>").unwrap();
    assert_eq!(value, Value::record([("name", Value::from("BOB"))]));
    assert_eq!(
        serialize_to_string(&processor, &value, None).unwrap(),
        "<data><name>bob</name></data>"
    );
}

#[test]
fn test_transform_record_to_array() {
    // Stores a record of named counts as a list of `count` values.
    let processor = array(integer("count"))
        .nested("counts")
        .hooks(
            Hooks::new()
                .after_parse(|_, value| {
                    let items = value.as_array().unwrap_or_default();
                    Ok(Value::record(
                        items
                            .iter()
                            .enumerate()
                            .map(|(i, v)| (format!("n{i}"), v.clone())),
                    ))
                })
                .before_serialize(|_, value| {
                    let fields = value.as_record().cloned().unwrap_or_default();
                    Ok(Value::Array(fields.into_values().collect()))
                }),
        );

    let xml = "<counts><count>4</count><count>7</count></counts>";
    let value = parse_from_str(&processor, xml).unwrap();
    assert_eq!(value, Value::record([("n0", Value::Int(4)), ("n1", Value::Int(7))]));
    assert_eq!(serialize_to_string(&processor, &value, None).unwrap(), xml);
}

// ============================================================================
// State view
// ============================================================================

#[test]
fn test_hooks_see_processor_locations() {
    let calls = Arc::new(AtomicUsize::new(0));
    let trace = {
        let calls = Arc::clone(&calls);
        move |state: &ProcessorStateView<'_>, value: Value| {
            calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(
                state.locations(),
                &[
                    ProcessorLocation::new("data", None),
                    ProcessorLocation::new("value", None),
                ]
            );
            Ok(value)
        }
    };

    let processor = dictionary(
        "data",
        vec![
            integer("value")
                .hooks(Hooks::new().after_parse(trace.clone()).before_serialize(trace))
                .boxed(),
        ],
    );

    parse_from_str(&processor, "<data><value>1</value></data>").unwrap();
    serialize_to_string(&processor, &Value::record([("value", Value::Int(1))]), None).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_hooks_see_array_indices() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let record = {
        let seen = Arc::clone(&seen);
        move |state: &ProcessorStateView<'_>, value: Value| {
            seen.lock().unwrap().push(state.breadcrumb());
            Ok(value)
        }
    };

    let processor = array(integer("value").hooks(Hooks::new().after_parse(record))).nested("data");
    parse_from_str(&processor, "<data><value>1</value><value>2</value></data>").unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["data/value[0]", "data/value[1]"]);
}
