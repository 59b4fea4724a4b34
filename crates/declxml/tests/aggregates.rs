//! Aggregates: records converted to and from user-defined types.

mod common;

use common::strip_xml;
use declxml::{
    Converter, ErrorKind, Mapping, ProcessorExt, Value, aggregate, array, dictionary,
    floating_point, integer, named_tuple, parse_from_str, serialize_to_string, string,
    user_object,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Author {
    name: String,
    genre: Option<Genre>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Genre {
    name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Athlete {
    name: String,
    age: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Person {
    name: String,
    age: i64,
    email: Option<String>,
}

fn author() -> declxml::AggregateProcessor {
    named_tuple::<Author>(
        "author",
        vec![
            string("name").boxed(),
            named_tuple::<Genre>("genre", vec![string("name").boxed()])
                .required(false)
                .boxed(),
        ],
    )
}

// ============================================================================
// Named tuples
// ============================================================================

#[test]
fn test_named_tuple_parse() {
    let xml = strip_xml(
        r#"
        <author>
            <name>Robert A. Heinlein</name>
            <genre>
                <name>Science Fiction</name>
            </genre>
        </author>
        "#,
    );

    let value = parse_from_str(&author(), &xml).unwrap();
    assert_eq!(
        value.as_object().and_then(|o| o.downcast_ref::<Author>()),
        Some(&Author {
            name: "Robert A. Heinlein".to_string(),
            genre: Some(Genre {
                name: "Science Fiction".to_string()
            }),
        })
    );
}

#[test]
fn test_missing_optional_named_tuple_is_none() {
    let xml = r#"
    <author>
        <name>Robert A. Heinlein</name>
    </author>
    "#;

    let value = parse_from_str(&author(), xml).unwrap();
    assert_eq!(
        value,
        Value::object(Author {
            name: "Robert A. Heinlein".to_string(),
            genre: None,
        })
    );
}

#[test]
fn test_named_tuple_missing_field() {
    let processor = named_tuple::<Athlete>("athlete", vec![string("name").boxed()]);
    let err = parse_from_str(&processor, "<athlete><name>Bolt</name></athlete>").unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::Conversion));
    assert!(err.to_string().starts_with("Cannot convert \"athlete\""), "Got: {}", err);
    assert!(err.to_string().ends_with(" at athlete"), "Got: {}", err);
}

#[test]
fn test_named_tuple_serialize() {
    let value = Value::object(Author {
        name: "Ursula K. Le Guin".to_string(),
        genre: Some(Genre {
            name: "Fantasy".to_string(),
        }),
    });

    let expected = strip_xml(
        r#"
        <author>
            <name>Ursula K. Le Guin</name>
            <genre>
                <name>Fantasy</name>
            </genre>
        </author>
        "#,
    );
    assert_eq!(serialize_to_string(&author(), &value, None).unwrap(), expected);

    let without_genre = Value::object(Author {
        name: "Ursula K. Le Guin".to_string(),
        genre: None,
    });
    assert_eq!(
        serialize_to_string(&author(), &without_genre, None).unwrap(),
        "<author><name>Ursula K. Le Guin</name></author>"
    );
}

#[test]
fn test_serialize_null_named_tuple() {
    let processor = dictionary(
        "race-result",
        vec![
            floating_point("time").boxed(),
            named_tuple::<Athlete>("athlete", vec![string("name").boxed(), integer("age").boxed()])
                .required(false)
                .boxed(),
        ],
    );
    let value = Value::record([("time", Value::Float(87.5)), ("athlete", Value::Null)]);

    assert_eq!(
        serialize_to_string(&processor, &value, None).unwrap(),
        "<race-result><time>87.5</time></race-result>"
    );
}

// ============================================================================
// User objects
// ============================================================================

fn person() -> declxml::AggregateProcessor {
    user_object::<Person>(
        "person",
        vec![
            string("full-name").with_alias("name").boxed(),
            integer("age").required(false).boxed(),
        ],
    )
}

#[test]
fn test_user_object_parse_aliased() {
    let xml = "<person><full-name>Bob</full-name><age>24</age></person>";
    let value = parse_from_str(&person(), xml).unwrap();
    assert_eq!(
        value,
        Value::object(Person {
            name: "Bob".to_string(),
            age: 24,
            email: None,
        })
    );
}

#[test]
fn test_user_object_serialize_aliased() {
    let value = Value::object(Person {
        name: "Bob".to_string(),
        age: 24,
        email: Some("bob@example.com".to_string()),
    });
    assert_eq!(
        serialize_to_string(&person(), &value, None).unwrap(),
        "<person><full-name>Bob</full-name><age>24</age></person>"
    );
}

#[test]
fn test_user_object_array() {
    let processor = dictionary("people", vec![array(person()).with_alias("people").boxed()]);
    let xml = strip_xml(
        r#"
        <people>
            <person><full-name>Bob</full-name><age>24</age></person>
            <person><full-name>Alice</full-name><age>32</age></person>
        </people>
        "#,
    );

    let value = parse_from_str(&processor, &xml).unwrap();
    let people: Vec<&Person> = value
        .get("people")
        .and_then(Value::as_array)
        .unwrap()
        .iter()
        .filter_map(|v| v.as_object().and_then(|o| o.downcast_ref::<Person>()))
        .collect();
    assert_eq!(people.len(), 2);
    assert_eq!(people[1].name, "Alice");

    assert_eq!(serialize_to_string(&processor, &value, None).unwrap(), xml);
}

#[test]
fn test_serialize_null_user_object() {
    let processor = dictionary(
        "race-result",
        vec![
            floating_point("time").boxed(),
            user_object::<Person>("athlete", vec![string("name").boxed(), integer("age").boxed()])
                .required(false)
                .boxed(),
        ],
    );
    let value = Value::record([("time", Value::Float(87.5))]);

    assert_eq!(
        serialize_to_string(&processor, &value, None).unwrap(),
        "<race-result><time>87.5</time></race-result>"
    );
}

#[test]
fn test_records_are_accepted_in_place_of_objects() {
    let value = Value::record([("name", Value::from("Bob")), ("age", Value::Int(24))]);
    assert_eq!(
        serialize_to_string(&person(), &value, None).unwrap(),
        "<person><full-name>Bob</full-name><age>24</age></person>"
    );
}

#[test]
fn test_wrong_object_type_is_conversion_error() {
    let processor = named_tuple::<Athlete>("athlete", vec![string("name").boxed()]);
    let err = serialize_to_string(&processor, &Value::from("Bolt"), None).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Conversion));
}

// ============================================================================
// Custom converters
// ============================================================================

#[test]
fn test_custom_converter() {
    // Stores a point record as an "x,y" string.
    let converter = Converter::new(
        |mapping: Mapping| {
            let x = mapping.get("x").and_then(Value::as_i64).ok_or("missing x")?;
            let y = mapping.get("y").and_then(Value::as_i64).ok_or("missing y")?;
            Ok(Value::from(format!("{x},{y}")))
        },
        |value: &Value| {
            let text = value.as_str().ok_or("expected a string")?;
            let (x, y) = text.split_once(',').ok_or("expected x,y")?;
            let mut mapping = Mapping::new();
            mapping.insert("x".to_string(), Value::Int(x.parse()?));
            mapping.insert("y".to_string(), Value::Int(y.parse()?));
            Ok(mapping)
        },
    );
    let processor = aggregate(
        "point",
        vec![integer("x").attribute("x").boxed(), integer("y").attribute("y").boxed()],
        converter,
    );

    let value = parse_from_str(&processor, r#"<point><x x="3"/><y y="4"/></point>"#).unwrap();
    assert_eq!(value, Value::from("3,4"));

    assert_eq!(
        serialize_to_string(&processor, &Value::from("5,-1"), None).unwrap(),
        r#"<point><x x="5"/><y y="-1"/></point>"#
    );
}
