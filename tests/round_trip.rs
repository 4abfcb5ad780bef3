//! Build/parse round-trip tests
//!
//! `parse(build(data)) == data` for data that inhabits the schema, plus
//! the single-versus-array cardinality rules on both sides.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use xsd_bind::{build, parse, parse_with, parse_xsd, BuildOptions, Error, ParseOptions, Schema};

fn person_schema() -> Schema {
    parse_xsd(include_str!("fixtures/person.xsd")).unwrap()
}

fn feed_schema() -> Schema {
    parse_xsd(include_str!("fixtures/feed.xsd")).unwrap()
}

fn options() -> BuildOptions {
    BuildOptions::new().with_xml_decl(false)
}

#[test]
fn test_person_document() {
    let schema = person_schema();
    let data = json!({"id": "123", "FirstName": "John", "LastName": "Doe", "Age": 30});

    let xml = build(&schema, &data, &BuildOptions::new()).unwrap();
    assert_eq!(
        xml,
        r#"<?xml version="1.0" encoding="UTF-8"?><Person id="123"><FirstName>John</FirstName><LastName>Doe</LastName><Age>30</Age></Person>"#
    );
    assert_eq!(parse(&schema, &xml).unwrap(), data);
}

#[test]
fn test_person_wrapped_data() {
    let schema = person_schema();
    let data = json!({"Person": {"id": "1", "FirstName": "A", "LastName": "B"}});
    let xml = build(&schema, &data, &options()).unwrap();
    assert_eq!(xml, r#"<Person id="1"><FirstName>A</FirstName><LastName>B</LastName></Person>"#);

    let parsed = parse_with(&schema, &xml, &ParseOptions::new().with_wrap_root(true)).unwrap();
    assert_eq!(parsed, data);
}

#[test]
fn test_pretty_output_parses_back() {
    let schema = person_schema();
    let data = json!({"id": "9", "FirstName": "Ann", "LastName": "Lee", "Email": ["a@x.org", "b@x.org"]});
    let xml = build(&schema, &data, &options().with_indent(2)).unwrap();
    assert!(xml.contains("\n  <FirstName>Ann</FirstName>"));
    assert_eq!(parse(&schema, &xml).unwrap(), data);
}

#[test]
fn test_string_whitespace_survives() {
    let schema = person_schema();
    let data = json!({"id": "5", "FirstName": " John ", "LastName": "van  Dijk\n"});
    let xml = build(&schema, &data, &options()).unwrap();
    assert!(xml.contains("<FirstName> John </FirstName>"));
    assert_eq!(parse(&schema, &xml).unwrap(), data);

    let pretty = build(&schema, &data, &options().with_indent(2)).unwrap();
    assert_eq!(parse(&schema, &pretty).unwrap(), data);
}

#[test]
fn test_entry_with_two_links() {
    let schema = feed_schema();
    let data = json!({
        "title": "Hello",
        "link": [{"href": "http://a.example"}, {"href": "http://b.example", "rel": "alternate"}]
    });
    let xml = build(&schema, &data, &options()).unwrap();
    assert_eq!(xml.matches("<f:link ").count(), 2);

    let parsed = parse(&schema, &xml).unwrap();
    assert_eq!(parsed["link"].as_array().map(Vec::len), Some(2));
    assert_eq!(parsed, data);
}

#[test]
fn test_single_node_stays_an_array() {
    let schema = feed_schema();
    let xml = r#"<f:entry xmlns:f="urn:feed"><f:title>T</f:title><f:link href="x"/></f:entry>"#;
    let parsed = parse(&schema, xml).unwrap();
    assert_eq!(parsed, json!({"title": "T", "link": [{"href": "x"}]}));
    assert!(parsed["title"].is_string());
}

#[test]
fn test_array_shape_mismatch() {
    let schema = feed_schema();
    let err = build(&schema, &json!({"title": "T", "link": {"href": "x"}}), &options()).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("entry/link"));

    let links: Vec<Value> = (0..6).map(|i| json!({"href": format!("l{}", i)})).collect();
    let err = build(&schema, &json!({"title": "T", "link": links}), &options()).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn test_malformed_xml() {
    let schema = person_schema();
    let err = parse(&schema, "<Person><FirstName></Person>").unwrap_err();
    assert!(matches!(err, Error::MalformedDocument(_)));
}

fn person_data() -> impl Strategy<Value = Value> {
    (
        "[a-z0-9]{1,8}",
        " ?[A-Za-z][A-Za-z ]{0,10} ?",
        "[ \t]*[A-Za-z]{1,12}[ \n]*",
        proptest::option::of(0i64..150),
        proptest::collection::vec("[a-z]{1,8}@[a-z]{1,8}\\.org", 0..3),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(id, first, last, age, emails, active)| {
            let mut map = Map::new();
            map.insert("id".to_string(), json!(id));
            if let Some(active) = active {
                map.insert("active".to_string(), json!(active));
            }
            map.insert("FirstName".to_string(), json!(first));
            map.insert("LastName".to_string(), json!(last));
            if let Some(age) = age {
                map.insert("Age".to_string(), json!(age));
            }
            // Empty arrays normalize to absence
            if !emails.is_empty() {
                map.insert("Email".to_string(), json!(emails));
            }
            Value::Object(map)
        })
}

proptest! {
    #[test]
    fn prop_person_round_trip(data in person_data()) {
        let schema = person_schema();
        let xml = build(&schema, &data, &BuildOptions::new()).unwrap();
        let parsed = parse(&schema, &xml).unwrap();
        prop_assert_eq!(parsed, data);
    }
}
