//! Integration tests for schema composition
//!
//! The `orders` fixture spreads one document type over four files: an
//! include in the same namespace, an import of a foreign namespace and a
//! redefine that extends a type in place.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use xsd_bind::{
    build, infer_element, link_schema, parse, parse_xsd, resolve_all_schema, walk_attributes,
    walk_elements, write_xsd, BuildOptions, Error, Schema,
};

fn fixture(name: &str, text: &str) -> Arc<Schema> {
    Arc::new(parse_xsd(text).unwrap().with_filename(name))
}

fn orders() -> Schema {
    let main = parse_xsd(include_str!("fixtures/orders.xsd"))
        .unwrap()
        .with_filename("orders.xsd");
    let pool = vec![
        fixture("order-parts.xsd", include_str!("fixtures/order-parts.xsd")),
        fixture("order-base.xsd", include_str!("fixtures/order-base.xsd")),
        fixture("shipping.xsd", include_str!("fixtures/shipping.xsd")),
    ];
    link_schema(&main, &pool)
}

fn order_data() -> Value {
    json!({
        "id": "A1",
        "status": "open",
        "created": "2024-01-01",
        "author": "ann",
        "item": [
            {"sku": "X", "qty": 2},
            {"sku": "Y", "qty": 1, "note": "gift"}
        ],
        "address": {"street": "Main 1", "city": "Oslo"},
        "card": "4111"
    })
}

const ORDER_XML: &str = concat!(
    r#"<o:order xmlns:o="urn:orders" xmlns:s="urn:shipping" id="A1" status="open">"#,
    "<created>2024-01-01</created><author>ann</author>",
    "<o:item><o:sku>X</o:sku><o:qty>2</o:qty></o:item>",
    "<o:item><o:sku>Y</o:sku><o:qty>1</o:qty><o:note>gift</o:note></o:item>",
    "<s:address><s:street>Main 1</s:street><s:city>Oslo</s:city></s:address>",
    "<o:card>4111</o:card>",
    "</o:order>"
);

fn options() -> BuildOptions {
    BuildOptions::new().with_xml_decl(false)
}

#[test]
fn test_directives_are_linked() {
    let schema = orders();
    assert!(schema.includes[0].linked.is_some());
    assert!(schema.imports[0].linked.is_some());
    assert!(schema.redefines[0].linked.is_some());
}

#[test]
fn test_three_level_inheritance_order() {
    let schema = orders();
    let order = schema.components.complex_type("Order").unwrap();
    let fields = walk_elements(order, &schema).unwrap();
    let names: Vec<_> = fields.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["created", "author", "item", "address", "payment"]);

    let attributes = walk_attributes(order, &schema).unwrap();
    let names: Vec<_> = attributes.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["id", "status"]);
}

#[test]
fn test_build_composed_document() {
    let xml = build(&orders(), &order_data(), &options()).unwrap();
    assert_eq!(xml, ORDER_XML);
}

#[test]
fn test_parse_composed_document() {
    let data = parse(&orders(), ORDER_XML).unwrap();
    assert_eq!(data, order_data());
}

#[test]
fn test_inherited_fields_use_defining_schema_form() {
    // order-parts.xsd leaves elementFormDefault unqualified
    let xml = build(&orders(), &order_data(), &options()).unwrap();
    assert!(xml.contains("<created>"));
    assert!(!xml.contains("<o:created>"));

    // A qualified `created` is a different element and is ignored
    let renamed = ORDER_XML.replace("<created>2024-01-01</created>", "<o:created>2024-01-01</o:created>");
    let data = parse(&orders(), &renamed).unwrap();
    assert_eq!(data.get("created"), None);
}

#[test]
fn test_substitution_group_members() {
    let schema = orders();
    let mut data = order_data();
    let map = data.as_object_mut().unwrap();
    map.remove("card");
    map.insert("cash".to_string(), json!(12.5));

    let xml = build(&schema, &data, &options()).unwrap();
    assert!(xml.contains("<o:cash>12.5</o:cash>"));
    assert!(!xml.contains("payment"));
    assert_eq!(parse(&schema, &xml).unwrap(), data);

    data.as_object_mut().unwrap().remove("cash");
    let err = build(&schema, &data, &options()).unwrap_err();
    assert!(matches!(err, Error::MissingValue { .. }));
    assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("order/payment"));
}

#[test]
fn test_each_member_builds_its_own_tag() {
    let schema = orders();
    let card = build(&schema, &order_data(), &options()).unwrap();
    assert!(card.contains("<o:card>4111</o:card>"));
    assert!(!card.contains("<o:cash>"));

    let mut data = order_data();
    let map = data.as_object_mut().unwrap();
    map.remove("card");
    map.insert("cash".to_string(), json!(3));
    let cash = build(&schema, &data, &options()).unwrap();
    assert!(cash.contains("<o:cash>3</o:cash>"));
    assert!(!cash.contains("<o:card>"));
    assert_eq!(cash, ORDER_XML.replace("<o:card>4111</o:card>", "<o:cash>3</o:cash>"));
}

#[test]
fn test_single_payment_takes_one_member() {
    let mut data = order_data();
    data.as_object_mut().unwrap().insert("cash".to_string(), json!(5));
    let err = build(&orders(), &data, &options()).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("order/payment"));
}

const WRAPPED: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="box">
    <xs:complexType><xs:sequence>
      <xs:element name="label" type="xs:string"/>
      <xs:element ref="wrap" minOccurs="0"/>
    </xs:sequence></xs:complexType>
  </xs:element>
  <xs:element name="wrap" abstract="true"/>
  <xs:element name="paper" type="xs:string" substitutionGroup="wrap"/>
  <xs:element name="ribbon" type="xs:string" substitutionGroup="wrap"/>
</xs:schema>"#;

#[test]
fn test_optional_abstract_field_may_be_absent() {
    let schema = parse_xsd(WRAPPED).unwrap();
    let data = json!({"label": "socks"});
    let xml = build(&schema, &data, &options()).unwrap();
    assert_eq!(xml, "<box><label>socks</label></box>");
    assert_eq!(parse(&schema, &xml).unwrap(), data);

    let data = json!({"label": "socks", "ribbon": "red"});
    let xml = build(&schema, &data, &options()).unwrap();
    assert_eq!(xml, "<box><label>socks</label><ribbon>red</ribbon></box>");
    assert_eq!(parse(&schema, &xml).unwrap(), data);

    let both = json!({"label": "socks", "paper": "dots", "ribbon": "red"});
    let err = build(&schema, &both, &options()).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("box/wrap"));
}

#[test]
fn test_flattened_schema_is_equivalent() {
    let linked = orders();
    let flat = resolve_all_schema(&linked);
    assert!(!flat.has_directives());
    for name in ["Order", "Document", "Record", "Item", "Address"] {
        assert!(flat.components.complex_type(name).is_some(), "missing {}", name);
    }
    let roots: Vec<_> = flat
        .components
        .elements
        .iter()
        .filter_map(|e| e.name.as_deref())
        .collect();
    assert_eq!(roots, vec!["order"]);

    let xml = build(&flat, &order_data(), &options()).unwrap();
    assert_eq!(xml, ORDER_XML);
    assert_eq!(parse(&flat, ORDER_XML).unwrap(), order_data());
}

#[test]
fn test_flattened_schema_survives_writing() {
    let flat = resolve_all_schema(&orders());
    let reread = parse_xsd(&write_xsd(&flat).unwrap()).unwrap();
    let xml = build(&reread, &order_data(), &options()).unwrap();
    assert_eq!(xml, ORDER_XML);
}

#[test]
fn test_inferred_shape_accepts_document() {
    let shape = infer_element(&orders(), "o:order").unwrap();
    assert!(shape.accepts(&order_data()));

    let mut single_item = order_data();
    single_item["item"] = json!({"sku": "X", "qty": 2});
    assert!(!shape.accepts(&single_item));
}

#[test]
fn test_unresolved_reference_reports_path() {
    let schema = parse_xsd(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="doc">
            <xs:complexType><xs:sequence>
              <xs:element name="part" type="Missing"/>
            </xs:sequence></xs:complexType>
          </xs:element>
        </xs:schema>"#,
    )
    .unwrap();
    let err = build(&schema, &json!({"part": "x"}), &options()).unwrap_err();
    assert!(matches!(err, Error::SchemaReference { .. }));
    assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("doc/part"));
}
