//! Schema-driven XML builder
//!
//! Serializes structural data (a `serde_json::Value`) to XML by walking the
//! schema. Field order, cardinality and wire names come from the
//! [`Walker`]; every namespace the output uses is declared on the root.

use serde_json::{Map, Value};

use crate::documents::{Document, Element as Node};
use crate::error::{ComponentKind, Error, FieldPath, Result};
use crate::model::{ComplexType, Element, Schema, ValueKind};
use crate::namespaces::{NamespaceContext, QName};
use crate::resolve::lookup::{all_elements, Found};
use crate::walker::{ElementField, Resolved, Walker};

use super::base::BuildOptions;
use super::naming::{attribute_name, element_name, global_element_name, WireName};
use super::values::format_value;
use super::TEXT_KEY;

/// Build an XML document from `data`.
///
/// The root element is `options.root_element` when given. Otherwise a
/// single-key object naming a top-level element is unwrapped, and failing
/// that the top-level element whose fields best match the data's keys is
/// used (the first declared one when nothing matches).
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use xsd_bind::{build, parse_xsd, BuildOptions};
///
/// let schema = parse_xsd(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
///   <xs:element name="note">
///     <xs:complexType><xs:sequence>
///       <xs:element name="to" type="xs:string"/>
///     </xs:sequence></xs:complexType>
///   </xs:element>
/// </xs:schema>"#).unwrap();
///
/// let xml = build(&schema, &json!({"to": "Tove"}), &BuildOptions::new().with_xml_decl(false)).unwrap();
/// assert_eq!(xml, "<note><to>Tove</to></note>");
/// ```
pub fn build(schema: &Schema, data: &Value, options: &BuildOptions) -> Result<String> {
    let walker = Walker::new(schema);
    let (root, content) = select_root(&walker, data, options)?;
    let mut encoder = Encoder {
        walker,
        namespaces: NamespaceContext::new(),
    };

    let name = global_element_name(root.item, root.schema);
    if let (Some(prefix), Some(namespace)) = (options.prefix(), name.qname.namespace()) {
        encoder.namespaces.declare(namespace, Some(prefix));
    }
    let path = FieldPath::root(name.qname.local_name.clone());
    let mut node = match content {
        Value::Null => encoder.node(&name),
        value => encoder.element(&name, root.item, root.schema, value, &path)?,
    };

    if options.force_root_close_tag() && node.children.is_empty() && node.text.is_none() {
        node.set_text("");
    }
    node.namespaces = encoder.namespaces;
    Document::new(node).to_xml(&options.write_options())
}

/// Pick the root declaration and the data it serializes
fn select_root<'a, 'd>(
    walker: &Walker<'a>,
    data: &'d Value,
    options: &BuildOptions,
) -> Result<(Found<'a, Element>, &'d Value)> {
    let candidates: Vec<_> = all_elements(walker.root())
        .into_iter()
        .filter(|found| !found.item.is_abstract())
        .collect();

    if let Some(wanted) = options.root_element() {
        let name = walker.root().resolve_qname(wanted);
        let found = candidates
            .iter()
            .find(|c| c.qname() == name)
            .or_else(|| {
                candidates
                    .iter()
                    .find(|c| c.item.name.as_deref() == Some(name.local_name.as_str()))
            })
            .copied()
            .ok_or_else(|| Error::reference(ComponentKind::Element, wanted))?;
        return Ok((found, unwrap_single(data, &name.local_name)));
    }

    if let Value::Object(map) = data {
        if map.len() == 1 {
            if let Some((key, inner)) = map.iter().next() {
                if let Some(found) = candidates
                    .iter()
                    .find(|c| c.item.name.as_deref() == Some(key.as_str()))
                {
                    tracing::debug!(root = %key, "root element named by the data");
                    return Ok((*found, inner));
                }
            }
        }
    }

    let mut best: Option<(Found<'a, Element>, usize)> = None;
    for candidate in &candidates {
        let score = match data {
            Value::Object(map) => score(walker, *candidate, map),
            _ => 0,
        };
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((*candidate, score));
        }
    }
    let (found, score) = best.ok_or_else(|| {
        Error::InvalidSchema("schema declares no concrete top-level element".to_string())
    })?;
    tracing::debug!(
        root = found.item.name.as_deref().unwrap_or_default(),
        score,
        "root element chosen by field match"
    );
    Ok((found, data))
}

fn unwrap_single<'d>(data: &'d Value, name: &str) -> &'d Value {
    match data {
        Value::Object(map) if map.len() == 1 => map.get(name).unwrap_or(data),
        _ => data,
    }
}

/// Number of data keys that are fields of the candidate's type
fn score<'a>(walker: &Walker<'a>, candidate: Found<'a, Element>, data: &Map<String, Value>) -> usize {
    let Ok(Resolved::Complex(ct)) = walker.declared_type(candidate.item, candidate.schema) else {
        return 0;
    };
    let mut names: Vec<&str> = Vec::new();
    if let Ok(fields) = walker.elements(ct.item, ct.schema) {
        for field in &fields {
            if field.is_abstract() {
                names.extend(
                    walker
                        .substitutes(field)
                        .into_iter()
                        .filter_map(|member| member.item.name.as_deref()),
                );
            } else {
                names.push(field.name());
            }
        }
    }
    if let Ok(fields) = walker.attributes(ct.item, ct.schema) {
        names.extend(fields.iter().map(|f| f.name()));
    }
    data.keys().filter(|key| names.contains(&key.as_str())).count()
}

struct Encoder<'a> {
    walker: Walker<'a>,
    namespaces: NamespaceContext,
}

impl<'a> Encoder<'a> {
    fn node(&mut self, name: &WireName) -> Node {
        let prefix = name.declare(&mut self.namespaces);
        Node::prefixed(name.qname.clone(), prefix)
    }

    /// Serialize one element of the given declaration
    fn element(
        &mut self,
        name: &WireName,
        declaration: &'a Element,
        schema: &'a Schema,
        value: &Value,
        path: &FieldPath,
    ) -> Result<Node> {
        let mut node = self.node(name);
        let resolved = self
            .walker
            .declared_type(declaration, schema)
            .map_err(|e| e.at(path))?;
        match resolved {
            Resolved::Simple(kind) => node.set_text(format_value(value, &kind, path)?),
            Resolved::Complex(ct) => self.complex(&mut node, ct, value, path)?,
            Resolved::Any => self.any(&mut node, value, path)?,
        }
        Ok(node)
    }

    fn complex(
        &mut self,
        node: &mut Node,
        ct: Found<'a, ComplexType>,
        value: &Value,
        path: &FieldPath,
    ) -> Result<()> {
        let text_kind = self.walker.text_kind(ct).map_err(|e| e.at(path))?;
        let map = match value {
            Value::Object(map) => map,
            scalar => {
                // Bare scalar for a type with text content
                return match &text_kind {
                    Some(kind) => {
                        node.set_text(format_value(scalar, kind, path)?);
                        self.attributes(node, ct, &Map::new(), path)
                    }
                    None => Err(Error::type_mismatch(path, "expected an object")),
                };
            }
        };

        self.attributes(node, ct, map, path)?;
        if let Some(kind) = &text_kind {
            if let Some(text) = map.get(TEXT_KEY).filter(|v| !v.is_null()) {
                node.set_text(format_value(text, kind, &path.child(TEXT_KEY))?);
            }
        }

        let fields = self
            .walker
            .elements(ct.item, ct.schema)
            .map_err(|e| e.at(path))?;
        for field in &fields {
            if field.is_abstract() {
                self.substitutes(node, field, map, path)?;
                continue;
            }
            let name = field.name();
            let field_path = path.child(name);
            match map.get(name) {
                None | Some(Value::Null) => {
                    if !field.optional {
                        return Err(Error::missing(&field_path));
                    }
                }
                Some(value) => {
                    let wire = element_name(field);
                    self.occurrences(node, field, &wire, field.declaration, field.declaration_schema, value, &field_path)?;
                }
            }
        }
        for key in map.keys() {
            if key != TEXT_KEY && !fields.iter().any(|f| f.name() == key) {
                tracing::trace!(path = %path, key = %key, "key is not a field of the type");
            }
        }
        Ok(())
    }

    fn attributes(
        &mut self,
        node: &mut Node,
        ct: Found<'a, ComplexType>,
        map: &Map<String, Value>,
        path: &FieldPath,
    ) -> Result<()> {
        let fields = self
            .walker
            .attributes(ct.item, ct.schema)
            .map_err(|e| e.at(path))?;
        for field in &fields {
            let name = field.name();
            let attribute_path = path.attribute(name);
            let value = match map.get(name) {
                None | Some(Value::Null) if field.is_required() => {
                    return Err(Error::missing(&attribute_path));
                }
                None | Some(Value::Null) => continue,
                Some(value) => value,
            };
            let kind = self
                .walker
                .attribute_kind(field)
                .map_err(|e| e.at(&attribute_path))?;
            let text = format_value(value, &kind, &attribute_path)?;
            let wire = attribute_name(field);
            let prefix = wire.declare(&mut self.namespaces);
            node.set_attribute(wire.qname, prefix, text);
        }
        Ok(())
    }

    /// Emit the elements of one field, honoring its cardinality
    #[allow(clippy::too_many_arguments)]
    fn occurrences(
        &mut self,
        node: &mut Node,
        field: &ElementField<'a>,
        wire: &WireName,
        declaration: &'a Element,
        schema: &'a Schema,
        value: &Value,
        path: &FieldPath,
    ) -> Result<()> {
        if !field.is_repeated() {
            let child = self.element(wire, declaration, schema, value, path)?;
            node.add_child(child);
            return Ok(());
        }
        let Value::Array(items) = value else {
            return Err(Error::type_mismatch(path, "expected an array"));
        };
        if let Some(max) = field.occurs.max {
            if items.len() > max as usize {
                return Err(Error::type_mismatch(
                    path,
                    format!("at most {} values allowed, found {}", max, items.len()),
                ));
            }
        }
        if items.is_empty() && !field.optional {
            return Err(Error::missing(path));
        }
        for (i, item) in items.iter().enumerate() {
            if item.is_null() {
                continue;
            }
            let child = self.element(wire, declaration, schema, item, &path.index(i))?;
            node.add_child(child);
        }
        Ok(())
    }

    /// Emit whichever concrete substitutes of an abstract field the data names
    fn substitutes(
        &mut self,
        node: &mut Node,
        field: &ElementField<'a>,
        map: &Map<String, Value>,
        path: &FieldPath,
    ) -> Result<()> {
        let mut emitted: Vec<&str> = Vec::new();
        for member in self.walker.substitutes(field) {
            let Some(name) = member.item.name.as_deref() else {
                continue;
            };
            let Some(value) = map.get(name).filter(|v| !v.is_null()) else {
                continue;
            };
            if !field.is_repeated() && !emitted.is_empty() {
                return Err(Error::type_mismatch(
                    &path.child(field.name()),
                    format!("only one of '{}' and '{}' may be given", emitted[0], name),
                ));
            }
            let wire = global_element_name(member.item, member.schema);
            self.occurrences(node, field, &wire, member.item, member.schema, value, &path.child(name))?;
            emitted.push(name);
        }
        if emitted.is_empty() && !field.optional {
            return Err(Error::missing(&path.child(field.name())));
        }
        Ok(())
    }

    /// Generic content for untyped elements: keys become unqualified children
    fn any(&mut self, node: &mut Node, value: &Value, path: &FieldPath) -> Result<()> {
        match value {
            Value::Object(map) => {
                for (key, value) in map {
                    if key == TEXT_KEY {
                        node.set_text(format_value(value, &ValueKind::String, path)?);
                        continue;
                    }
                    let items: Vec<&Value> = match value {
                        Value::Array(items) => items.iter().collect(),
                        single => vec![single],
                    };
                    for (i, item) in items.into_iter().enumerate() {
                        if item.is_null() {
                            continue;
                        }
                        let mut child = Node::new(QName::local(key.as_str()));
                        self.any(&mut child, item, &path.child(key.as_str()).index(i))?;
                        node.add_child(child);
                    }
                }
                Ok(())
            }
            Value::Array(_) => Err(Error::type_mismatch(path, "expected an object or a value")),
            Value::Null => Ok(()),
            scalar => {
                node.set_text(format_value(scalar, &ValueKind::String, path)?);
                Ok(())
            }
        }
    }
}
