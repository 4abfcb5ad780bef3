//! Schema-driven XML parser
//!
//! Reads an instance document into structural data by walking the schema
//! the same way the builder does. Cardinality comes from the declaration,
//! never from the number of nodes found: a repeated field is always an
//! array and a single field never is.
//!
//! Parsing is lenient: nodes and attributes the schema does not declare are
//! skipped, and declared fields missing from the document are left out.

use serde_json::{Map, Value};

use crate::documents::{Document, Element as Node};
use crate::error::{ComponentKind, Error, FieldPath, Result};
use crate::model::{ComplexType, Element, Schema};
use crate::resolve::lookup::{all_elements, Found};
use crate::walker::{ElementField, Resolved, Walker};

use super::base::ParseOptions;
use super::naming::{attribute_name, element_name, global_element_name, WireName};
use super::values::coerce_value;
use super::TEXT_KEY;

/// Parse an XML document into structural data with default options
pub fn parse(schema: &Schema, xml: &str) -> Result<Value> {
    parse_with(schema, xml, &ParseOptions::default())
}

/// Parse an XML document into structural data
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use xsd_bind::{parse_with, parse_xsd, ParseOptions};
///
/// let schema = parse_xsd(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
///   <xs:element name="note">
///     <xs:complexType><xs:sequence>
///       <xs:element name="to" type="xs:string" maxOccurs="unbounded"/>
///     </xs:sequence></xs:complexType>
///   </xs:element>
/// </xs:schema>"#).unwrap();
///
/// let options = ParseOptions::new().with_wrap_root(true);
/// let data = parse_with(&schema, "<note><to>Tove</to></note>", &options).unwrap();
/// assert_eq!(data, json!({"note": {"to": ["Tove"]}}));
/// ```
pub fn parse_with(schema: &Schema, xml: &str, options: &ParseOptions) -> Result<Value> {
    let document = Document::parse_with_limits(xml, options.limits())?;
    let walker = Walker::new(schema);
    let root = match_root(&walker, &document.root, options)?;
    let name = root.item.name.as_deref().unwrap_or_default();
    let decoder = Decoder { walker };
    let value = decoder.element(&document.root, root.item, root.schema, &FieldPath::root(name))?;

    if options.wrap_root() {
        let mut map = Map::new();
        map.insert(name.to_string(), value);
        return Ok(Value::Object(map));
    }
    Ok(value)
}

/// Top-level declaration describing the document root
fn match_root<'a>(
    walker: &Walker<'a>,
    node: &Node,
    options: &ParseOptions,
) -> Result<Found<'a, Element>> {
    let candidates = all_elements(walker.root());

    if let Some(wanted) = options.root_element() {
        let name = walker.root().resolve_qname(wanted);
        return candidates
            .iter()
            .find(|c| c.qname() == name)
            .or_else(|| {
                candidates
                    .iter()
                    .find(|c| c.item.name.as_deref() == Some(name.local_name.as_str()))
            })
            .copied()
            .ok_or_else(|| Error::reference(ComponentKind::Element, wanted));
    }

    candidates
        .iter()
        .find(|c| c.qname() == node.qname)
        .or_else(|| {
            candidates
                .iter()
                .find(|c| c.item.name.as_deref() == Some(node.local_name()))
        })
        .copied()
        .ok_or_else(|| Error::reference(ComponentKind::Element, node.tag_name()))
}

struct Decoder<'a> {
    walker: Walker<'a>,
}

impl<'a> Decoder<'a> {
    fn element(
        &self,
        node: &Node,
        declaration: &'a Element,
        schema: &'a Schema,
        path: &FieldPath,
    ) -> Result<Value> {
        if node.is_nil() {
            return Ok(Value::Null);
        }
        let resolved = self
            .walker
            .declared_type(declaration, schema)
            .map_err(|e| e.at(path))?;
        match resolved {
            Resolved::Simple(kind) => coerce_value(node.text.as_deref().unwrap_or_default(), &kind, path),
            Resolved::Complex(ct) => self.complex(node, ct, path),
            Resolved::Any => Ok(any(node)),
        }
    }

    fn complex(&self, node: &Node, ct: Found<'a, ComplexType>, path: &FieldPath) -> Result<Value> {
        let mut map = Map::new();

        let attributes = self
            .walker
            .attributes(ct.item, ct.schema)
            .map_err(|e| e.at(path))?;
        for field in &attributes {
            let wire = attribute_name(field);
            let Some(text) = node.attribute(&wire.qname) else {
                continue;
            };
            let attribute_path = path.attribute(field.name());
            let kind = self
                .walker
                .attribute_kind(field)
                .map_err(|e| e.at(&attribute_path))?;
            map.insert(field.name().to_string(), coerce_value(text, &kind, &attribute_path)?);
        }

        if let Some(kind) = self.walker.text_kind(ct).map_err(|e| e.at(path))? {
            if let Some(text) = &node.text {
                map.insert(TEXT_KEY.to_string(), coerce_value(text, &kind, &path.child(TEXT_KEY))?);
            }
        }

        let fields = self
            .walker
            .elements(ct.item, ct.schema)
            .map_err(|e| e.at(path))?;
        let mut consumed = vec![false; node.children.len()];
        let mut singles: Vec<WireName> = Vec::new();
        for field in &fields {
            if field.is_abstract() {
                for member in self.walker.substitutes(field) {
                    let Some(name) = member.item.name.as_deref() else {
                        continue;
                    };
                    let wire = global_element_name(member.item, member.schema);
                    let value = self.occurrences(
                        node,
                        &mut consumed,
                        field,
                        &wire,
                        member.item,
                        member.schema,
                        &path.child(name),
                    )?;
                    if let Some(value) = value {
                        map.insert(name.to_string(), value);
                    }
                    if !field.is_repeated() {
                        singles.push(wire);
                    }
                }
                continue;
            }
            let wire = element_name(field);
            let name = field.name();
            let value = self.occurrences(
                node,
                &mut consumed,
                field,
                &wire,
                field.declaration,
                field.declaration_schema,
                &path.child(name),
            )?;
            if let Some(value) = value {
                map.insert(name.to_string(), value);
            }
            if !field.is_repeated() {
                singles.push(wire);
            }
        }

        for (child, _) in node.children.iter().zip(&consumed).filter(|(_, used)| !**used) {
            if singles.iter().any(|wire| wire.qname == child.qname) {
                tracing::warn!(path = %path, tag = %child.tag_name(), "extra node for a single-valued field ignored");
            } else {
                tracing::trace!(path = %path, tag = %child.tag_name(), "undeclared node skipped");
            }
        }
        Ok(Value::Object(map))
    }

    /// Decode the nodes of one field; `None` when no node matches
    #[allow(clippy::too_many_arguments)]
    fn occurrences(
        &self,
        node: &Node,
        consumed: &mut [bool],
        field: &ElementField<'a>,
        wire: &WireName,
        declaration: &'a Element,
        schema: &'a Schema,
        path: &FieldPath,
    ) -> Result<Option<Value>> {
        let limit = match (field.is_repeated(), field.occurs.max) {
            (false, _) => 1,
            (true, Some(max)) => max as usize,
            (true, None) => usize::MAX,
        };
        let matches: Vec<usize> = node
            .children
            .iter()
            .enumerate()
            .filter(|(i, child)| !consumed[*i] && child.qname == wire.qname)
            .map(|(i, _)| i)
            .take(limit)
            .collect();
        if matches.is_empty() {
            return Ok(None);
        }
        for &i in &matches {
            consumed[i] = true;
        }

        if !field.is_repeated() {
            let value = self.element(&node.children[matches[0]], declaration, schema, path)?;
            return Ok(Some(value));
        }
        let items = matches
            .iter()
            .enumerate()
            .map(|(n, &i)| self.element(&node.children[i], declaration, schema, &path.index(n)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(Value::Array(items)))
    }
}

/// Generic content: children become keys (repeated tags arrays), text a
/// string or `$value` next to children
fn any(node: &Node) -> Value {
    if node.is_nil() {
        return Value::Null;
    }
    if node.children.is_empty() {
        return Value::String(node.text.clone().unwrap_or_default());
    }
    let mut map = Map::new();
    if let Some(text) = &node.text {
        map.insert(TEXT_KEY.to_string(), Value::String(text.clone()));
    }
    for child in &node.children {
        let key = child.local_name().to_string();
        let value = any(child);
        match map.get_mut(&key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key, value);
            }
        }
    }
    if !node.attributes.is_empty() {
        tracing::trace!(tag = %node.tag_name(), "attributes of untyped content skipped");
    }
    Value::Object(map)
}
