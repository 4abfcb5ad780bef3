//! Structural type inference
//!
//! Maps schema declarations to the shape of the data [`build`](crate::build)
//! expects and [`parse`](crate::parse) produces. The rules are the ones the
//! converters apply: inherited fields come first, `minOccurs="0"` and
//! choices make fields optional, repeated particles become arrays, and
//! references are keyed by the referenced declaration's local name.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::converters::{is_integer_text, TEXT_KEY};
use crate::error::{ComponentKind, Error, Result};
use crate::model::{ComplexType, Element, Schema, ValueKind};
use crate::resolve::lookup::{all_elements, find_ref, Found};
use crate::walker::{Resolved, Walker};

/// Structural type of a data value
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Text
    String,
    /// `true` / `false`
    Boolean,
    /// Integer, decimal or float
    Number,
    /// Repeated values
    Array(Box<Shape>),
    /// Complex content
    Object(ObjectShape),
    /// Untyped content
    Any,
    /// Recursive use of an enclosing complex type
    Ref(String),
}

/// Fields of a complex type in serialization order
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectShape {
    /// Type name, or the element name for anonymous types
    pub name: String,
    /// Attributes, text and element fields
    pub fields: Vec<Field>,
}

/// A field of an object shape
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Data key
    pub name: String,
    /// Value shape
    pub shape: Shape,
    /// Key may be absent
    pub optional: bool,
    /// Element may occur more than once
    pub repeated: bool,
    /// Written as an XML attribute
    pub attribute: bool,
}

impl ObjectShape {
    /// Look up a field by data key
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl Shape {
    fn of_kind(kind: &ValueKind) -> Self {
        match kind {
            ValueKind::String => Shape::String,
            ValueKind::Boolean => Shape::Boolean,
            ValueKind::Integer | ValueKind::Decimal | ValueKind::Float => Shape::Number,
            ValueKind::List(item) => Shape::Array(Box::new(Shape::of_kind(item))),
        }
    }

    /// Object fields, if this is an object shape
    pub fn as_object(&self) -> Option<&ObjectShape> {
        match self {
            Shape::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Check whether `value` inhabits this shape
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Shape::Any, _) => true,
            (Shape::String, Value::String(_)) => true,
            (Shape::Boolean, Value::Bool(_)) => true,
            (Shape::Number, Value::Number(_)) => true,
            (Shape::Number, Value::String(s)) => {
                matches!(s.as_str(), "INF" | "-INF" | "NaN") || is_integer_text(s)
            }
            (Shape::Array(item), Value::Array(items)) => items.iter().all(|v| item.accepts(v)),
            (Shape::Ref(_), Value::Object(_)) => true,
            (Shape::Object(object), Value::Object(map)) => {
                let known = map.keys().all(|key| object.field(key).is_some());
                known
                    && object.fields.iter().all(|field| match map.get(&field.name) {
                        None | Some(Value::Null) => field.optional,
                        // No occurrences at all
                        Some(Value::Array(items)) if items.is_empty() && field.repeated => {
                            field.optional
                        }
                        Some(value) => field.shape.accepts(value),
                    })
            }
            _ => false,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::String => f.write_str("string"),
            Shape::Boolean => f.write_str("boolean"),
            Shape::Number => f.write_str("number"),
            Shape::Any => f.write_str("any"),
            Shape::Ref(name) => f.write_str(name),
            Shape::Array(item) => write!(f, "{}[]", item),
            Shape::Object(object) => {
                if object.fields.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, field) in object.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    let optional = if field.optional { "?" } else { "" };
                    write!(f, "{}{}: {}", field.name, optional, field.shape)?;
                }
                f.write_str(" }")
            }
        }
    }
}

/// Shape of the data for a top-level element
pub fn infer_element(schema: &Schema, name: &str) -> Result<Shape> {
    let found = find_ref::<Element>(schema, name)
        .ok_or_else(|| Error::reference(ComponentKind::Element, name))?;
    Inference::new(schema).element(found)
}

/// Shape of the data for a named complex type
pub fn infer_complex_type(schema: &Schema, name: &str) -> Result<Shape> {
    let found = find_ref::<ComplexType>(schema, name)
        .ok_or_else(|| Error::reference(ComponentKind::ComplexType, name))?;
    Inference::new(schema).complex(found, name)
}

/// Shapes of every concrete top-level element, keyed by element name
pub fn infer_schema(schema: &Schema) -> Result<IndexMap<String, Shape>> {
    let mut out = IndexMap::new();
    for found in all_elements(schema) {
        if found.item.is_abstract() {
            continue;
        }
        let Some(name) = found.item.name.clone() else {
            continue;
        };
        let shape = Inference::new(schema).element(found)?;
        out.insert(name, shape);
    }
    Ok(out)
}

struct Inference<'a> {
    walker: Walker<'a>,
    stack: Vec<*const ComplexType>,
}

impl<'a> Inference<'a> {
    fn new(schema: &'a Schema) -> Self {
        Self {
            walker: Walker::new(schema),
            stack: Vec::new(),
        }
    }

    fn element(&mut self, found: Found<'a, Element>) -> Result<Shape> {
        let name = found.item.name.as_deref().unwrap_or_default();
        match self.walker.declared_type(found.item, found.schema)? {
            Resolved::Simple(kind) => Ok(Shape::of_kind(&kind)),
            Resolved::Complex(ct) => self.complex(ct, name),
            Resolved::Any => Ok(Shape::Any),
        }
    }

    fn complex(&mut self, ct: Found<'a, ComplexType>, element_name: &str) -> Result<Shape> {
        let name = ct.item.name.as_deref().unwrap_or(element_name).to_string();
        if self.stack.contains(&ct.id()) {
            return Ok(Shape::Ref(name));
        }
        self.stack.push(ct.id());

        let mut fields = Vec::new();
        for attribute in self.walker.attributes(ct.item, ct.schema)? {
            fields.push(Field {
                name: attribute.name().to_string(),
                shape: Shape::of_kind(&self.walker.attribute_kind(&attribute)?),
                optional: !attribute.is_required(),
                repeated: false,
                attribute: true,
            });
        }
        if let Some(kind) = self.walker.text_kind(ct)? {
            fields.push(Field {
                name: TEXT_KEY.to_string(),
                shape: Shape::of_kind(&kind),
                optional: true,
                repeated: false,
                attribute: false,
            });
        }
        for field in self.walker.elements(ct.item, ct.schema)? {
            if field.is_abstract() {
                for member in self.walker.substitutes(&field) {
                    let Some(name) = member.item.name.as_deref() else {
                        continue;
                    };
                    let shape = self.element(member)?;
                    fields.push(Field {
                        name: name.to_string(),
                        shape: repeated(shape, field.is_repeated()),
                        optional: true,
                        repeated: field.is_repeated(),
                        attribute: false,
                    });
                }
                continue;
            }
            let shape = self.element(Found::new(field.declaration, field.declaration_schema))?;
            fields.push(Field {
                name: field.name().to_string(),
                shape: repeated(shape, field.is_repeated()),
                optional: field.optional,
                repeated: field.is_repeated(),
                attribute: false,
            });
        }

        self.stack.pop();
        Ok(Shape::Object(ObjectShape { name, fields }))
    }
}

fn repeated(shape: Shape, is_repeated: bool) -> Shape {
    if is_repeated {
        Shape::Array(Box::new(shape))
    } else {
        shape
    }
}
