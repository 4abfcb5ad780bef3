//! XSD built-in types
//!
//! Built-in datatypes only matter to this crate through the JSON value they
//! map to, so each one is classified by [`ValueKind`].

use crate::{XSD_1_1_NAMESPACE, XSD_NAMESPACE};

/// Value space a simple type maps to in structural data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    /// Any textual value (strings, dates, URIs, binary, QNames...)
    String,
    /// `xs:boolean`
    Boolean,
    /// `xs:integer` and its derived types
    Integer,
    /// `xs:decimal`
    Decimal,
    /// `xs:float` and `xs:double`
    Float,
    /// Whitespace separated list of items
    List(Box<ValueKind>),
}

impl ValueKind {
    /// Check whether values are JSON numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Decimal | Self::Float)
    }
}

/// Check if a namespace is one of the XSD namespaces
pub fn is_xsd_namespace(namespace: Option<&str>) -> bool {
    matches!(namespace, Some(XSD_NAMESPACE) | Some(XSD_1_1_NAMESPACE))
}

/// `xs:anyType` local name
pub const ANY_TYPE: &str = "anyType";

/// Classify a built-in type by local name
pub fn builtin_kind(local_name: &str) -> Option<ValueKind> {
    let kind = match local_name {
        "boolean" => ValueKind::Boolean,

        "integer" | "long" | "int" | "short" | "byte" | "nonNegativeInteger"
        | "positiveInteger" | "unsignedLong" | "unsignedInt" | "unsignedShort"
        | "unsignedByte" | "nonPositiveInteger" | "negativeInteger" => ValueKind::Integer,

        "decimal" => ValueKind::Decimal,
        "float" | "double" => ValueKind::Float,

        "NMTOKENS" | "IDREFS" | "ENTITIES" => ValueKind::List(Box::new(ValueKind::String)),

        "string" | "normalizedString" | "token" | "language" | "Name" | "NCName" | "ID"
        | "IDREF" | "ENTITY" | "NMTOKEN" | "duration" | "dateTime" | "dateTimeStamp"
        | "time" | "date" | "gYearMonth" | "gYear" | "gMonthDay" | "gDay" | "gMonth"
        | "hexBinary" | "base64Binary" | "anyURI" | "QName" | "NOTATION"
        | "anySimpleType" | "anyAtomicType" | "yearMonthDuration" | "dayTimeDuration" => {
            ValueKind::String
        }
        _ => return None,
    };
    Some(kind)
}
