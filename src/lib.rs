//! # xsd-bind
//!
//! A schema-driven XML build/parse engine for W3C XML Schema (XSD 1.0 and
//! XSD 1.1) documents.
//!
//! A schema is read into a plain data model, linked with the schemas it
//! includes, imports or redefines, and then drives conversion between
//! structural data (`serde_json::Value`) and XML text. No per-type code is
//! needed: field order, cardinality, inheritance, substitution groups and
//! namespace qualification all come from the schema.
//!
//! ## Features
//!
//! - XSD parsing into a serializable model, and writing it back
//! - `include` / `import` / `redefine` / `override` linking over a schema pool
//! - Flattening a linked graph into a single self-contained schema
//! - Building XML from data and parsing XML into data
//! - Structural type inference for the data a schema describes
//! - Protection against oversized or deeply nested documents
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use xsd_bind::{build, parse, parse_xsd, BuildOptions};
//!
//! let schema = parse_xsd(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
//!   <xs:element name="Person">
//!     <xs:complexType>
//!       <xs:sequence>
//!         <xs:element name="FirstName" type="xs:string"/>
//!         <xs:element name="Age" type="xs:int" minOccurs="0"/>
//!       </xs:sequence>
//!       <xs:attribute name="id" type="xs:string"/>
//!     </xs:complexType>
//!   </xs:element>
//! </xs:schema>"#)?;
//!
//! let data = json!({"id": "7", "FirstName": "Ada", "Age": 36});
//! let xml = build(&schema, &data, &BuildOptions::new().with_xml_decl(false))?;
//! assert_eq!(xml, r#"<Person id="7"><FirstName>Ada</FirstName><Age>36</Age></Person>"#);
//! assert_eq!(parse(&schema, &xml)?, data);
//! # Ok::<(), xsd_bind::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Names and documents
pub mod names;
pub mod namespaces;
pub mod documents;

// Schema model and composition
pub mod model;
pub mod resolve;
pub mod walker;

// Data conversion
pub mod converters;
pub mod infer;

// Re-exports for convenience
pub use converters::{build, parse, parse_with, BuildOptions, ParseOptions};
pub use error::{ComponentKind, Error, FieldPath, Result};
pub use infer::{infer_complex_type, infer_element, infer_schema, Shape};
pub use limits::Limits;
pub use model::{parse_xsd, write_xsd, Schema};
pub use resolve::{link_schema, resolve_all_schema};
pub use walker::{walk_attributes, walk_elements, Walker};

/// Version of the xsd-bind library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD 1.0 namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XSD 1.1 namespace
pub const XSD_1_1_NAMESPACE: &str = "http://www.w3.org/2009/XMLSchema";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// XML Schema instance namespace (`xsi:nil`, `xsi:type`)
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
