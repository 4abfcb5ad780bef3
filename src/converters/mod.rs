//! Schema-driven converters
//!
//! Structural data (`serde_json::Value`) to XML and back, driven purely by
//! a parsed [`Schema`](crate::model::Schema):
//!
//! - [`build`]: data to XML text
//! - [`parse`] / [`parse_with`]: XML text to data
//!
//! Data keys are local names. Text content of complex elements is kept
//! under [`TEXT_KEY`].

mod base;
mod decoder;
mod encoder;
mod naming;
mod values;

pub use base::{BuildOptions, ParseOptions};
pub use decoder::{parse, parse_with};
pub use encoder::build;
pub use naming::{attribute_name, element_name, global_element_name, WireName};
pub use values::{coerce_value, format_value};
pub(crate) use values::is_integer_text;

/// Data key holding simple content or mixed text
pub const TEXT_KEY: &str = "$value";
