//! Schema composition
//!
//! Linking attaches the targets of composition directives, lookup finds
//! named components across the linked graph and flattening collapses the
//! graph into a single schema.

pub mod flatten;
pub mod linker;
pub mod lookup;

pub use flatten::resolve_all_schema;
pub use linker::{link_schema, location_stem};
pub use lookup::{all_elements, find, find_ref, substitutes, Component, Found};
