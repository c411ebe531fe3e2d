//! Utility modules for docgrid-core

pub mod tokens;

pub use tokens::{
    category_line, encode_page_link, encode_reference, extract_properties,
    format_property_value, parse_page_link, parse_reference, property_line,
};
