//! OpenAPI 3.x specification parser
//!
//! Parses OpenAPI 3.0/3.1 documents (YAML or JSON) and converts them into
//! Postman collections: one request item per operation, grouped into folders
//! by path segment or tag, with example bodies and saved responses.
//!
//! ## Usage
//! ```rust,ignore
//! use postman_forge_parser::openapi::{ConversionOptions, OpenApiParser};
//!
//! let parser = OpenApiParser::from_file("./input/auth-api.yml", "Auth")?;
//! let collection = parser.convert(&ConversionOptions::default())?;
//! ```

mod converter;
mod example;
mod parser;
mod types;

pub use converter::{convert_openapi_to_collection, ConversionOptions};
pub use example::ExampleBuilder;
pub use parser::OpenApiParser;
pub use types::*;
