//! OpenAPI parsing and conversion for Postman Forge
//!
//! This crate turns OpenAPI service specifications into Postman collection
//! documents (`Collection`). The output is the raw converter result: URLs are
//! rooted at `{{baseUrl}}` and the collection is named after the API title.
//! Service-specific rewriting happens afterwards in the transform crate.

pub mod openapi;

pub use openapi::{ConversionOptions, OpenApiParser};

use postman_forge_common::{Collection, PipelineConfig, Result};
use std::path::Path;

/// Load an OpenAPI file and convert it with the pipeline's settings
///
/// # Arguments
/// * `path` - OpenAPI document (YAML or JSON)
/// * `service_name` - Service the document belongs to, used in errors
/// * `config` - Pipeline configuration supplying schema and folder strategy
pub fn convert_openapi_file(
    path: &Path,
    service_name: &str,
    config: &PipelineConfig,
) -> Result<Collection> {
    let parser = OpenApiParser::from_file(path, service_name)?;
    parser.convert(&ConversionOptions {
        schema: config.schema.clone(),
        folder_strategy: config.folder_strategy,
    })
}
