//! OpenAPI spec file parser

use super::converter::{convert_openapi_to_collection, ConversionOptions};
use super::types::OpenApiSpec;
use postman_forge_common::{Collection, ForgeError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// OpenAPI specification parser
///
/// Reads OpenAPI 3.x documents in YAML or JSON form and converts them into
/// Postman collections.
pub struct OpenApiParser {
    /// Loaded OpenAPI spec
    spec: OpenApiSpec,

    /// Service the document belongs to (e.g., "Auth")
    service_name: String,
}

impl OpenApiParser {
    /// Load OpenAPI spec from file path
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = OpenApiParser::from_file("./input/auth-api.yml", "Auth")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P, service_name: &str) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForgeError::NotFound(path.to_path_buf()));
        }

        debug!(path = %path.display(), service = service_name, "Reading OpenAPI document");
        let content = fs::read_to_string(path)?;
        Self::from_str(&content, service_name)
    }

    /// Parse OpenAPI spec from a YAML or JSON string
    pub fn from_str(content: &str, service_name: &str) -> Result<Self> {
        // JSON is a subset of YAML, so one deserializer covers both
        let spec: OpenApiSpec = serde_yaml::from_str(content).map_err(|e| {
            ForgeError::conversion(
                service_name,
                format!("Failed to parse OpenAPI document: {}", e),
            )
        })?;

        if !spec.openapi.starts_with("3.") {
            return Err(ForgeError::conversion(
                service_name,
                format!("Unsupported OpenAPI version {}", spec.openapi),
            ));
        }

        Ok(Self {
            spec,
            service_name: service_name.to_string(),
        })
    }

    /// Convert the spec into a Postman collection
    pub fn convert(&self, options: &ConversionOptions) -> Result<Collection> {
        convert_openapi_to_collection(&self.spec, &self.service_name, options)
    }

    /// Get reference to the underlying OpenAPI spec
    pub fn spec(&self) -> &OpenApiSpec {
        &self.spec
    }
}
