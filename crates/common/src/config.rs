//! Pipeline configuration loading from YAML files
//!
//! Every origin, path, and collection name used by the pipeline lives here
//! instead of being inlined at the call sites. `PipelineConfig::default()`
//! describes the stock two-service (Auth, Pricing) setup.

use crate::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Postman collection format v2.1.0 schema URL
pub const POSTMAN_SCHEMA_V2_1: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Origin every `baseUrl` variable is pinned to
    pub base_url: String,
    /// Collection format schema URL written into generated documents
    pub schema: String,
    /// How converted requests are grouped into folders
    pub folder_strategy: FolderStrategy,
    /// Services to convert, in folder order for the combined collection
    pub services: Vec<ServiceConfig>,
    /// Combined collection settings
    pub combined: CombinedConfig,
    /// Remote collection API settings
    pub remote: RemoteConfig,
}

/// One service: an OpenAPI input and its converted collection output
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Display name; lowercased it becomes the `/v1/<service>` path segment
    pub name: String,
    /// OpenAPI document (YAML or JSON)
    pub input: PathBuf,
    /// Converted collection JSON
    pub output: PathBuf,
    /// Folder description in the combined collection
    #[serde(default)]
    pub description: Option<String>,
}

impl ServiceConfig {
    pub fn new(name: &str, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            input: input.into(),
            output: output.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Folder description, defaulting to "<name> API endpoints"
    pub fn folder_description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("{} API endpoints", self.name))
    }
}

/// Combined collection settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CombinedConfig {
    pub name: String,
    pub description: String,
    pub output: PathBuf,
}

impl Default for CombinedConfig {
    fn default() -> Self {
        Self {
            name: "SaaSus API".to_string(),
            description: "Combined SaaSus API Collection".to_string(),
            output: PathBuf::from("./output/combined-collection.json"),
        }
    }
}

/// Remote collection API settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// REST API origin
    pub api_url: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.getpostman.com".to_string(),
        }
    }
}

/// Folder grouping applied by the OpenAPI converter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderStrategy {
    /// Folder per shared path segment
    #[default]
    Paths,
    /// Folder per first operation tag
    Tags,
    /// No folders
    Flat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.saasus.io".to_string(),
            schema: POSTMAN_SCHEMA_V2_1.to_string(),
            folder_strategy: FolderStrategy::default(),
            services: vec![
                ServiceConfig::new("Auth", "./input/auth-api.yml", "./output/auth.json")
                    .with_description("SaaSus Auth API endpoints"),
                ServiceConfig::new(
                    "Pricing",
                    "./input/pricing-api.yml",
                    "./output/pricing.json",
                )
                .with_description("SaaSus Pricing API endpoints"),
            ],
            combined: CombinedConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file; absent keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ForgeError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content, &path.display().to_string())
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str, source_name: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ForgeError::malformed(source_name, e))?;
        config.validate(source_name)?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self, source_name: &str) -> Result<()> {
        if self.services.is_empty() {
            return Err(ForgeError::malformed(
                source_name,
                "at least one service must be configured",
            ));
        }

        let mut seen = HashSet::new();
        for service in &self.services {
            if service.name.trim().is_empty() {
                return Err(ForgeError::malformed(source_name, "service name is empty"));
            }
            if !seen.insert(service.name.to_lowercase()) {
                return Err(ForgeError::malformed(
                    source_name,
                    format!("duplicate service name: {}", service.name),
                ));
            }
        }

        Ok(())
    }

    /// Look up a service by name, case-insensitively
    pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services
            .iter()
            .find(|s| s.name.to_lowercase() == name.to_lowercase())
    }
}
