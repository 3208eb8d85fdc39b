//! Common types and utilities for Postman Forge
//!
//! This crate contains the collection document model, the error type, and the
//! pipeline configuration shared by the parser, transform, sync, and CLI
//! components.

pub mod collection;
pub mod config;

pub use collection::{
    Collection, Info, Item, KeyValue, Request, RequestUrl, UrlObject, UrlParts, UrlSegment,
    Variable, BASE_URL_KEY, BASE_URL_PLACEHOLDER,
};
pub use config::{
    CombinedConfig, FolderStrategy, PipelineConfig, RemoteConfig, ServiceConfig,
    POSTMAN_SCHEMA_V2_1,
};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur anywhere in the conversion, merge, validation, and
/// sync pipeline
#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Malformed input in {source_name}: {message}")]
    MalformedInput {
        source_name: String,
        message: String,
    },

    #[error("Conversion failed for {service}: {reason}")]
    UpstreamConversionFailed { service: String, reason: String },

    #[error("Remote request failed with status {status}: {body}")]
    RemoteRequestFailed { status: u16, body: String },

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ForgeError {
    /// Build a `MalformedInput` error for a named source
    pub fn malformed(source_name: impl Into<String>, message: impl ToString) -> Self {
        ForgeError::MalformedInput {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Build an `UpstreamConversionFailed` error for a service
    pub fn conversion(service: impl Into<String>, reason: impl ToString) -> Self {
        ForgeError::UpstreamConversionFailed {
            service: service.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for forge operations
pub type Result<T> = std::result::Result<T, ForgeError>;
