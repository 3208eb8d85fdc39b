//! Post-processing of converted Postman collections
//!
//! This crate takes raw converter output and turns it into the published
//! documents:
//! - URL normalization onto `{{baseUrl}}/v1/<service>`
//! - Merging per-service collections into one folder-per-service collection
//! - Structural validation with console-neutral reports
//! - Markdown rendering of validation reports

pub mod combine;
pub mod normalize;
pub mod pipeline;
pub mod report;
mod templates;
pub mod validate;

pub use combine::{combine_collections, CombineSummary, CombinedCollection, ServiceCollection};
pub use normalize::{normalize_collection, versioned_prefix, API_VERSION_SEGMENT};
pub use pipeline::{
    all_succeeded, combine_outputs, convert_all, convert_service, ConvertedService, ServiceOutcome,
};
pub use report::{render_markdown, write_markdown};
pub use validate::{
    validate_combined, validate_combined_file, validate_outputs, validate_service,
    validate_service_file, CombinedReport, EndpointCheck, FolderSummary, ServiceReport,
    ValidationSummary, ValidationWarning,
};
