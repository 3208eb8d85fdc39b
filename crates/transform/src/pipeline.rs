//! Conversion and merge steps driven by the pipeline configuration

use crate::combine::{combine_collections, CombineSummary, ServiceCollection};
use crate::normalize::normalize_collection;
use postman_forge_common::{Collection, PipelineConfig, Result, ServiceConfig};
use postman_forge_parser::convert_openapi_file;
use std::path::PathBuf;
use tracing::{error, info};

/// A service whose normalized collection was written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedService {
    pub service: String,
    pub output: PathBuf,
    /// Top-level items of the written collection
    pub item_count: usize,
}

/// Outcome of one service's conversion
#[derive(Debug)]
pub struct ServiceOutcome {
    pub service: String,
    pub result: Result<ConvertedService>,
}

/// Convert, normalize, and write one service's collection
pub fn convert_service(
    service: &ServiceConfig,
    config: &PipelineConfig,
) -> Result<ConvertedService> {
    info!(service = %service.name, input = %service.input.display(), "Converting service");

    let mut collection = convert_openapi_file(&service.input, &service.name, config)?;
    normalize_collection(&mut collection, &service.name, &config.base_url);
    collection.write_to_file(&service.output)?;

    let item_count = collection.items().len();
    info!(
        service = %service.name,
        output = %service.output.display(),
        item_count,
        "Service collection written"
    );

    Ok(ConvertedService {
        service: service.name.clone(),
        output: service.output.clone(),
        item_count,
    })
}

/// Convert every configured service in order
///
/// A failing service does not stop the others; each result is returned so the
/// caller can report it and decide whether to merge.
pub fn convert_all(config: &PipelineConfig) -> Vec<ServiceOutcome> {
    config
        .services
        .iter()
        .map(|service| {
            let result = convert_service(service, config);
            if let Err(e) = &result {
                error!(service = %service.name, error = %e, "Service conversion failed");
            }
            ServiceOutcome {
                service: service.name.clone(),
                result,
            }
        })
        .collect()
}

/// Whether every service converted successfully
pub fn all_succeeded(outcomes: &[ServiceOutcome]) -> bool {
    outcomes.iter().all(|o| o.result.is_ok())
}

/// Read every per-service output and write the combined collection
pub fn combine_outputs(config: &PipelineConfig) -> Result<CombineSummary> {
    let sources = config
        .services
        .iter()
        .map(|service| -> Result<ServiceCollection> {
            Ok(ServiceCollection {
                name: service.name.clone(),
                description: service.folder_description(),
                collection: Collection::from_file(&service.output)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let combined = combine_collections(sources, config);
    combined.collection.write_to_file(&config.combined.output)?;

    info!(
        output = %config.combined.output.display(),
        total = combined.summary.total,
        "Combined collection written"
    );

    Ok(combined.summary)
}
