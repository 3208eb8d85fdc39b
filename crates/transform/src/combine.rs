//! Merging per-service collections into one folder-per-service collection

use postman_forge_common::{Collection, Info, Item, PipelineConfig, Variable, BASE_URL_KEY};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// A normalized per-service collection ready to become a folder
#[derive(Debug, Clone)]
pub struct ServiceCollection {
    /// Folder name
    pub name: String,
    /// Folder description
    pub description: String,
    pub collection: Collection,
}

/// Endpoint counts of one merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombineSummary {
    /// `(service, top-level item count)` in folder order
    pub services: Vec<(String, usize)>,
    /// Children across all folders of the combined collection
    pub total: usize,
}

/// Merge result
#[derive(Debug, Clone)]
pub struct CombinedCollection {
    pub collection: Collection,
    pub summary: CombineSummary,
}

/// Build the combined collection, one folder per source in the given order
///
/// Each folder wraps its source's `item` list verbatim (empty when the source
/// had none). The result carries a single `baseUrl` variable.
pub fn combine_collections(
    sources: Vec<ServiceCollection>,
    config: &PipelineConfig,
) -> CombinedCollection {
    let mut services = Vec::with_capacity(sources.len());
    let mut folders = Vec::with_capacity(sources.len());

    for source in sources {
        let items = source.collection.item.unwrap_or_default();
        info!(service = %source.name, endpoints = items.len(), "Adding service folder");
        services.push((source.name.clone(), items.len()));
        folders.push(Item::folder(source.name, Some(source.description), items));
    }

    let total = folders.iter().map(Item::child_count).sum();
    info!(folders = folders.len(), total, "Combined collection built");

    let collection = Collection {
        info: Info {
            name: config.combined.name.clone(),
            description: Some(Value::String(config.combined.description.clone())),
            schema: Some(config.schema.clone()),
            ..Default::default()
        },
        variable: Some(vec![Variable::string(BASE_URL_KEY, &config.base_url)]),
        item: Some(folders),
        ..Default::default()
    };

    CombinedCollection {
        collection,
        summary: CombineSummary { services, total },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postman_forge_common::Request;

    fn service(name: &str, endpoints: usize) -> ServiceCollection {
        let items = (0..endpoints)
            .map(|i| Item::request(format!("{}-{}", name, i), Request::default()))
            .collect();
        ServiceCollection {
            name: name.to_string(),
            description: format!("SaaSus {} API endpoints", name),
            collection: Collection {
                item: Some(items),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_two_services_become_two_folders() {
        let config = PipelineConfig::default();
        let combined =
            combine_collections(vec![service("Auth", 3), service("Pricing", 2)], &config);

        let folders = combined.collection.items();
        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].name.as_deref(), Some("Auth"));
        assert_eq!(folders[1].name.as_deref(), Some("Pricing"));
        assert_eq!(
            folders[0].description,
            Some(Value::String("SaaSus Auth API endpoints".to_string()))
        );
        assert_eq!(folders[0].child_count(), 3);
        assert_eq!(folders[1].child_count(), 2);

        assert_eq!(
            combined.summary,
            CombineSummary {
                services: vec![("Auth".to_string(), 3), ("Pricing".to_string(), 2)],
                total: 5,
            }
        );
    }

    #[test]
    fn test_combined_metadata_and_single_base_url() {
        let config = PipelineConfig::default();
        let combined =
            combine_collections(vec![service("Auth", 1), service("Pricing", 1)], &config);
        let collection = &combined.collection;

        assert_eq!(collection.info.name, "SaaSus API");
        assert_eq!(
            collection.info.description,
            Some(Value::String("Combined SaaSus API Collection".to_string()))
        );
        assert_eq!(
            collection.info.schema.as_deref(),
            Some(config.schema.as_str())
        );

        let vars = collection.variable.as_ref().unwrap();
        assert_eq!(vars.len(), 1);
        assert_eq!(
            vars[0],
            Variable::string(BASE_URL_KEY, "https://api.saasus.io")
        );
    }

    #[test]
    fn test_source_without_items_yields_empty_folder() {
        let config = PipelineConfig::default();
        let empty = ServiceCollection {
            name: "Pricing".to_string(),
            description: "none".to_string(),
            collection: Collection::default(),
        };

        let combined = combine_collections(vec![service("Auth", 2), empty], &config);
        let folders = combined.collection.items();
        assert_eq!(folders[1].item, Some(Vec::new()));
        assert_eq!(combined.summary.total, 2);
    }

    #[test]
    fn test_folder_items_are_copied_verbatim() {
        let config = PipelineConfig::default();
        let source = service("Auth", 2);
        let expected = source.collection.item.clone().unwrap();

        let combined = combine_collections(vec![source], &config);
        assert_eq!(
            combined.collection.items()[0].item.as_ref().unwrap(),
            &expected
        );
    }
}
