//! Read-only structural checks over generated collections
//!
//! Checks return report values; nothing here prints. The CLI and the
//! Markdown renderer in `report` decide how a report is shown.

use crate::normalize::versioned_prefix;
use postman_forge_common::{Collection, PipelineConfig, BASE_URL_KEY};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Non-fatal finding attached to a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// No `baseUrl` variable
    BaseUrlMissing,
    /// `baseUrl` differs from the configured origin
    BaseUrlMismatch { expected: String, found: String },
    /// Endpoint URL lacks the versioned service prefix
    UnexpectedUrl { endpoint: String, expected: String },
    /// The collection has no `item` list
    NoEndpoints,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::BaseUrlMissing => write!(f, "baseUrl variable not found"),
            ValidationWarning::BaseUrlMismatch { expected, found } => {
                write!(f, "Expected baseUrl: {}, found: {}", expected, found)
            }
            ValidationWarning::UnexpectedUrl { endpoint, expected } => {
                write!(f, "{}: expected URL to contain {}", endpoint, expected)
            }
            ValidationWarning::NoEndpoints => write!(f, "No endpoints found"),
        }
    }
}

/// One request endpoint as seen by the validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointCheck {
    pub name: String,
    pub method: Option<String>,
    pub url: String,
    /// URL contains `{{baseUrl}}/v1/<service>`
    pub url_ok: bool,
}

/// Result of checking one per-service collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceReport {
    pub service: String,
    /// File the collection was read from, when checked from disk
    pub source: Option<String>,
    pub collection_name: Option<String>,
    pub schema: Option<String>,
    pub base_url: Option<String>,
    /// Top-level item count; the pass criterion
    pub item_count: usize,
    pub endpoints: Vec<EndpointCheck>,
    pub warnings: Vec<ValidationWarning>,
    /// Load failure that prevented the check
    pub error: Option<String>,
    pub passed: bool,
}

impl ServiceReport {
    fn failed(service: &str, source: &Path, error: String) -> Self {
        Self {
            service: service.to_string(),
            source: Some(source.display().to_string()),
            collection_name: None,
            schema: None,
            base_url: None,
            item_count: 0,
            endpoints: Vec::new(),
            warnings: Vec::new(),
            error: Some(error),
            passed: false,
        }
    }
}

/// One top-level folder of the combined collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderSummary {
    pub name: String,
    /// Names of the folder's direct children
    pub endpoints: Vec<String>,
}

/// Result of checking the combined collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedReport {
    pub source: Option<String>,
    pub collection_name: Option<String>,
    pub base_url: Option<String>,
    pub folders: Vec<FolderSummary>,
    pub total_endpoints: usize,
    pub error: Option<String>,
    pub passed: bool,
}

/// Every per-service report plus the combined report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub services: Vec<ServiceReport>,
    pub combined: CombinedReport,
    /// All per-service checks and the combined check passed
    pub passed: bool,
}

impl ValidationSummary {
    pub fn new(services: Vec<ServiceReport>, combined: CombinedReport) -> Self {
        let passed = services.iter().all(|s| s.passed) && combined.passed;
        Self {
            services,
            combined,
            passed,
        }
    }
}

/// Check a per-service collection
///
/// Passes iff the top-level `item` list exists and is non-empty. A missing or
/// unexpected `baseUrl` and endpoints outside `{{baseUrl}}/v1/<service>` only
/// produce warnings.
pub fn validate_service(
    collection: &Collection,
    service_name: &str,
    expected_base_url: &str,
) -> ServiceReport {
    let mut warnings = Vec::new();

    let base_url = collection.variable(BASE_URL_KEY).map(|v| {
        v.value_str()
            .map(str::to_string)
            .unwrap_or_else(|| v.value.to_string())
    });
    match &base_url {
        None => warnings.push(ValidationWarning::BaseUrlMissing),
        Some(found) if found != expected_base_url => {
            warnings.push(ValidationWarning::BaseUrlMismatch {
                expected: expected_base_url.to_string(),
                found: found.clone(),
            })
        }
        Some(_) => {}
    }

    if collection.item.is_none() {
        warnings.push(ValidationWarning::NoEndpoints);
    }

    let expected = versioned_prefix(service_name);
    let mut endpoints = Vec::new();
    for item in collection.requests() {
        let Some(request) = item.request.as_ref() else {
            continue;
        };
        let Some(url) = request.url.as_ref() else {
            continue;
        };

        let name = item.display_name("Unnamed endpoint").to_string();
        let url = url.as_display().to_string();
        let url_ok = url.contains(&expected);
        if !url_ok {
            warnings.push(ValidationWarning::UnexpectedUrl {
                endpoint: name.clone(),
                expected: expected.clone(),
            });
        }

        endpoints.push(EndpointCheck {
            name,
            method: request.method.clone(),
            url,
            url_ok,
        });
    }

    let item_count = collection.items().len();
    debug!(
        service = service_name,
        item_count,
        warnings = warnings.len(),
        "Validated service collection"
    );

    ServiceReport {
        service: service_name.to_string(),
        source: None,
        collection_name: Some(collection.info.name.clone()),
        schema: collection.info.schema.clone(),
        base_url,
        item_count,
        endpoints,
        warnings,
        error: None,
        passed: item_count > 0,
    }
}

/// Check the combined collection
///
/// Passes iff the children of all top-level folders add up to more than zero.
pub fn validate_combined(collection: &Collection) -> CombinedReport {
    let folders: Vec<FolderSummary> = collection
        .items()
        .iter()
        .map(|folder| FolderSummary {
            name: folder.display_name("Unnamed folder").to_string(),
            endpoints: folder
                .item
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .map(|child| child.display_name("Unnamed endpoint").to_string())
                .collect(),
        })
        .collect();

    let total_endpoints = folders.iter().map(|f| f.endpoints.len()).sum();

    CombinedReport {
        source: None,
        collection_name: Some(collection.info.name.clone()),
        base_url: collection
            .variable(BASE_URL_KEY)
            .and_then(|v| v.value_str())
            .map(str::to_string),
        folders,
        total_endpoints,
        error: None,
        passed: collection.item.is_some() && total_endpoints > 0,
    }
}

/// Load and check a per-service collection file; load errors fail the report
pub fn validate_service_file(
    path: &Path,
    service_name: &str,
    expected_base_url: &str,
) -> ServiceReport {
    match Collection::from_file(path) {
        Ok(collection) => {
            let mut report = validate_service(&collection, service_name, expected_base_url);
            report.source = Some(path.display().to_string());
            report
        }
        Err(e) => {
            warn!(service = service_name, error = %e, "Could not validate service collection");
            ServiceReport::failed(service_name, path, e.to_string())
        }
    }
}

/// Load and check the combined collection file; load errors fail the report
pub fn validate_combined_file(path: &Path) -> CombinedReport {
    match Collection::from_file(path) {
        Ok(collection) => {
            let mut report = validate_combined(&collection);
            report.source = Some(path.display().to_string());
            report
        }
        Err(e) => {
            warn!(error = %e, "Could not validate combined collection");
            CombinedReport {
                source: Some(path.display().to_string()),
                collection_name: None,
                base_url: None,
                folders: Vec::new(),
                total_endpoints: 0,
                error: Some(e.to_string()),
                passed: false,
            }
        }
    }
}

/// Check every configured service output and the combined output
pub fn validate_outputs(config: &PipelineConfig) -> ValidationSummary {
    let services = config
        .services
        .iter()
        .map(|s| validate_service_file(&s.output, &s.name, &config.base_url))
        .collect();
    let combined = validate_combined_file(&config.combined.output);
    ValidationSummary::new(services, combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use postman_forge_common::{Item, Request, RequestUrl, Variable};

    const ORIGIN: &str = "https://api.saasus.io";

    fn endpoint(name: &str, url: &str) -> Item {
        Item::request(
            name,
            Request {
                method: Some("GET".to_string()),
                url: Some(RequestUrl::Text(url.to_string())),
                ..Default::default()
            },
        )
    }

    fn service_collection(items: Option<Vec<Item>>, base_url: Option<&str>) -> Collection {
        Collection {
            variable: base_url.map(|b| vec![Variable::string(BASE_URL_KEY, b)]),
            item: items,
            ..Default::default()
        }
    }

    #[test]
    fn test_well_formed_service_passes_without_warnings() {
        let collection = service_collection(
            Some(vec![endpoint("list", "{{baseUrl}}/v1/auth/users")]),
            Some(ORIGIN),
        );
        let report = validate_service(&collection, "Auth", ORIGIN);

        assert!(report.passed);
        assert!(report.warnings.is_empty());
        assert_eq!(report.item_count, 1);
        assert_eq!(report.endpoints[0].method.as_deref(), Some("GET"));
        assert!(report.endpoints[0].url_ok);
    }

    #[test]
    fn test_empty_item_list_fails() {
        let collection = service_collection(Some(Vec::new()), Some(ORIGIN));
        let report = validate_service(&collection, "Auth", ORIGIN);
        assert!(!report.passed);

        let collection = service_collection(None, Some(ORIGIN));
        let report = validate_service(&collection, "Auth", ORIGIN);
        assert!(!report.passed);
        assert!(report.warnings.contains(&ValidationWarning::NoEndpoints));
    }

    #[test]
    fn test_missing_base_url_warns_but_passes() {
        let collection =
            service_collection(Some(vec![endpoint("list", "{{baseUrl}}/v1/auth/x")]), None);
        let report = validate_service(&collection, "Auth", ORIGIN);

        assert!(report.passed);
        assert_eq!(report.warnings, vec![ValidationWarning::BaseUrlMissing]);
    }

    #[test]
    fn test_base_url_mismatch_and_bad_urls_warn() {
        let collection = service_collection(
            Some(vec![
                endpoint("good", "{{baseUrl}}/v1/pricing/plans"),
                endpoint("bad", "{{baseUrl}}/plans"),
            ]),
            Some("https://other.example.com"),
        );
        let report = validate_service(&collection, "Pricing", ORIGIN);

        assert!(report.passed);
        assert_eq!(
            report.warnings,
            vec![
                ValidationWarning::BaseUrlMismatch {
                    expected: ORIGIN.to_string(),
                    found: "https://other.example.com".to_string(),
                },
                ValidationWarning::UnexpectedUrl {
                    endpoint: "bad".to_string(),
                    expected: "{{baseUrl}}/v1/pricing".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_nested_endpoints_are_checked() {
        let collection = service_collection(
            Some(vec![Item::folder("users", None, vec![endpoint("deep", "{{baseUrl}}/users")])]),
            Some(ORIGIN),
        );
        let report = validate_service(&collection, "Auth", ORIGIN);

        assert!(report.passed);
        assert_eq!(report.endpoints.len(), 1);
        assert!(!report.endpoints[0].url_ok);
    }

    #[test]
    fn test_combined_counts_folder_children() {
        let combined = Collection {
            item: Some(vec![
                Item::folder("Auth", None, vec![endpoint("a", "u"), endpoint("b", "u")]),
                Item::folder("Pricing", None, Vec::new()),
            ]),
            ..Default::default()
        };
        let report = validate_combined(&combined);
        assert!(report.passed);
        assert_eq!(report.total_endpoints, 2);
        assert_eq!(report.folders[0].endpoints, vec!["a", "b"]);

        let empty = Collection {
            item: Some(vec![Item::folder("Auth", None, Vec::new())]),
            ..Default::default()
        };
        assert!(!validate_combined(&empty).passed);
        assert!(!validate_combined(&Collection::default()).passed);
    }

    #[test]
    fn test_missing_file_fails_report_instead_of_erroring() {
        let report = validate_service_file(Path::new("/nonexistent/auth.json"), "Auth", ORIGIN);
        assert!(!report.passed);
        assert!(report.error.as_deref().unwrap().contains("File not found"));

        let combined = validate_combined_file(Path::new("/nonexistent/combined.json"));
        assert!(!combined.passed);

        let summary = ValidationSummary::new(vec![report], combined);
        assert!(!summary.passed);
    }
}
