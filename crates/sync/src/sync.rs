//! Publishing the combined collection to a Postman workspace

use crate::client::{ApiResponse, CollectionApi};
use postman_forge_common::{Collection, ForgeError, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Credentials and identifiers for a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSettings {
    pub api_key: Option<String>,
    /// Existing collection to update in place
    pub collection_uid: Option<String>,
    /// Workspace to check, list, and create collections in
    pub workspace_id: Option<String>,
}

impl SyncSettings {
    /// Build settings; empty strings count as unset
    pub fn new(
        api_key: Option<String>,
        collection_uid: Option<String>,
        workspace_id: Option<String>,
    ) -> Self {
        fn non_empty(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Self {
            api_key: non_empty(api_key),
            collection_uid: non_empty(collection_uid),
            workspace_id: non_empty(workspace_id),
        }
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            ForgeError::MissingConfiguration(
                "POSTMAN_API_KEY is required to talk to the Postman API".to_string(),
            )
        })
    }
}

/// How the remote collection was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Updated,
    Created,
}

/// Result of the workspace pre-check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceCheck {
    NotConfigured,
    Found { name: Option<String> },
    /// Non-200 status; the sync continues regardless
    Failed { status: u16 },
}

/// Summary of a completed sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub action: SyncAction,
    pub name: String,
    /// Server-assigned collection UID, when the response carried one
    pub uid: Option<String>,
    pub workspace: WorkspaceCheck,
    /// No UID was configured, so the operator should save this one for
    /// future updates
    pub persist_hint: bool,
}

/// One entry of a workspace collection listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCollection {
    pub name: String,
    pub uid: String,
}

/// Result of an info request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionListing {
    Listed(Vec<RemoteCollection>),
    /// No workspace id configured, nothing to list
    NoWorkspace,
}

/// Update or create the remote copy of `collection`
///
/// With a configured UID the collection is updated in place; a 404 falls back
/// to creating it. Creation needs a workspace id.
pub fn sync_collection<A: CollectionApi>(
    api: &A,
    settings: &SyncSettings,
    mut collection: Collection,
) -> Result<SyncOutcome> {
    info!(collection = %collection.info.name, "Starting Postman synchronization");

    let workspace = check_workspace(api, settings)?;

    let (action, response) = match settings.collection_uid.as_deref() {
        Some(uid) => {
            info!(uid, "Updating existing collection");
            collection.info.postman_id = Some(uid.to_string());

            let response = api.update_collection(uid, &collection)?;
            match response.status {
                200 => (SyncAction::Updated, response),
                404 => {
                    warn!(uid, "Collection not found, creating a new one");
                    (SyncAction::Created, create(api, settings, &collection)?)
                }
                _ => return Err(response.into_error()),
            }
        }
        None => (SyncAction::Created, create(api, settings, &collection)?),
    };

    let remote = response.body.json().and_then(|body| body.get("collection"));
    let name = remote
        .and_then(|c| c.get("name").or_else(|| c.pointer("/info/name")))
        .and_then(Value::as_str)
        .unwrap_or(&collection.info.name)
        .to_string();
    let uid = remote
        .and_then(|c| c.get("uid").or_else(|| c.pointer("/info/_postman_id")))
        .and_then(Value::as_str)
        .map(str::to_string);

    info!(
        name = %name,
        uid = uid.as_deref().unwrap_or(""),
        ?action,
        "Synchronization completed"
    );

    Ok(SyncOutcome {
        action,
        name,
        uid,
        workspace,
        persist_hint: settings.collection_uid.is_none(),
    })
}

fn check_workspace<A: CollectionApi>(api: &A, settings: &SyncSettings) -> Result<WorkspaceCheck> {
    let Some(workspace_id) = settings.workspace_id.as_deref() else {
        return Ok(WorkspaceCheck::NotConfigured);
    };

    let response = api.get_workspace(workspace_id)?;
    if response.status == 200 {
        let name = response
            .body
            .json()
            .and_then(|body| body.pointer("/workspace/name"))
            .and_then(Value::as_str)
            .map(str::to_string);
        info!(workspace = name.as_deref().unwrap_or(workspace_id), "Workspace found");
        Ok(WorkspaceCheck::Found { name })
    } else {
        warn!(status = response.status, "Workspace check failed");
        Ok(WorkspaceCheck::Failed {
            status: response.status,
        })
    }
}

fn create<A: CollectionApi>(
    api: &A,
    settings: &SyncSettings,
    collection: &Collection,
) -> Result<ApiResponse> {
    let workspace_id = settings.workspace_id.as_deref().ok_or_else(|| {
        ForgeError::MissingConfiguration(
            "POSTMAN_WORKSPACE_ID is required for creating new collections".to_string(),
        )
    })?;

    info!(workspace_id, "Creating new collection");
    let response = api.create_collection(collection, workspace_id)?;
    match response.status {
        200 | 201 => Ok(response),
        _ => Err(response.into_error()),
    }
}

/// List the collections of the configured workspace
pub fn collection_info<A: CollectionApi>(
    api: &A,
    settings: &SyncSettings,
) -> Result<CollectionListing> {
    let Some(workspace_id) = settings.workspace_id.as_deref() else {
        return Ok(CollectionListing::NoWorkspace);
    };

    let response = api.list_collections(workspace_id)?;
    if response.status != 200 {
        return Err(response.into_error());
    }

    let collections = response
        .body
        .json()
        .and_then(|body| body.get("collections"))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|entry| {
                    let field = |key: &str| {
                        entry
                            .get(key)
                            .and_then(Value::as_str)
                            .unwrap_or("")
                            .to_string()
                    };
                    RemoteCollection {
                        name: field("name"),
                        uid: field("uid"),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(CollectionListing::Listed(collections))
}

/// Load the collection at `collection_path` and sync it
///
/// The API key is checked before `make_client` runs or the file is read.
pub fn run_sync<A, F>(
    settings: &SyncSettings,
    make_client: F,
    collection_path: &Path,
) -> Result<SyncOutcome>
where
    A: CollectionApi,
    F: FnOnce(&str) -> Result<A>,
{
    let api_key = settings.require_api_key()?;
    let api = make_client(api_key)?;
    let collection = Collection::from_file(collection_path)?;
    sync_collection(&api, settings, collection)
}

/// List workspace collections; the API key is checked first
pub fn run_info<A, F>(settings: &SyncSettings, make_client: F) -> Result<CollectionListing>
where
    A: CollectionApi,
    F: FnOnce(&str) -> Result<A>,
{
    let api_key = settings.require_api_key()?;
    let api = make_client(api_key)?;
    collection_info(&api, settings)
}
