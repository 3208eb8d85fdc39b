//! Postman API sync for Postman Forge
//!
//! Publishes the combined collection to a Postman workspace, updating an
//! existing collection when its UID is known and creating one otherwise.
//!
//! # Examples
//!
//! ```no_run
//! use postman_forge_sync::{run_sync, PostmanClient, SyncSettings};
//! use std::path::Path;
//!
//! let settings = SyncSettings::new(
//!     std::env::var("POSTMAN_API_KEY").ok(),
//!     std::env::var("POSTMAN_COLLECTION_UID").ok(),
//!     std::env::var("POSTMAN_WORKSPACE_ID").ok(),
//! );
//! let outcome = run_sync(
//!     &settings,
//!     |key| PostmanClient::new("https://api.getpostman.com", key),
//!     Path::new("./output/combined-collection.json"),
//! )
//! .expect("Sync failed");
//!
//! println!("Synced {} ({:?})", outcome.name, outcome.uid);
//! ```

mod client;
mod sync;

pub use client::{ApiResponse, CollectionApi, PostmanClient, ResponseBody};
pub use sync::{
    collection_info, run_info, run_sync, sync_collection, CollectionListing, RemoteCollection,
    SyncAction, SyncOutcome, SyncSettings, WorkspaceCheck,
};
