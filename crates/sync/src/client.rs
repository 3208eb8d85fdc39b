//! Postman REST API client

use postman_forge_common::{Collection, ForgeError, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Response body: parsed JSON, or the raw text when it is not JSON
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    fn from_text(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(text),
        }
    }

    pub fn json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{}", value),
            ResponseBody::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: ResponseBody::Json(body),
        }
    }

    /// Convert into a `RemoteRequestFailed` error
    pub fn into_error(self) -> ForgeError {
        ForgeError::RemoteRequestFailed {
            status: self.status,
            body: self.body.to_string(),
        }
    }
}

/// `{collection: ...}` request body
#[derive(Serialize)]
struct CollectionEnvelope<'a> {
    collection: &'a Collection,
}

/// Remote collection operations
///
/// Every method returns the response whatever its status; only transport
/// failures are errors. Callers decide which statuses are acceptable.
pub trait CollectionApi {
    /// `GET /collections?workspace=<id>`
    fn list_collections(&self, workspace_id: &str) -> Result<ApiResponse>;

    /// `GET /collections/<uid>`
    fn get_collection(&self, uid: &str) -> Result<ApiResponse>;

    /// `PUT /collections/<uid>` with `{collection: ...}`
    fn update_collection(&self, uid: &str, collection: &Collection) -> Result<ApiResponse>;

    /// `POST /collections?workspace=<id>` with `{collection: ...}`
    fn create_collection(&self, collection: &Collection, workspace_id: &str) -> Result<ApiResponse>;

    /// `GET /workspaces/<id>`
    fn get_workspace(&self, workspace_id: &str) -> Result<ApiResponse>;
}

/// Blocking client for the Postman API, authenticated with an API key
pub struct PostmanClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl PostmanClient {
    pub fn new(api_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| ForgeError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn build_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_url, path);
        self.client
            .request(method, &url)
            .header("X-API-Key", &self.api_key)
            .header("Content-Type", "application/json")
    }

    fn send(&self, request: RequestBuilder) -> Result<ApiResponse> {
        let response = request
            .send()
            .map_err(|e| ForgeError::Transport(format!("Failed to send request: {}", e)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|e| ForgeError::Transport(format!("Failed to read response: {}", e)))?;
        debug!(status, bytes = text.len(), "Postman API response");

        Ok(ApiResponse {
            status,
            body: ResponseBody::from_text(text),
        })
    }
}

impl CollectionApi for PostmanClient {
    fn list_collections(&self, workspace_id: &str) -> Result<ApiResponse> {
        self.send(
            self.build_request(Method::GET, "/collections")
                .query(&[("workspace", workspace_id)]),
        )
    }

    fn get_collection(&self, uid: &str) -> Result<ApiResponse> {
        self.send(self.build_request(Method::GET, &format!("/collections/{}", uid)))
    }

    fn update_collection(&self, uid: &str, collection: &Collection) -> Result<ApiResponse> {
        self.send(
            self.build_request(Method::PUT, &format!("/collections/{}", uid))
                .json(&CollectionEnvelope { collection }),
        )
    }

    fn create_collection(
        &self,
        collection: &Collection,
        workspace_id: &str,
    ) -> Result<ApiResponse> {
        self.send(
            self.build_request(Method::POST, "/collections")
                .query(&[("workspace", workspace_id)])
                .json(&CollectionEnvelope { collection }),
        )
    }

    fn get_workspace(&self, workspace_id: &str) -> Result<ApiResponse> {
        self.send(self.build_request(Method::GET, &format!("/workspaces/{}", workspace_id)))
    }
}
