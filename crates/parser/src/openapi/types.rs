//! OpenAPI 3.x type definitions
//!
//! Simplified representation focusing on what a request collection needs.
//! Maps are `IndexMap`s so paths, responses, and properties keep document
//! order.

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Prefix of local schema references
const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
const PARAMETER_REF_PREFIX: &str = "#/components/parameters/";
const REQUEST_BODY_REF_PREFIX: &str = "#/components/requestBodies/";
const RESPONSE_REF_PREFIX: &str = "#/components/responses/";

/// Accept unquoted YAML numbers (`version: 1.0`) where a string is expected
fn scalar_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(de::Error::custom(format!("expected a string, found {}", other))),
    }
}

/// Upper bound on `$ref` → `$ref` hops when resolving non-schema objects
const MAX_REF_HOPS: usize = 16;

/// OpenAPI document root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiSpec {
    /// OpenAPI version (e.g., "3.0.3")
    #[serde(deserialize_with = "scalar_string")]
    pub openapi: String,

    /// API metadata
    pub info: Info,

    /// Servers
    #[serde(default)]
    pub servers: Vec<Server>,

    /// API paths (endpoints)
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    /// Reusable components
    #[serde(default)]
    pub components: Option<Components>,

    /// Tag descriptions
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// API information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,

    /// API version
    #[serde(default, deserialize_with = "scalar_string")]
    pub version: String,

    /// API description
    #[serde(default)]
    pub description: Option<String>,
}

/// Server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    /// Server URL, possibly templated (`https://{region}.example.com`)
    pub url: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub variables: IndexMap<String, ServerVariable>,
}

/// Substitution variable of a templated server URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerVariable {
    pub default: String,

    #[serde(rename = "enum", default)]
    pub enum_values: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Top-level tag declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// A `$ref` or an inline object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceOr<T> {
    /// Reference to a component; tried first since inline schemas accept any
    /// object
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },

    /// Inline object
    Item(T),
}

/// Path item (operations for a path)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub get: Option<Operation>,

    #[serde(default)]
    pub put: Option<Operation>,

    #[serde(default)]
    pub post: Option<Operation>,

    #[serde(default)]
    pub delete: Option<Operation>,

    #[serde(default)]
    pub options: Option<Operation>,

    #[serde(default)]
    pub head: Option<Operation>,

    #[serde(default)]
    pub patch: Option<Operation>,

    #[serde(default)]
    pub trace: Option<Operation>,

    /// Parameters shared by every operation on the path
    #[serde(default)]
    pub parameters: Vec<ReferenceOr<Parameter>>,
}

impl PathItem {
    /// Defined operations with their uppercase HTTP method
    pub fn operations(&self) -> Vec<(&'static str, &Operation)> {
        [
            ("GET", &self.get),
            ("PUT", &self.put),
            ("POST", &self.post),
            ("DELETE", &self.delete),
            ("OPTIONS", &self.options),
            ("HEAD", &self.head),
            ("PATCH", &self.patch),
            ("TRACE", &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
        .collect()
    }
}

/// HTTP operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    /// Operation ID (unique identifier)
    #[serde(rename = "operationId")]
    #[serde(default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub parameters: Vec<ReferenceOr<Parameter>>,

    #[serde(rename = "requestBody")]
    #[serde(default)]
    pub request_body: Option<ReferenceOr<RequestBody>>,

    /// Responses keyed by status code ("200", "4XX", "default")
    #[serde(default)]
    pub responses: IndexMap<String, ReferenceOr<Response>>,

    /// Tags (for grouping)
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Parameter definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    /// Location: query, header, path, cookie
    #[serde(rename = "in")]
    pub location: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub schema: Option<ReferenceOr<Schema>>,

    #[serde(default)]
    pub example: Option<Value>,
}

/// Request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub description: Option<String>,

    /// Content types
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,

    #[serde(default)]
    pub required: bool,
}

/// Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    /// Content types
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Media type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<ReferenceOr<Schema>>,

    #[serde(default)]
    pub example: Option<Value>,
}

/// Schema definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Type: a single name, or a list of names in OpenAPI 3.1
    #[serde(rename = "type")]
    #[serde(default)]
    pub schema_type: Option<Value>,

    /// Format (e.g., int32, int64, date-time)
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Properties (for object type)
    #[serde(default)]
    pub properties: IndexMap<String, ReferenceOr<Schema>>,

    #[serde(default)]
    pub required: Vec<String>,

    /// Items schema (for array type)
    #[serde(default)]
    pub items: Option<Box<ReferenceOr<Schema>>>,

    #[serde(rename = "enum")]
    #[serde(default)]
    pub enum_values: Vec<Value>,

    #[serde(default)]
    pub example: Option<Value>,

    #[serde(default)]
    pub default: Option<Value>,

    #[serde(rename = "allOf")]
    #[serde(default)]
    pub all_of: Vec<ReferenceOr<Schema>>,

    #[serde(rename = "oneOf")]
    #[serde(default)]
    pub one_of: Vec<ReferenceOr<Schema>>,

    #[serde(rename = "anyOf")]
    #[serde(default)]
    pub any_of: Vec<ReferenceOr<Schema>>,
}

impl Schema {
    /// First non-"null" type name
    pub fn primary_type(&self) -> Option<&str> {
        match self.schema_type.as_ref()? {
            Value::String(name) => Some(name.as_str()),
            Value::Array(names) => names
                .iter()
                .filter_map(Value::as_str)
                .find(|name| *name != "null"),
            _ => None,
        }
    }
}

/// Reusable components
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, ReferenceOr<Schema>>,

    #[serde(default)]
    pub parameters: IndexMap<String, ReferenceOr<Parameter>>,

    #[serde(rename = "requestBodies")]
    #[serde(default)]
    pub request_bodies: IndexMap<String, ReferenceOr<RequestBody>>,

    #[serde(default)]
    pub responses: IndexMap<String, ReferenceOr<Response>>,
}

/// Follow a chain of local references through one component table
fn resolve<'a, T>(
    mut current: &'a ReferenceOr<T>,
    prefix: &str,
    table: Option<&'a IndexMap<String, ReferenceOr<T>>>,
) -> Option<&'a T> {
    for _ in 0..MAX_REF_HOPS {
        match current {
            ReferenceOr::Item(item) => return Some(item),
            ReferenceOr::Reference { reference } => {
                let name = reference.strip_prefix(prefix)?;
                current = table?.get(name)?;
            }
        }
    }
    None
}

impl OpenApiSpec {
    /// Get a schema entry by reference path
    /// e.g., "#/components/schemas/Pet" -> the Pet entry (itself possibly a ref)
    pub fn schema_by_ref(&self, ref_path: &str) -> Option<&ReferenceOr<Schema>> {
        let schema_name = ref_path.strip_prefix(SCHEMA_REF_PREFIX)?;
        self.components.as_ref()?.schemas.get(schema_name)
    }

    pub fn resolve_parameter<'a>(
        &'a self,
        param: &'a ReferenceOr<Parameter>,
    ) -> Option<&'a Parameter> {
        resolve(
            param,
            PARAMETER_REF_PREFIX,
            self.components.as_ref().map(|c| &c.parameters),
        )
    }

    pub fn resolve_request_body<'a>(
        &'a self,
        body: &'a ReferenceOr<RequestBody>,
    ) -> Option<&'a RequestBody> {
        resolve(
            body,
            REQUEST_BODY_REF_PREFIX,
            self.components.as_ref().map(|c| &c.request_bodies),
        )
    }

    pub fn resolve_response<'a>(
        &'a self,
        response: &'a ReferenceOr<Response>,
    ) -> Option<&'a Response> {
        resolve(
            response,
            RESPONSE_REF_PREFIX,
            self.components.as_ref().map(|c| &c.responses),
        )
    }

    /// Description declared for a top-level tag
    pub fn tag_description(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .and_then(|t| t.description.as_deref())
    }

    /// First server URL with template variables replaced by their defaults
    pub fn default_server_url(&self) -> Option<String> {
        let server = self.servers.first()?;
        let mut url = server.url.clone();
        for (name, variable) in &server.variables {
            url = url.replace(&format!("{{{}}}", name), &variable.default);
        }

        if url.len() > 1 && url.ends_with('/') {
            url.pop();
        }
        Some(url)
    }
}
