//! Postman collection document model
//!
//! The model keeps the fields the pipeline reads or rewrites as typed fields
//! and carries everything else through `extra` maps, so a load → mutate →
//! write pass never drops data the converter or a user put into a document.

use crate::{ForgeError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Collection variable holding the service origin
pub const BASE_URL_KEY: &str = "baseUrl";

/// Placeholder substituted by the collection runner at request-send time
pub const BASE_URL_PLACEHOLDER: &str = "{{baseUrl}}";

/// Collection document root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection metadata
    #[serde(default)]
    pub info: Info,

    /// Collection variables; keys are treated as unique, first match wins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<Vec<Variable>>,

    /// Top-level items, in display order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<Item>>,

    /// Fields the pipeline does not interpret (auth, event, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Collection metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// Server-side identifier, set when syncing to an existing collection
    #[serde(rename = "_postman_id", default, skip_serializing_if = "Option::is_none")]
    pub postman_id: Option<String>,

    #[serde(default)]
    pub name: String,

    /// Plain string or a `{content, type}` object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,

    /// Collection format schema URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A `{key, value, type}` collection variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Absent on variables addressed by `id` only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub var_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Variable {
    /// Create a string-typed variable
    pub fn string(key: &str, value: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            value: Value::String(value.to_string()),
            var_type: Some("string".to_string()),
            extra: Map::new(),
        }
    }

    /// Value as a string, if it is one
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

/// A node in the collection tree: a request, a folder of further items, or
/// (for loosely-formed documents) neither
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,

    /// Present on request items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,

    /// Saved example responses of a request item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Vec<Value>>,

    /// Present on folder items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<Item>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Create a request item
    pub fn request(name: impl Into<String>, request: Request) -> Self {
        Self {
            name: Some(name.into()),
            request: Some(request),
            ..Default::default()
        }
    }

    /// Create a folder item wrapping `items`
    pub fn folder(name: impl Into<String>, description: Option<String>, items: Vec<Item>) -> Self {
        Self {
            name: Some(name.into()),
            description: description.map(Value::String),
            item: Some(items),
            ..Default::default()
        }
    }

    /// Whether this node carries child items
    pub fn is_folder(&self) -> bool {
        self.item.is_some()
    }

    /// Number of direct children (0 for request items)
    pub fn child_count(&self) -> usize {
        self.item.as_ref().map_or(0, Vec::len)
    }

    /// Display name, falling back to `fallback` when unnamed
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(fallback)
    }
}

/// HTTP request of a request item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Vec<KeyValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<RequestUrl>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `{key, value, description}` entry used for headers, query params, and
/// path variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(default)]
    pub key: String,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,

    /// Plain string or a `{content, type}` object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Value::String(value.into()),
            description: None,
            extra: Map::new(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.map(Value::String);
        self
    }
}

/// Request URL in one of its three document shapes
///
/// The shape is decided once, at load time: a plain string is `Text`, an
/// object with a non-empty `raw` is `Raw`, and any other object is
/// `Structured`. Rewrites keep the variant, so a `Structured` URL whose `raw`
/// was recomputed stays `Structured` until the document is reloaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestUrl {
    Text(String),
    Raw(UrlObject),
    Structured(UrlObject),
}

impl From<UrlObject> for RequestUrl {
    fn from(url: UrlObject) -> Self {
        match url.raw.as_deref() {
            Some(raw) if !raw.is_empty() => RequestUrl::Raw(url),
            _ => RequestUrl::Structured(url),
        }
    }
}

impl<'de> Deserialize<'de> for RequestUrl {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Object(UrlObject),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(url) => RequestUrl::Text(url),
            Repr::Object(url) => RequestUrl::from(url),
        })
    }
}

impl RequestUrl {
    /// The URL as a single string: the text form or `raw`, empty when only
    /// structured parts exist
    pub fn as_display(&self) -> &str {
        match self {
            RequestUrl::Text(url) => url,
            RequestUrl::Raw(url) | RequestUrl::Structured(url) => {
                url.raw.as_deref().unwrap_or("")
            }
        }
    }
}

/// Object form of a request URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<UrlParts>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<UrlParts>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Vec<KeyValue>>,

    /// Path variables (`:id` segments)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<Vec<KeyValue>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `host` or `path` of a URL object: one joined string or a segment list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UrlParts {
    Joined(String),
    Segments(Vec<UrlSegment>),
}

/// One `host` or `path` segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UrlSegment {
    Text(String),
    /// `{type, value}` segments and anything else the format allows
    Other(Value),
}

impl UrlSegment {
    /// Segment text: the string itself or an object's string `value`
    pub fn as_text(&self) -> Option<&str> {
        match self {
            UrlSegment::Text(text) => Some(text),
            UrlSegment::Other(value) => value.get("value").and_then(Value::as_str),
        }
    }
}

impl UrlParts {
    /// Segment list of plain strings
    pub fn segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        UrlParts::Segments(
            segments
                .into_iter()
                .map(|s| UrlSegment::Text(s.into()))
                .collect(),
        )
    }

    /// Segments joined with `separator`; `None` when a segment has no text
    pub fn render(&self, separator: &str) -> Option<String> {
        match self {
            UrlParts::Joined(text) => Some(text.clone()),
            UrlParts::Segments(segments) => segments
                .iter()
                .map(UrlSegment::as_text)
                .collect::<Option<Vec<_>>>()
                .map(|texts| texts.join(separator)),
        }
    }
}

impl Collection {
    /// Load a collection from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ForgeError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_json(&content, &path.display().to_string())
    }

    /// Parse a collection from a JSON string
    pub fn from_json(json: &str, source_name: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ForgeError::malformed(source_name, e))
    }

    /// Serialize with 2-space indentation
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the collection as pretty JSON, replacing any existing file
    ///
    /// Content goes to a sibling temporary file first, so a failed write never
    /// leaves a truncated document at `path`.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_pretty_json()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = Path::new(&tmp_name);

        if let Err(e) = fs::write(tmp_path, json).and_then(|_| fs::rename(tmp_path, path)) {
            let _ = fs::remove_file(tmp_path);
            return Err(e.into());
        }

        Ok(())
    }

    /// Top-level items, empty when the `item` field is absent
    pub fn items(&self) -> &[Item] {
        self.item.as_deref().unwrap_or(&[])
    }

    /// First variable with the given key
    pub fn variable(&self, key: &str) -> Option<&Variable> {
        self.variable
            .as_ref()?
            .iter()
            .find(|v| v.key.as_deref() == Some(key))
    }

    /// Overwrite the first variable with `key`, or append a string variable
    pub fn set_variable(&mut self, key: &str, value: &str) {
        let variables = self.variable.get_or_insert_with(Vec::new);
        match variables.iter_mut().find(|v| v.key.as_deref() == Some(key)) {
            Some(existing) => existing.value = Value::String(value.to_string()),
            None => variables.push(Variable::string(key, value)),
        }
    }

    /// Every request item in pre-order, folders included in the walk
    pub fn requests(&self) -> Vec<&Item> {
        fn walk<'a>(items: &'a [Item], out: &mut Vec<&'a Item>) {
            for item in items {
                if item.request.is_some() {
                    out.push(item);
                }
                if let Some(children) = &item.item {
                    walk(children, out);
                }
            }
        }

        let mut out = Vec::new();
        walk(self.items(), &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_shapes_are_classified_on_load() {
        let item: Item = serde_json::from_value(json!({
            "name": "list",
            "request": { "method": "GET", "url": "{{baseUrl}}/things" }
        }))
        .unwrap();
        assert!(matches!(item.request.unwrap().url, Some(RequestUrl::Text(_))));

        let url: RequestUrl =
            serde_json::from_value(json!({ "raw": "{{baseUrl}}/a", "host": ["{{baseUrl}}"] }))
                .unwrap();
        assert!(matches!(url, RequestUrl::Raw(_)));

        let url: RequestUrl =
            serde_json::from_value(json!({ "host": ["{{baseUrl}}"], "path": ["a"] })).unwrap();
        assert!(matches!(url, RequestUrl::Structured(_)));

        // An empty raw does not count as present
        let url: RequestUrl = serde_json::from_value(json!({ "raw": "", "path": ["a"] })).unwrap();
        assert!(matches!(url, RequestUrl::Structured(_)));
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let doc = json!({
            "info": { "name": "Svc", "schema": POSTMAN_SCHEMA, "_postman_id": "abc" },
            "item": [{
                "name": "get",
                "event": [{ "listen": "test" }],
                "request": {
                    "method": "GET",
                    "auth": { "type": "noauth" },
                    "url": { "raw": "{{baseUrl}}/x", "protocol": "https" }
                }
            }],
            "auth": { "type": "bearer" }
        });

        let collection: Collection = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(collection.info.postman_id.as_deref(), Some("abc"));
        assert_eq!(serde_json::to_value(&collection).unwrap(), doc);
    }

    const POSTMAN_SCHEMA: &str = crate::POSTMAN_SCHEMA_V2_1;

    #[test]
    fn test_set_variable_overwrites_first_match_only() {
        let mut collection = Collection::default();
        collection.set_variable(BASE_URL_KEY, "https://one");
        assert_eq!(collection.variable.as_ref().unwrap().len(), 1);

        collection
            .variable
            .as_mut()
            .unwrap()
            .push(Variable::string(BASE_URL_KEY, "https://dup"));
        collection.set_variable(BASE_URL_KEY, "https://two");

        let vars = collection.variable.as_ref().unwrap();
        assert_eq!(vars[0].value_str(), Some("https://two"));
        assert_eq!(vars[1].value_str(), Some("https://dup"));
        assert_eq!(
            collection.variable(BASE_URL_KEY).unwrap().value_str(),
            Some("https://two")
        );
    }

    #[test]
    fn test_requests_walks_nested_folders_in_order() {
        let collection = Collection {
            item: Some(vec![
                Item::request("a", Request::default()),
                Item::folder(
                    "f",
                    None,
                    vec![
                        Item::request("b", Request::default()),
                        Item::folder("g", None, vec![Item::request("c", Request::default())]),
                    ],
                ),
            ]),
            ..Default::default()
        };

        let names: Vec<_> = collection
            .requests()
            .iter()
            .map(|i| i.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_write_and_reload_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");

        let mut collection = Collection::default();
        collection.info.name = "Auth".to_string();
        collection.write_to_file(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(
            written.contains("\n  \"info\": {"),
            "expected 2-space indent"
        );

        let reloaded = Collection::from_file(&path).unwrap();
        assert_eq!(reloaded, collection);
    }

    #[test]
    fn test_failed_write_removes_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("taken");
        fs::create_dir_all(target.join("child")).unwrap();

        let collection = Collection::default();
        assert!(collection.write_to_file(&target).is_err());
        assert!(!dir.path().join("taken.tmp").exists());
        assert!(target.join("child").is_dir());
    }

    #[test]
    fn test_loose_url_and_variable_shapes_load() {
        let doc = json!({
            "info": { "name": "Loose" },
            "variable": [{ "id": "a1b2", "value": "x" }],
            "item": [{
                "name": "get thing",
                "request": {
                    "method": "GET",
                    "url": {
                        "host": "{{baseUrl}}",
                        "path": ["things", { "type": "string", "value": ":id" }],
                        "query": [{
                            "key": "limit",
                            "value": "20",
                            "description": { "content": "Page size", "type": "text/plain" }
                        }],
                        "variable": [{
                            "key": "id",
                            "description": { "content": "Thing id", "type": "text/plain" }
                        }]
                    }
                }
            }]
        });

        let collection = Collection::from_json(&doc.to_string(), "loose.json").unwrap();
        assert_eq!(collection.variable.as_ref().unwrap()[0].key, None);
        assert!(collection.variable(BASE_URL_KEY).is_none());

        let request = collection.items()[0].request.as_ref().unwrap();
        let Some(RequestUrl::Structured(url)) = &request.url else {
            panic!("expected a structured URL");
        };
        assert_eq!(url.host, Some(UrlParts::Joined("{{baseUrl}}".to_string())));
        assert_eq!(
            url.path.as_ref().unwrap().render("/").as_deref(),
            Some("things/:id")
        );
        assert_eq!(
            url.query.as_ref().unwrap()[0].description,
            Some(json!({ "content": "Page size", "type": "text/plain" }))
        );

        assert_eq!(serde_json::to_value(&collection).unwrap(), doc);
    }

    #[test]
    fn test_render_needs_text_for_every_segment() {
        let parts = UrlParts::Segments(vec![
            UrlSegment::Text("a".to_string()),
            UrlSegment::Other(json!({ "type": "any" })),
        ]);
        assert_eq!(parts.render("/"), None);
        assert_eq!(
            UrlParts::segments(["a", "b"]).render("/").as_deref(),
            Some("a/b")
        );
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            Collection::from_file(&missing),
            Err(ForgeError::NotFound(_))
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            Collection::from_file(&broken),
            Err(ForgeError::MalformedInput { .. })
        ));
    }
}
