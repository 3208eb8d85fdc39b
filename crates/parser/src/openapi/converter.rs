//! Converts OpenAPI spec to a Postman collection

use super::example::{value_to_string, ExampleBuilder};
use super::types::{MediaType, OpenApiSpec, Operation, Parameter, PathItem};
use indexmap::IndexMap;
use postman_forge_common::{
    Collection, FolderStrategy, Info, Item, KeyValue, Request, RequestUrl, Result, UrlObject,
    UrlParts, Variable, BASE_URL_KEY, BASE_URL_PLACEHOLDER, POSTMAN_SCHEMA_V2_1,
};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Options controlling the generated collection
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Collection format schema URL
    pub schema: String,
    /// How requests are grouped into folders
    pub folder_strategy: FolderStrategy,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            schema: POSTMAN_SCHEMA_V2_1.to_string(),
            folder_strategy: FolderStrategy::default(),
        }
    }
}

/// Convert OpenAPI spec to a Postman collection
pub fn convert_openapi_to_collection(
    spec: &OpenApiSpec,
    service_name: &str,
    options: &ConversionOptions,
) -> Result<Collection> {
    let converter = RequestConverter::new(spec);

    let mut operations = Vec::new();
    for (path, path_item) in &spec.paths {
        for (method, operation) in path_item.operations() {
            let item = converter.build_item(path, method, path_item, operation);
            operations.push(ConvertedOperation {
                path: path.as_str(),
                first_tag: operation.tags.first().map(String::as_str),
                item,
            });
        }
    }

    info!(
        service = service_name,
        operations = operations.len(),
        strategy = ?options.folder_strategy,
        "Converted OpenAPI operations"
    );

    let items = match options.folder_strategy {
        FolderStrategy::Paths => group_by_paths(operations),
        FolderStrategy::Tags => group_by_tags(spec, operations),
        FolderStrategy::Flat => operations.into_iter().map(|op| op.item).collect(),
    };

    let base_url = spec.default_server_url().unwrap_or_else(|| "/".to_string());

    Ok(Collection {
        info: Info {
            name: spec.info.title.clone(),
            description: spec.info.description.clone().map(Value::String),
            schema: Some(options.schema.clone()),
            ..Default::default()
        },
        variable: Some(vec![Variable::string(BASE_URL_KEY, &base_url)]),
        item: Some(items),
        ..Default::default()
    })
}

/// One converted request together with what grouping needs to know
struct ConvertedOperation<'a> {
    path: &'a str,
    first_tag: Option<&'a str>,
    item: Item,
}

/// Builds request items for one spec
struct RequestConverter<'a> {
    spec: &'a OpenApiSpec,
    examples: ExampleBuilder<'a>,
}

impl<'a> RequestConverter<'a> {
    fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            spec,
            examples: ExampleBuilder::new(spec),
        }
    }

    fn build_item(
        &self,
        path: &str,
        method: &str,
        path_item: &'a PathItem,
        op: &'a Operation,
    ) -> Item {
        let name = op
            .summary
            .clone()
            .or_else(|| op.operation_id.clone())
            .unwrap_or_else(|| path.to_string());

        debug!(method, path, name = %name, "Building request item");

        let parameters = self.merged_parameters(path_item, op);
        let mut headers: Vec<KeyValue> = parameters
            .iter()
            .filter(|p| p.location == "header")
            .map(|&p| self.key_value(p))
            .collect();

        let body_media = op
            .request_body
            .as_ref()
            .and_then(|body| self.spec.resolve_request_body(body))
            .and_then(|body| body.content.first());

        if let Some((content_type, _)) = body_media {
            headers.push(KeyValue::new("Content-Type", content_type.as_str()));
        }
        if let Some(accept) = self.first_response_content_type(op) {
            headers.push(KeyValue::new("Accept", accept));
        }

        let request = Request {
            method: Some(method.to_string()),
            header: Some(headers),
            body: body_media.map(|(content_type, media)| self.body(content_type, media)),
            url: Some(RequestUrl::Raw(self.url(path, &parameters))),
            description: op.description.clone().map(Value::String),
            ..Default::default()
        };

        let responses = self.responses(op, &request);

        let mut item = Item::request(name, request);
        item.response = Some(responses);
        item
    }

    /// Path-level parameters overlaid by operation-level ones (same name and
    /// location replaces)
    fn merged_parameters(&self, path_item: &'a PathItem, op: &'a Operation) -> Vec<&'a Parameter> {
        let mut merged: IndexMap<(&str, &str), &Parameter> = IndexMap::new();
        for param in path_item.parameters.iter().chain(op.parameters.iter()) {
            if let Some(param) = self.spec.resolve_parameter(param) {
                merged.insert((param.name.as_str(), param.location.as_str()), param);
            }
        }
        merged.into_values().collect()
    }

    fn parameter_value(&self, param: &'a Parameter) -> String {
        match (&param.example, &param.schema) {
            (Some(example), _) => value_to_string(example),
            (None, Some(schema)) => self.examples.example_string(schema),
            (None, None) => String::new(),
        }
    }

    fn key_value(&self, param: &'a Parameter) -> KeyValue {
        KeyValue::new(param.name.as_str(), self.parameter_value(param))
            .with_description(param.description.clone())
    }

    fn url(&self, path: &str, parameters: &[&'a Parameter]) -> UrlObject {
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(to_postman_segment)
            .collect();

        let query: Vec<KeyValue> = parameters
            .iter()
            .filter(|p| p.location == "query")
            .map(|&p| self.key_value(p))
            .collect();

        let variables: Vec<KeyValue> = parameters
            .iter()
            .filter(|p| p.location == "path")
            .map(|&p| self.key_value(p))
            .collect();

        let mut raw = String::from(BASE_URL_PLACEHOLDER);
        if !segments.is_empty() {
            raw.push('/');
            raw.push_str(&segments.join("/"));
        }
        if !query.is_empty() {
            let pairs: Vec<String> = query
                .iter()
                .map(|q| format!("{}={}", q.key, value_to_string(&q.value)))
                .collect();
            raw.push('?');
            raw.push_str(&pairs.join("&"));
        }

        UrlObject {
            raw: Some(raw),
            host: Some(UrlParts::segments([BASE_URL_PLACEHOLDER])),
            path: Some(UrlParts::segments(segments)),
            query: (!query.is_empty()).then_some(query),
            variable: (!variables.is_empty()).then_some(variables),
            ..Default::default()
        }
    }

    fn media_example(&self, media: &'a MediaType) -> Value {
        match (&media.example, &media.schema) {
            (Some(example), _) => example.clone(),
            (None, Some(schema)) => self.examples.example(schema),
            (None, None) => Value::Null,
        }
    }

    fn body(&self, content_type: &str, media: &'a MediaType) -> Value {
        let example = self.media_example(media);

        if content_type.contains("json") {
            return json!({
                "mode": "raw",
                "raw": pretty_or_empty(&example),
                "options": { "raw": { "language": "json" } }
            });
        }

        match content_type {
            "application/x-www-form-urlencoded" => json!({
                "mode": "urlencoded",
                "urlencoded": form_fields(&example, false),
            }),
            "multipart/form-data" => json!({
                "mode": "formdata",
                "formdata": form_fields(&example, true),
            }),
            _ => json!({
                "mode": "raw",
                "raw": match &example {
                    Value::String(text) => text.clone(),
                    other => pretty_or_empty(other),
                }
            }),
        }
    }

    fn first_response_content_type(&self, op: &'a Operation) -> Option<&'a str> {
        op.responses
            .values()
            .filter_map(|r| self.spec.resolve_response(r))
            .find_map(|r| r.content.keys().next())
            .map(String::as_str)
    }

    /// Saved example responses, one per documented status
    fn responses(&self, op: &'a Operation, request: &Request) -> Vec<Value> {
        let original_request = serde_json::to_value(request).unwrap_or(Value::Null);

        op.responses
            .iter()
            .filter_map(|(code, response)| {
                let response = self.spec.resolve_response(response)?;
                let code = status_code(code)?;
                let media = response.content.first();

                let (header, body, language) = match media {
                    Some((content_type, media)) => (
                        vec![json!({ "key": "Content-Type", "value": content_type })],
                        match self.media_example(media) {
                            Value::String(text) => text,
                            other => pretty_or_empty(&other),
                        },
                        if content_type.contains("json") { "json" } else { "text" },
                    ),
                    None => (Vec::new(), String::new(), "text"),
                };

                let name = if response.description.is_empty() {
                    reason_phrase(code).to_string()
                } else {
                    response.description.clone()
                };

                Some(json!({
                    "name": name,
                    "originalRequest": original_request,
                    "status": reason_phrase(code),
                    "code": code,
                    "_postman_previewlanguage": language,
                    "header": header,
                    "body": body,
                }))
            })
            .collect()
    }
}

/// `{petId}` → `:petId`, anywhere inside the segment
fn to_postman_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(start) = rest.find('{') {
        match rest[start..].find('}') {
            Some(len) => {
                out.push_str(&rest[..start]);
                out.push(':');
                out.push_str(&rest[start + 1..start + len]);
                rest = &rest[start + len + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

fn pretty_or_empty(value: &Value) -> String {
    if value.is_null() {
        return String::new();
    }
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn form_fields(example: &Value, with_type: bool) -> Vec<Value> {
    let Value::Object(fields) = example else {
        return Vec::new();
    };

    fields
        .iter()
        .map(|(key, value)| {
            let mut field = json!({ "key": key, "value": value_to_string(value) });
            if with_type {
                field["type"] = json!("text");
            }
            field
        })
        .collect()
}

/// Numeric status for a response key; "default" maps to 500 and ranges such
/// as "4XX" to their first code
fn status_code(key: &str) -> Option<u16> {
    if key == "default" {
        return Some(500);
    }
    if let Ok(code) = key.parse::<u16>() {
        return Some(code);
    }

    let class = key.chars().next()?.to_digit(10)?;
    let rest = &key[1..];
    (rest.eq_ignore_ascii_case("xx")).then_some(class as u16 * 100)
}

fn reason_phrase(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

/// Path-segment tree used by the `paths` folder strategy
#[derive(Default)]
struct PathNode {
    requests: Vec<Item>,
    children: IndexMap<String, PathNode>,
}

impl PathNode {
    fn insert(&mut self, segments: &[&str], item: Item) {
        match segments.split_first() {
            None => self.requests.push(item),
            Some((head, tail)) => self
                .children
                .entry(head.to_string())
                .or_default()
                .insert(tail, item),
        }
    }

    fn request_count(&self) -> usize {
        self.requests.len() + self.children.values().map(PathNode::request_count).sum::<usize>()
    }

    /// A segment becomes a folder only when more than one request lives
    /// beneath it; otherwise its content is hoisted into the parent
    fn into_items(self) -> Vec<Item> {
        let mut items = self.requests;
        for (segment, child) in self.children {
            if child.request_count() > 1 {
                items.push(Item::folder(segment, None, child.into_items()));
            } else {
                items.extend(child.into_items());
            }
        }
        items
    }
}

fn group_by_paths(operations: Vec<ConvertedOperation<'_>>) -> Vec<Item> {
    let mut root = PathNode::default();
    for op in operations {
        let segments: Vec<&str> = op.path.split('/').filter(|s| !s.is_empty()).collect();
        root.insert(&segments, op.item);
    }
    root.into_items()
}

/// Folder per first tag, untagged requests at the root; folders appear where
/// their first request would have
fn group_by_tags(spec: &OpenApiSpec, operations: Vec<ConvertedOperation<'_>>) -> Vec<Item> {
    let mut nodes: IndexMap<String, Item> = IndexMap::new();

    for (index, op) in operations.into_iter().enumerate() {
        match op.first_tag {
            Some(tag) => {
                let folder = nodes.entry(format!("tag/{}", tag)).or_insert_with(|| {
                    Item::folder(
                        tag,
                        spec.tag_description(tag).map(str::to_string),
                        Vec::new(),
                    )
                });
                folder.item.get_or_insert_with(Vec::new).push(op.item);
            }
            None => {
                nodes.insert(format!("op/{}", index), op.item);
            }
        }
    }

    nodes.into_values().collect()
}
