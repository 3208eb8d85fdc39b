//! Versioned URL rewriting
//!
//! Roots every request URL at `{{baseUrl}}/v1/<service>` and pins the
//! `baseUrl` variable to the configured origin.
//!
//! The three URL shapes behave differently on repeated runs: the structured
//! (`host`/`path`) rewrite strips earlier `v1`/service segments before
//! prefixing, so it is idempotent, while the text and `raw` rewrites insert
//! the prefix after the first `{{baseUrl}}` every time they run.

use postman_forge_common::{
    Collection, Item, RequestUrl, UrlObject, UrlParts, UrlSegment, BASE_URL_KEY,
    BASE_URL_PLACEHOLDER,
};
use tracing::debug;

/// Version segment every service path starts with
pub const API_VERSION_SEGMENT: &str = "v1";

/// Rewrite a converted collection for `service_name`
///
/// Sets `baseUrl` (first match overwritten, appended when absent), rewrites
/// every request URL in pre-order, and renames the collection to the service.
pub fn normalize_collection(collection: &mut Collection, service_name: &str, base_url: &str) {
    collection.set_variable(BASE_URL_KEY, base_url);

    let rewriter = UrlRewriter::new(service_name);
    if let Some(items) = collection.item.as_mut() {
        for item in items.iter_mut() {
            rewriter.rewrite_item(item);
        }
    }

    collection.info.name = service_name.to_string();
}

/// `{{baseUrl}}/v1/<service-lowercase>`
pub fn versioned_prefix(service_name: &str) -> String {
    format!(
        "{}/{}/{}",
        BASE_URL_PLACEHOLDER,
        API_VERSION_SEGMENT,
        service_name.to_lowercase()
    )
}

struct UrlRewriter {
    service_lower: String,
    prefix: String,
}

impl UrlRewriter {
    fn new(service_name: &str) -> Self {
        Self {
            service_lower: service_name.to_lowercase(),
            prefix: versioned_prefix(service_name),
        }
    }

    fn rewrite_item(&self, item: &mut Item) {
        if let Some(url) = item.request.as_mut().and_then(|r| r.url.as_mut()) {
            self.rewrite_url(url);
            debug!(
                item = item.name.as_deref().unwrap_or(""),
                url = url.as_display(),
                "Rewrote request URL"
            );
        }

        if let Some(children) = item.item.as_mut() {
            for child in children.iter_mut() {
                self.rewrite_item(child);
            }
        }
    }

    fn rewrite_url(&self, url: &mut RequestUrl) {
        match url {
            RequestUrl::Text(text) => *text = self.prefix_placeholder(text),
            RequestUrl::Raw(object) => {
                if let Some(raw) = object.raw.as_mut() {
                    *raw = self.prefix_placeholder(raw);
                }
            }
            RequestUrl::Structured(object) => self.rewrite_structured(object),
        }
    }

    /// Single, first-occurrence replacement of the placeholder
    fn prefix_placeholder(&self, url: &str) -> String {
        url.replacen(BASE_URL_PLACEHOLDER, &self.prefix, 1)
    }

    fn rewrite_structured(&self, url: &mut UrlObject) {
        if url.host.is_some() {
            url.host = Some(UrlParts::segments([BASE_URL_PLACEHOLDER]));
        }

        if let Some(path) = url.path.as_mut() {
            *path = self.versioned_path(path);
        }

        // raw needs text for every segment; object segments without a
        // string value leave it as it was
        let host = url.host.as_ref().and_then(|h| h.render(""));
        let path = url.path.as_ref().and_then(|p| p.render("/"));
        if let (Some(host), Some(path)) = (host, path) {
            url.raw = Some(format!("{}/{}", host, path));
        }
    }

    /// `v1/<service>` followed by the existing segments, minus earlier
    /// version and service segments
    ///
    /// A joined path string is split on `/`. Object segments are kept as is.
    fn versioned_path(&self, path: &UrlParts) -> UrlParts {
        let segments: Vec<UrlSegment> = match path {
            UrlParts::Joined(text) => text
                .split('/')
                .filter(|s| !s.is_empty())
                .map(|s| UrlSegment::Text(s.to_string()))
                .collect(),
            UrlParts::Segments(segments) => segments.clone(),
        };

        let kept = segments.into_iter().filter(|segment| match segment {
            UrlSegment::Text(text) => {
                text != API_VERSION_SEGMENT && text.to_lowercase() != self.service_lower
            }
            UrlSegment::Other(_) => true,
        });

        let prefix = [
            UrlSegment::Text(API_VERSION_SEGMENT.to_string()),
            UrlSegment::Text(self.service_lower.clone()),
        ];
        UrlParts::Segments(prefix.into_iter().chain(kept).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postman_forge_common::{Request, Variable};
    use serde_json::json;

    const ORIGIN: &str = "https://api.saasus.io";

    fn structured(host: Option<Vec<&str>>, path: Option<Vec<&str>>) -> RequestUrl {
        RequestUrl::Structured(UrlObject {
            host: host.map(UrlParts::segments),
            path: path.map(UrlParts::segments),
            ..Default::default()
        })
    }

    fn request_item(url: RequestUrl) -> Item {
        Item::request(
            "req",
            Request {
                method: Some("GET".to_string()),
                url: Some(url),
                ..Default::default()
            },
        )
    }

    fn single(url: RequestUrl) -> Collection {
        Collection {
            item: Some(vec![request_item(url)]),
            ..Default::default()
        }
    }

    fn first_url(collection: &Collection) -> &RequestUrl {
        collection.items()[0]
            .request
            .as_ref()
            .unwrap()
            .url
            .as_ref()
            .unwrap()
    }

    #[test]
    fn test_text_url_gets_versioned_prefix() {
        let mut collection: Collection = serde_json::from_value(json!({
            "info": { "name": "converted" },
            "item": [{
                "name": "list",
                "request": { "method": "GET", "url": "{{baseUrl}}/things" }
            }]
        }))
        .unwrap();

        normalize_collection(&mut collection, "Auth", ORIGIN);

        assert_eq!(
            first_url(&collection),
            &RequestUrl::Text("{{baseUrl}}/v1/auth/things".to_string())
        );
        assert_eq!(collection.info.name, "Auth");
        assert_eq!(
            collection.variable(BASE_URL_KEY).unwrap().value_str(),
            Some(ORIGIN)
        );
    }

    #[test]
    fn test_only_first_placeholder_is_replaced() {
        let mut collection = single(RequestUrl::Text(
            "{{baseUrl}}/redirect?to={{baseUrl}}".to_string(),
        ));
        normalize_collection(&mut collection, "Auth", ORIGIN);
        assert_eq!(
            first_url(&collection).as_display(),
            "{{baseUrl}}/v1/auth/redirect?to={{baseUrl}}"
        );
    }

    #[test]
    fn test_raw_url_rewrites_raw_only() {
        let mut collection = single(RequestUrl::Raw(UrlObject {
            raw: Some("{{baseUrl}}/plans".to_string()),
            host: Some(UrlParts::segments(["{{baseUrl}}"])),
            path: Some(UrlParts::segments(["plans"])),
            ..Default::default()
        }));

        normalize_collection(&mut collection, "Pricing", ORIGIN);

        let RequestUrl::Raw(url) = first_url(&collection) else {
            panic!("shape must not change");
        };
        assert_eq!(url.raw.as_deref(), Some("{{baseUrl}}/v1/pricing/plans"));
        assert_eq!(url.path, Some(UrlParts::segments(["plans"])));
    }

    #[test]
    fn test_structured_url_is_rebuilt() {
        let mut collection = single(structured(
            Some(vec!["api", "example", "com"]),
            Some(vec!["AUTH", "v1", "users", "{id}"]),
        ));

        normalize_collection(&mut collection, "Auth", ORIGIN);

        let RequestUrl::Structured(url) = first_url(&collection) else {
            panic!("shape must not change");
        };
        assert_eq!(url.host, Some(UrlParts::segments(["{{baseUrl}}"])));
        assert_eq!(
            url.path,
            Some(UrlParts::segments(["v1", "auth", "users", "{id}"]))
        );
        assert_eq!(url.raw.as_deref(), Some("{{baseUrl}}/v1/auth/users/{id}"));
    }

    #[test]
    fn test_already_versioned_structured_url_is_unchanged() {
        let mut collection = single(structured(
            Some(vec!["{{baseUrl}}"]),
            Some(vec!["v1", "auth", "things"]),
        ));

        normalize_collection(&mut collection, "Auth", ORIGIN);

        let RequestUrl::Structured(url) = first_url(&collection) else {
            panic!("shape must not change");
        };
        assert_eq!(url.path, Some(UrlParts::segments(["v1", "auth", "things"])));
        assert_eq!(url.raw.as_deref(), Some("{{baseUrl}}/v1/auth/things"));
    }

    #[test]
    fn test_loose_structured_shapes_are_rewritten() {
        let mut collection: Collection = serde_json::from_value(json!({
            "item": [
                {
                    "name": "typed segment",
                    "request": { "url": {
                        "host": "api.example.com",
                        "path": ["auth", "things", { "type": "string", "value": ":id" }]
                    } }
                },
                {
                    "name": "joined path",
                    "request": { "url": { "host": ["{{baseUrl}}"], "path": "/v1/things/list" } }
                },
                {
                    "name": "opaque segment",
                    "request": { "url": {
                        "host": ["{{baseUrl}}"],
                        "path": ["things", { "type": "any" }]
                    } }
                }
            ]
        }))
        .unwrap();

        normalize_collection(&mut collection, "Auth", ORIGIN);

        let requests = collection.requests();
        let urls: Vec<&UrlObject> = requests
            .iter()
            .map(|i| match i.request.as_ref().unwrap().url.as_ref().unwrap() {
                RequestUrl::Structured(url) => url,
                other => panic!("shape must not change: {:?}", other),
            })
            .collect();

        assert_eq!(urls[0].host, Some(UrlParts::segments(["{{baseUrl}}"])));
        assert_eq!(
            urls[0].path,
            Some(UrlParts::Segments(vec![
                UrlSegment::Text("v1".to_string()),
                UrlSegment::Text("auth".to_string()),
                UrlSegment::Text("things".to_string()),
                UrlSegment::Other(json!({ "type": "string", "value": ":id" })),
            ]))
        );
        assert_eq!(
            urls[0].raw.as_deref(),
            Some("{{baseUrl}}/v1/auth/things/:id")
        );

        assert_eq!(
            urls[1].path,
            Some(UrlParts::segments(["v1", "auth", "things", "list"]))
        );
        assert_eq!(
            urls[1].raw.as_deref(),
            Some("{{baseUrl}}/v1/auth/things/list")
        );

        // No text for the last segment, so raw stays absent
        assert_eq!(urls[2].raw, None);
        assert_eq!(
            urls[2].path.as_ref().unwrap(),
            &UrlParts::Segments(vec![
                UrlSegment::Text("v1".to_string()),
                UrlSegment::Text("auth".to_string()),
                UrlSegment::Text("things".to_string()),
                UrlSegment::Other(json!({ "type": "any" })),
            ])
        );
    }

    #[test]
    fn test_structured_rewrite_is_idempotent() {
        let mut once = single(structured(Some(vec!["{{baseUrl}}"]), Some(vec!["things"])));
        normalize_collection(&mut once, "Auth", ORIGIN);

        let mut twice = once.clone();
        normalize_collection(&mut twice, "Auth", ORIGIN);

        assert_eq!(first_url(&once), first_url(&twice));
    }

    #[test]
    fn test_text_and_raw_rewrites_are_not_idempotent() {
        // Known asymmetry: a second pass prefixes again
        let mut collection = single(RequestUrl::Text("{{baseUrl}}/things".to_string()));
        normalize_collection(&mut collection, "Auth", ORIGIN);
        normalize_collection(&mut collection, "Auth", ORIGIN);
        assert_eq!(
            first_url(&collection).as_display(),
            "{{baseUrl}}/v1/auth/v1/auth/things"
        );

        let mut collection = single(RequestUrl::Raw(UrlObject {
            raw: Some("{{baseUrl}}/things".to_string()),
            ..Default::default()
        }));
        normalize_collection(&mut collection, "Auth", ORIGIN);
        normalize_collection(&mut collection, "Auth", ORIGIN);
        assert_eq!(
            first_url(&collection).as_display(),
            "{{baseUrl}}/v1/auth/v1/auth/things"
        );
    }

    #[test]
    fn test_structured_without_host_keeps_raw_absent() {
        let mut collection = single(structured(None, Some(vec!["things"])));
        normalize_collection(&mut collection, "Auth", ORIGIN);

        let RequestUrl::Structured(url) = first_url(&collection) else {
            panic!("shape must not change");
        };
        assert_eq!(url.host, None);
        assert_eq!(url.path, Some(UrlParts::segments(["v1", "auth", "things"])));
        assert_eq!(url.raw, None);
    }

    #[test]
    fn test_items_without_url_are_untouched() {
        let bare = Item::request("no url", Request::default());
        let empty_object = request_item(structured(None, None));
        let mut collection = Collection {
            item: Some(vec![bare.clone(), empty_object.clone()]),
            ..Default::default()
        };

        normalize_collection(&mut collection, "Auth", ORIGIN);

        assert_eq!(collection.items()[0], bare);
        assert_eq!(collection.items()[1], empty_object);
    }

    #[test]
    fn test_nested_folders_are_fully_traversed_in_order() {
        let mut collection = Collection {
            item: Some(vec![
                Item::folder(
                    "outer",
                    None,
                    vec![
                        request_item(RequestUrl::Text("{{baseUrl}}/a".to_string())),
                        Item::folder(
                            "inner",
                            None,
                            vec![request_item(RequestUrl::Text("{{baseUrl}}/b".to_string()))],
                        ),
                    ],
                ),
                Item {
                    name: Some("leaf folder".to_string()),
                    ..Default::default()
                },
                request_item(RequestUrl::Text("{{baseUrl}}/c".to_string())),
            ]),
            ..Default::default()
        };

        normalize_collection(&mut collection, "Auth", ORIGIN);

        let urls: Vec<_> = collection
            .requests()
            .iter()
            .map(|i| {
                let url = i.request.as_ref().unwrap().url.as_ref().unwrap();
                url.as_display().to_string()
            })
            .collect();
        assert_eq!(
            urls,
            vec![
                "{{baseUrl}}/v1/auth/a",
                "{{baseUrl}}/v1/auth/b",
                "{{baseUrl}}/v1/auth/c"
            ]
        );
        assert_eq!(collection.items()[0].name.as_deref(), Some("outer"));
        assert_eq!(collection.items()[1].name.as_deref(), Some("leaf folder"));
    }

    #[test]
    fn test_base_url_variable_updated_in_place_or_appended() {
        let mut collection = Collection {
            variable: Some(vec![
                Variable::string("token", "abc"),
                Variable::string(BASE_URL_KEY, "/"),
            ]),
            ..Default::default()
        };
        normalize_collection(&mut collection, "Auth", ORIGIN);
        let vars = collection.variable.as_ref().unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[1].key.as_deref(), Some(BASE_URL_KEY));
        assert_eq!(vars[1].value_str(), Some(ORIGIN));

        let mut collection = Collection {
            variable: Some(vec![Variable::string("token", "abc")]),
            ..Default::default()
        };
        normalize_collection(&mut collection, "Auth", ORIGIN);
        let vars = collection.variable.as_ref().unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[1], Variable::string(BASE_URL_KEY, ORIGIN));
    }
}
