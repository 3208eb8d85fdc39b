//! Example value synthesis from schemas
//!
//! Produces the placeholder payloads shown in request bodies, query values,
//! and saved responses (`"<string>"`, `"<integer>"`, ...).

use super::types::{OpenApiSpec, ReferenceOr, Schema};
use serde_json::{Map, Value};

/// Nesting depth after which inline schemas stop expanding
const MAX_DEPTH: usize = 12;

/// Builds example values against one spec's components
pub struct ExampleBuilder<'a> {
    spec: &'a OpenApiSpec,
}

impl<'a> ExampleBuilder<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self { spec }
    }

    /// Example value for a schema or schema reference
    pub fn example(&self, schema: &'a ReferenceOr<Schema>) -> Value {
        let mut stack = Vec::new();
        self.build(schema, &mut stack, 0)
    }

    /// Example rendered as a single string (query values, form fields)
    pub fn example_string(&self, schema: &'a ReferenceOr<Schema>) -> String {
        value_to_string(&self.example(schema))
    }

    fn build(
        &self,
        schema: &'a ReferenceOr<Schema>,
        stack: &mut Vec<&'a str>,
        depth: usize,
    ) -> Value {
        match schema {
            ReferenceOr::Reference { reference } => {
                if stack.contains(&reference.as_str()) {
                    return Value::String(format!("<Circular reference to {} detected>", reference));
                }
                let Some(target) = self.spec.schema_by_ref(reference) else {
                    return Value::String(format!("<Unresolved reference {}>", reference));
                };

                stack.push(reference);
                let value = self.build(target, stack, depth);
                stack.pop();
                value
            }
            ReferenceOr::Item(schema) => self.build_schema(schema, stack, depth),
        }
    }

    fn build_schema(&self, schema: &'a Schema, stack: &mut Vec<&'a str>, depth: usize) -> Value {
        if let Some(example) = &schema.example {
            return example.clone();
        }
        if let Some(default) = &schema.default {
            return default.clone();
        }
        if let Some(first) = schema.enum_values.first() {
            return first.clone();
        }
        if depth > MAX_DEPTH {
            return Value::Null;
        }

        if !schema.all_of.is_empty() {
            let mut merged = Map::new();
            for part in &schema.all_of {
                if let Value::Object(fields) = self.build(part, stack, depth + 1) {
                    merged.extend(fields);
                }
            }
            merged.extend(self.properties(schema, stack, depth));
            return Value::Object(merged);
        }

        if let Some(first) = schema.one_of.first().or_else(|| schema.any_of.first()) {
            return self.build(first, stack, depth + 1);
        }

        match schema.primary_type() {
            Some("array") => match &schema.items {
                Some(items) => Value::Array(vec![self.build(items, stack, depth + 1)]),
                None => Value::Array(Vec::new()),
            },
            Some("string") => {
                Value::String(string_placeholder(schema.format.as_deref()).to_string())
            }
            Some("integer") => Value::String(
                match schema.format.as_deref() {
                    Some("int64") => "<long>",
                    _ => "<integer>",
                }
                .to_string(),
            ),
            Some("number") => Value::String(
                match schema.format.as_deref() {
                    Some("double") => "<double>",
                    Some("float") => "<float>",
                    _ => "<number>",
                }
                .to_string(),
            ),
            Some("boolean") => Value::String("<boolean>".to_string()),
            Some("object") => Value::Object(self.properties(schema, stack, depth)),
            _ if !schema.properties.is_empty() => {
                Value::Object(self.properties(schema, stack, depth))
            }
            _ => Value::Null,
        }
    }

    fn properties(
        &self,
        schema: &'a Schema,
        stack: &mut Vec<&'a str>,
        depth: usize,
    ) -> Map<String, Value> {
        schema
            .properties
            .iter()
            .map(|(name, prop)| (name.clone(), self.build(prop, stack, depth + 1)))
            .collect()
    }
}

fn string_placeholder(format: Option<&str>) -> &'static str {
    match format {
        Some("date-time") => "<dateTime>",
        Some("date") => "<date>",
        Some("uuid") => "<uuid>",
        Some("email") => "<email>",
        Some("uri") | Some("url") => "<uri>",
        _ => "<string>",
    }
}

/// Strings stay bare; everything else is rendered as JSON
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
