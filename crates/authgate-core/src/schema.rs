//! Schema boundary: JSON Schema checks backed by the `jsonschema` crate.
//!
//! `jsonschema` types never leave this module. Violations are collected into
//! a [`SchemaError`], which knows how to render itself as normalized
//! field messages (`{"field": {"nested": ["message"]}}`).

use std::fmt;

use jsonschema::Validator;
use jsonschema::error::ValidationErrorKind;
use serde_json::{Map, Value};

/// Key used for violations that belong to the document (or node) itself.
pub const SCHEMA_KEY: &str = "_schema";

const MISSING_FIELD: &str = "Missing data for required field.";

/// A compiled JSON Schema (Draft 2020-12, format assertions on).
pub struct Schema {
    name: String,
    validator: Validator,
}

impl Schema {
    /// Compiles `definition`. Fails only when the definition itself is
    /// not a valid schema.
    pub fn compile(name: &str, definition: &Value) -> Result<Self, InvalidSchema> {
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        opts.should_validate_formats(true);

        let validator = opts.build(definition).map_err(|e| InvalidSchema {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name: name.to_string(),
            validator,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks `instance`, collecting every violation.
    pub fn check(&self, instance: &Value) -> Result<(), SchemaError> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| {
                let mut path = pointer_segments(&e.instance_path.to_string());
                let message = match &e.kind {
                    ValidationErrorKind::Required { property } => {
                        path.push(property.as_str().map_or_else(|| property.to_string(), String::from));
                        MISSING_FIELD.to_string()
                    }
                    _ => e.to_string(),
                };
                Violation { path, message }
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError {
                schema: self.name.clone(),
                violations,
            })
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("name", &self.name).finish()
    }
}

/// The schema definition could not be compiled.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid schema '{name}': {reason}")]
pub struct InvalidSchema {
    pub name: String,
    pub reason: String,
}

/// A single violation. An empty `path` means the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: Vec<String>,
    pub message: String,
}

/// A document that does not conform to its schema.
#[derive(Debug, Clone, thiserror::Error)]
#[error("document rejected by schema '{schema}' ({} violation(s))", .violations.len())]
pub struct SchemaError {
    schema: String,
    violations: Vec<Violation>,
}

impl SchemaError {
    /// A rejection of the document as a whole.
    pub fn root(schema: &str, message: impl Into<String>) -> Self {
        Self {
            schema: schema.to_string(),
            violations: vec![Violation {
                path: Vec::new(),
                message: message.into(),
            }],
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Nested field -> messages mapping, in violation order.
    ///
    /// Messages for a node that also has children go under [`SCHEMA_KEY`]
    /// inside that node.
    pub fn normalized_messages(&self) -> Value {
        let mut root = Map::new();
        for violation in &self.violations {
            insert_message(&mut root, &violation.path, &violation.message);
        }
        Value::Object(root)
    }
}

fn insert_message(node: &mut Map<String, Value>, path: &[String], message: &str) {
    let Some((head, rest)) = path.split_first() else {
        push_message(node, SCHEMA_KEY, message);
        return;
    };

    if rest.is_empty() {
        match node.get_mut(head) {
            Some(Value::Object(child)) => push_message(child, SCHEMA_KEY, message),
            _ => push_message(node, head, message),
        }
        return;
    }

    let entry = node
        .entry(head.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        let own = std::mem::take(entry);
        let mut child = Map::new();
        child.insert(SCHEMA_KEY.to_string(), own);
        *entry = Value::Object(child);
    }
    if let Value::Object(child) = entry {
        insert_message(child, rest, message);
    }
}

fn push_message(node: &mut Map<String, Value>, key: &str, message: &str) {
    let entry = node
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(messages) = entry {
        messages.push(Value::String(message.to_string()));
    }
}

/// Splits a JSON Pointer (`/a/b~1c`) into unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query_schema() -> Schema {
        Schema::compile(
            "Query",
            &json!({
                "type": "object",
                "required": ["provider", "role"],
                "properties": {
                    "provider": {"type": "string", "enum": ["a", "b"]},
                    "role": {"type": "string"},
                    "return_url": {"type": "string", "format": "uri"}
                }
            }),
        )
        .unwrap()
    }

    #[test]
    fn accepts_conforming_document() {
        let schema = query_schema();
        assert!(schema.check(&json!({"provider": "a", "role": "admin"})).is_ok());
    }

    #[test]
    fn ignores_unknown_keys() {
        let schema = query_schema();
        let doc = json!({"provider": "b", "role": "x", "extra": 1});
        assert!(schema.check(&doc).is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let schema = query_schema();
        let err = schema.check(&json!({"provider": "z"})).unwrap_err();
        assert_eq!(err.violations().len(), 2);
        assert_eq!(err.schema(), "Query");

        let messages = err.normalized_messages();
        assert_eq!(messages["provider"].as_array().unwrap().len(), 1);
        assert_eq!(messages["role"][0], MISSING_FIELD);
    }

    #[test]
    fn format_assertions_enabled() {
        let schema = query_schema();
        let doc = json!({"provider": "a", "role": "x", "return_url": "not a url"});
        let err = schema.check(&doc).unwrap_err();
        assert_eq!(err.violations()[0].path, vec!["return_url".to_string()]);
    }

    #[test]
    fn root_violation_goes_under_schema_key() {
        let schema = query_schema();
        let err = schema.check(&json!([1, 2])).unwrap_err();
        let messages = err.normalized_messages();
        assert!(messages[SCHEMA_KEY].is_array());
    }

    #[test]
    fn nested_paths_build_nested_maps() {
        let err = SchemaError {
            schema: "Outer".into(),
            violations: vec![
                Violation {
                    path: vec!["q".into(), "provider".into()],
                    message: "bad".into(),
                },
                Violation {
                    path: vec!["q".into()],
                    message: "also bad".into(),
                },
            ],
        };
        assert_eq!(
            err.normalized_messages(),
            json!({"q": {"provider": ["bad"], "_schema": ["also bad"]}})
        );
    }

    #[test]
    fn leaf_then_child_promotes_leaf_messages() {
        let err = SchemaError {
            schema: "Outer".into(),
            violations: vec![
                Violation {
                    path: vec!["q".into()],
                    message: "first".into(),
                },
                Violation {
                    path: vec!["q".into(), "role".into()],
                    message: "second".into(),
                },
            ],
        };
        assert_eq!(
            err.normalized_messages(),
            json!({"q": {"_schema": ["first"], "role": ["second"]}})
        );
    }

    #[test]
    fn pointer_unescaping() {
        assert!(pointer_segments("").is_empty());
        assert_eq!(pointer_segments("/a/b~1c/d~0e"), vec!["a", "b/c", "d~e"]);
    }

    #[test]
    fn invalid_definition_is_reported() {
        let err = Schema::compile("Broken", &json!({"type": 12})).unwrap_err();
        assert_eq!(err.name, "Broken");
    }
}
