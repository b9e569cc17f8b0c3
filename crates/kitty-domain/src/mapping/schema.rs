use serde_json::{Map, Value};
use std::sync::Arc;

use super::case::{camelize, camelize_keys, decamelize, decamelize_keys};

/// How a mapped field's value is carried across
#[derive(Clone)]
pub enum FieldTransform {
    /// Recursive default case conversion
    Convert,
    /// Value is copied verbatim, keys inside keep their spelling
    Preserve,
    /// Another schema applies to the nested object
    Nested(Arc<FieldSchema>),
    /// Caller-supplied value transforms, one per direction
    Custom {
        to_backend: fn(&Value) -> Value,
        to_ui: fn(&Value) -> Value,
    },
}

impl std::fmt::Debug for FieldTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldTransform::Convert => write!(f, "Convert"),
            FieldTransform::Preserve => write!(f, "Preserve"),
            FieldTransform::Nested(schema) => write!(f, "Nested({})", schema.name()),
            FieldTransform::Custom { .. } => write!(f, "Custom"),
        }
    }
}

/// Which directions a field travels in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Both,
    /// Read from the backend, never written back
    ReadOnly,
    /// Sent to the backend, never surfaced to the UI
    WriteOnly,
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub ui: String,
    pub backend: String,
    pub transform: FieldTransform,
    pub direction: Direction,
}

/// Mapping table between a UI-shaped record and its backend shape.
///
/// Fields without a rule fall back to plain case conversion.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    name: String,
    rules: Vec<FieldRule>,
}

impl FieldSchema {
    pub fn builder(name: impl Into<String>) -> FieldSchemaBuilder {
        FieldSchemaBuilder {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule_for_ui(&self, ui: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.ui == ui)
    }

    pub fn rule_for_backend(&self, backend: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.backend == backend)
    }

    /// UI shape -> backend shape. Arrays are mapped element-wise.
    pub fn to_backend(&self, value: &Value) -> Value {
        match value {
            Value::Object(obj) => {
                let mut out = Map::with_capacity(obj.len());
                for (key, field) in obj {
                    match self.rule_for_ui(key) {
                        Some(rule) if rule.direction == Direction::ReadOnly => {}
                        Some(rule) => {
                            let mapped = match &rule.transform {
                                FieldTransform::Convert => decamelize_keys(field),
                                FieldTransform::Preserve => field.clone(),
                                FieldTransform::Nested(schema) => schema.to_backend(field),
                                FieldTransform::Custom { to_backend, .. } => to_backend(field),
                            };
                            out.insert(rule.backend.clone(), mapped);
                        }
                        None => {
                            out.insert(decamelize(key), decamelize_keys(field));
                        }
                    }
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(items.iter().map(|v| self.to_backend(v)).collect()),
            other => other.clone(),
        }
    }

    /// Backend shape -> UI shape. Arrays are mapped element-wise.
    pub fn to_ui(&self, value: &Value) -> Value {
        match value {
            Value::Object(obj) => {
                let mut out = Map::with_capacity(obj.len());
                for (key, field) in obj {
                    match self.rule_for_backend(key) {
                        Some(rule) if rule.direction == Direction::WriteOnly => {}
                        Some(rule) => {
                            let mapped = match &rule.transform {
                                FieldTransform::Convert => camelize_keys(field),
                                FieldTransform::Preserve => field.clone(),
                                FieldTransform::Nested(schema) => schema.to_ui(field),
                                FieldTransform::Custom { to_ui, .. } => to_ui(field),
                            };
                            out.insert(rule.ui.clone(), mapped);
                        }
                        None => {
                            out.insert(camelize(key), camelize_keys(field));
                        }
                    }
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(items.iter().map(|v| self.to_ui(v)).collect()),
            other => other.clone(),
        }
    }
}

pub struct FieldSchemaBuilder {
    name: String,
    rules: Vec<FieldRule>,
}

impl FieldSchemaBuilder {
    /// Rename a field, converting keys inside it with the default rules
    pub fn rename(self, ui: &str, backend: &str) -> Self {
        self.rule(ui, backend, FieldTransform::Convert, Direction::Both)
    }

    /// Rename a field and copy its value verbatim
    pub fn preserve(self, ui: &str, backend: &str) -> Self {
        self.rule(ui, backend, FieldTransform::Preserve, Direction::Both)
    }

    pub fn nested(self, ui: &str, backend: &str, schema: FieldSchema) -> Self {
        self.rule(ui, backend, FieldTransform::Nested(Arc::new(schema)), Direction::Both)
    }

    pub fn custom(
        self,
        ui: &str,
        backend: &str,
        to_backend: fn(&Value) -> Value,
        to_ui: fn(&Value) -> Value,
    ) -> Self {
        self.rule(
            ui,
            backend,
            FieldTransform::Custom { to_backend, to_ui },
            Direction::Both,
        )
    }

    /// Field is read from the backend but never sent back
    pub fn read_only(self, ui: &str, backend: &str) -> Self {
        self.rule(ui, backend, FieldTransform::Convert, Direction::ReadOnly)
    }

    pub fn rule(
        mut self,
        ui: &str,
        backend: &str,
        transform: FieldTransform,
        direction: Direction,
    ) -> Self {
        self.rules.push(FieldRule {
            ui: ui.to_string(),
            backend: backend.to_string(),
            transform,
            direction,
        });
        self
    }

    pub fn build(self) -> FieldSchema {
        FieldSchema {
            name: self.name,
            rules: self.rules,
        }
    }
}
