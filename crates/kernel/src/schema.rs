//! Host schema registration contract.

use serde::Serialize;
use thiserror::Error;

/// Admin-facing labels of a content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeLabels {
    pub name: String,
    pub singular_name: String,
    pub add_new: String,
    pub add_new_item: String,
    pub edit_item: String,
    pub all_items: String,
}

/// Built-in entry attributes a type opts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Supports {
    Title,
    Editor,
    Thumbnail,
    Excerpt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    pub key: String,
    pub labels: TypeLabels,
    pub public: bool,
    pub has_archive: bool,
    pub supports: Vec<Supports>,
    pub menu_icon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// One extended field. `name` is the key used to read values back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    pub key: String,
    pub label: String,
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

impl FieldDef {
    fn base(key: &str, label: &str, name: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            name: name.to_string(),
            kind,
            required: false,
            min: None,
            max: None,
            step: None,
            choices: Vec::new(),
        }
    }

    pub fn text(key: &str, label: &str, name: &str) -> Self {
        Self::base(key, label, name, FieldKind::Text)
    }

    pub fn number(key: &str, label: &str, name: &str) -> Self {
        Self::base(key, label, name, FieldKind::Number)
    }

    pub fn select(key: &str, label: &str, name: &str, choices: &[(&str, &str)]) -> Self {
        let mut field = Self::base(key, label, name, FieldKind::Select);
        field.choices = choices
            .iter()
            .map(|(value, label)| Choice {
                value: value.to_string(),
                label: label.to_string(),
            })
            .collect();
        field
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }
}

/// Where a field group applies. Only content-type equality is supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "param", content = "value", rename_all = "snake_case")]
pub enum LocationRule {
    PostTypeIs(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldGroup {
    pub key: String,
    pub title: String,
    pub fields: Vec<FieldDef>,
    pub location: LocationRule,
}

impl FieldGroup {
    /// Type key this group attaches to.
    pub fn type_key(&self) -> &str {
        match &self.location {
            LocationRule::PostTypeIs(key) => key,
        }
    }
}

/// Outcome of a keyed registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Registration {
    Created,
    AlreadyRegistered,
}

/// A type together with the field groups attached to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSchema {
    #[serde(rename = "type")]
    pub descriptor: TypeDescriptor,
    pub field_groups: Vec<FieldGroup>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The host runs without field management; only base types exist.
    #[error("field management capability is not available")]
    FieldsUnavailable,

    #[error("field group '{group}' targets unregistered type '{type_key}'")]
    UnknownType { group: String, type_key: String },

    #[error("schema registry fault: {0}")]
    Fault(String),
}

/// Registration side of the host content model.
pub trait SchemaHost: Send + Sync {
    /// Register a content type. A repeat call with the same key is a no-op.
    fn register_type(&self, descriptor: TypeDescriptor) -> Result<Registration, SchemaError>;

    /// Register an extended field group. A repeat call with the same key is a
    /// no-op.
    fn register_field_group(&self, group: FieldGroup) -> Result<Registration, SchemaError>;

    /// Registered type plus its field groups, `None` for an unknown type.
    fn describe(&self, type_key: &str) -> Result<Option<TypeSchema>, SchemaError>;
}
