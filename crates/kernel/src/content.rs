//! Host content store contract.
//!
//! Modules never own persistence. They receive an `Arc<dyn ContentStore>` and
//! read typed entries plus loosely typed extended fields through it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier assigned by the store when an entry is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored content entry. Extended fields are read separately via
/// [`ContentStore::get_field`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub type_key: String,
    pub title: String,
    pub body: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
}

/// Payload for creating an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    #[serde(default)]
    pub type_key: String,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl NewEntry {
    pub fn new(type_key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            type_key: type_key.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn featured_image(mut self, image: impl Into<String>) -> Self {
        self.featured_image = Some(image.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    Title,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Query over all entries of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeQuery {
    pub type_key: String,
    pub order_by: OrderBy,
    pub direction: Direction,
    /// `None` returns every matching entry.
    pub limit: Option<usize>,
}

impl TypeQuery {
    /// Every entry of `type_key`, ordered by title ascending.
    pub fn all_by_title(type_key: impl Into<String>) -> Self {
        Self {
            type_key: type_key.into(),
            order_by: OrderBy::Title,
            direction: Direction::Ascending,
            limit: None,
        }
    }
}

/// A single write-time rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub problem: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem: problem.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.problem)
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    /// Infrastructure failure; callers must not treat it as an empty result.
    #[error("content store fault: {0}")]
    Fault(String),

    #[error("unknown content type '{0}'")]
    UnknownType(String),

    #[error("entry rejected: {}", join_violations(.0))]
    Rejected(Vec<FieldViolation>),
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read and write access to host-managed entries.
pub trait ContentStore: Send + Sync {
    /// Entries of one type, ordered and limited as requested. An empty vector
    /// means no entries exist.
    fn query_by_type(&self, query: &TypeQuery) -> Result<Vec<Entry>, StoreError>;

    fn get_entry(&self, id: EntryId) -> Result<Option<Entry>, StoreError>;

    /// Extended field value, `None` when the entry has no value for `key`.
    fn get_field(&self, id: EntryId, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Create an entry, enforcing every field group registered for its type.
    fn create_entry(&self, entry: NewEntry) -> Result<EntryId, StoreError>;
}
