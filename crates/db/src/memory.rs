use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use shelf_kernel::content::{
    ContentStore, Direction, Entry, EntryId, FieldViolation, NewEntry, OrderBy, StoreError,
    TypeQuery,
};
use shelf_kernel::schema::{
    FieldGroup, Registration, SchemaError, SchemaHost, TypeDescriptor, TypeSchema,
};

use crate::validate;

#[derive(Default)]
struct State {
    types: BTreeMap<String, TypeDescriptor>,
    groups: BTreeMap<String, FieldGroup>,
    entries: BTreeMap<EntryId, StoredEntry>,
    next_id: u64,
}

struct StoredEntry {
    entry: Entry,
    fields: BTreeMap<String, Value>,
}

/// Process-local host store. Implements both the content store and the
/// schema registration side of the host.
pub struct MemoryContentStore {
    state: RwLock<State>,
    fields_enabled: bool,
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContentStore {
    /// Store with field management available.
    pub fn new() -> Self {
        Self::with_field_groups(true)
    }

    /// Store whose field management capability is switched on or off.
    pub fn with_field_groups(enabled: bool) -> Self {
        Self {
            state: RwLock::new(State::default()),
            fields_enabled: enabled,
        }
    }

    pub fn field_groups_enabled(&self) -> bool {
        self.fields_enabled
    }

    pub fn entry_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.entries.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Fault("content state lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Fault("content state lock poisoned".to_string()))
    }
}

/// Title collation: accent- and case-insensitive first, then exact text.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Decomposed, combining marks dropped, lowercased: "Émile" keys as "emile".
fn collation_key(title: &str) -> impl Iterator<Item = char> + '_ {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

impl ContentStore for MemoryContentStore {
    fn query_by_type(&self, query: &TypeQuery) -> Result<Vec<Entry>, StoreError> {
        let state = self.read()?;
        if !state.types.contains_key(&query.type_key) {
            return Err(StoreError::UnknownType(query.type_key.clone()));
        }

        let mut entries: Vec<Entry> = state
            .entries
            .values()
            .filter(|stored| stored.entry.type_key == query.type_key)
            .map(|stored| stored.entry.clone())
            .collect();

        entries.sort_by(|a, b| {
            let ordering = match query.order_by {
                OrderBy::Title => compare_titles(&a.title, &b.title).then(a.id.cmp(&b.id)),
                OrderBy::Id => a.id.cmp(&b.id),
            };
            match query.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });

        if let Some(limit) = query.limit {
            entries.truncate(limit);
        }

        tracing::debug!(
            type_key = %query.type_key,
            count = entries.len(),
            "content query served"
        );
        Ok(entries)
    }

    fn get_entry(&self, id: EntryId) -> Result<Option<Entry>, StoreError> {
        Ok(self.read()?.entries.get(&id).map(|stored| stored.entry.clone()))
    }

    fn get_field(&self, id: EntryId, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .read()?
            .entries
            .get(&id)
            .and_then(|stored| stored.fields.get(key).cloned()))
    }

    fn create_entry(&self, entry: NewEntry) -> Result<EntryId, StoreError> {
        let mut state = self.write()?;
        if !state.types.contains_key(&entry.type_key) {
            return Err(StoreError::UnknownType(entry.type_key));
        }

        let mut violations = Vec::new();
        if entry.title.trim().is_empty() {
            violations.push(FieldViolation::new("title", "is required"));
        }
        violations.extend(validate::check_fields(
            state
                .groups
                .values()
                .filter(|group| group.type_key() == entry.type_key),
            &entry.fields,
        ));
        if !violations.is_empty() {
            tracing::debug!(
                type_key = %entry.type_key,
                violations = violations.len(),
                "entry rejected"
            );
            return Err(StoreError::Rejected(violations));
        }

        state.next_id += 1;
        let id = EntryId(state.next_id);
        let NewEntry {
            type_key,
            title,
            body,
            excerpt,
            featured_image,
            fields,
        } = entry;

        tracing::debug!(%id, type_key = %type_key, "entry created");
        state.entries.insert(
            id,
            StoredEntry {
                entry: Entry {
                    id,
                    type_key,
                    title,
                    body,
                    excerpt,
                    featured_image,
                },
                fields,
            },
        );
        Ok(id)
    }
}

impl SchemaHost for MemoryContentStore {
    fn register_type(&self, descriptor: TypeDescriptor) -> Result<Registration, SchemaError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| SchemaError::Fault("content state lock poisoned".to_string()))?;

        if let Some(existing) = state.types.get(&descriptor.key) {
            if *existing != descriptor {
                tracing::warn!(
                    type_key = %descriptor.key,
                    "type already registered with a different descriptor; keeping the first"
                );
            }
            return Ok(Registration::AlreadyRegistered);
        }

        tracing::info!(type_key = %descriptor.key, "content type registered");
        state.types.insert(descriptor.key.clone(), descriptor);
        Ok(Registration::Created)
    }

    fn register_field_group(&self, group: FieldGroup) -> Result<Registration, SchemaError> {
        if !self.fields_enabled {
            return Err(SchemaError::FieldsUnavailable);
        }

        let mut state = self
            .state
            .write()
            .map_err(|_| SchemaError::Fault("content state lock poisoned".to_string()))?;

        if state.groups.contains_key(&group.key) {
            return Ok(Registration::AlreadyRegistered);
        }
        if !state.types.contains_key(group.type_key()) {
            return Err(SchemaError::UnknownType {
                group: group.key.clone(),
                type_key: group.type_key().to_string(),
            });
        }

        tracing::info!(
            group = %group.key,
            type_key = %group.type_key(),
            fields = group.fields.len(),
            "field group registered"
        );
        state.groups.insert(group.key.clone(), group);
        Ok(Registration::Created)
    }

    fn describe(&self, type_key: &str) -> Result<Option<TypeSchema>, SchemaError> {
        let state = self
            .state
            .read()
            .map_err(|_| SchemaError::Fault("content state lock poisoned".to_string()))?;
        let Some(descriptor) = state.types.get(type_key).cloned() else {
            return Ok(None);
        };
        let field_groups = state
            .groups
            .values()
            .filter(|group| group.type_key() == type_key)
            .cloned()
            .collect();
        Ok(Some(TypeSchema {
            descriptor,
            field_groups,
        }))
    }
}
