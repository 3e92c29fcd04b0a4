//! JSON seed import.
//!
//! ```json
//! { "type_key": "book", "entries": [ { "title": "Dune", "fields": { ... } } ] }
//! ```
//!
//! Entries without their own `type_key` inherit the file's.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use shelf_kernel::content::{ContentStore, EntryId, NewEntry};

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub type_key: String,
    #[serde(default)]
    pub entries: Vec<NewEntry>,
}

impl SeedFile {
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse seed file {}", path.display()))
    }

    /// Write every entry through the validated create path. Stops at the
    /// first rejected entry.
    pub fn import(self, store: &dyn ContentStore) -> anyhow::Result<Vec<EntryId>> {
        let mut ids = Vec::with_capacity(self.entries.len());
        for (index, mut entry) in self.entries.into_iter().enumerate() {
            if entry.type_key.is_empty() {
                entry.type_key = self.type_key.clone();
            }
            let title = entry.title.clone();
            let id = store
                .create_entry(entry)
                .with_context(|| format!("seed entry #{index} ('{title}') was rejected"))?;
            ids.push(id);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryContentStore;
    use shelf_kernel::schema::{SchemaHost, TypeDescriptor, TypeLabels};

    fn store() -> MemoryContentStore {
        let store = MemoryContentStore::new();
        store
            .register_type(TypeDescriptor {
                key: "note".into(),
                labels: TypeLabels {
                    name: "Notes".into(),
                    singular_name: "Note".into(),
                    add_new: "Add".into(),
                    add_new_item: "Add note".into(),
                    edit_item: "Edit note".into(),
                    all_items: "All notes".into(),
                },
                public: true,
                has_archive: false,
                supports: vec![],
                menu_icon: None,
            })
            .unwrap();
        store
    }

    #[test]
    fn test_import_inherits_file_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(
            &path,
            r#"{"type_key": "note", "entries": [
                {"title": "First", "excerpt": "one", "fields": {"owner": "sam"}},
                {"title": "Second"}
            ]}"#,
        )
        .unwrap();

        let store = store();
        let ids = SeedFile::read(&path).unwrap().import(&store).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(store.entry_count().unwrap(), 2);
        let first = store.get_entry(ids[0]).unwrap().unwrap();
        assert_eq!(first.type_key, "note");
        assert_eq!(first.excerpt.as_deref(), Some("one"));
    }

    #[test]
    fn test_rejected_entry_names_index_and_title() {
        let seed: SeedFile =
            serde_json::from_str(r#"{"type_key": "note", "entries": [{"title": ""}]}"#).unwrap();
        let error = seed.import(&store()).unwrap_err();
        assert!(format!("{error:#}").contains("seed entry #0 ('')"));
    }

    #[test]
    fn test_missing_file_has_context() {
        let error = SeedFile::read(Path::new("/nonexistent/seed.json")).unwrap_err();
        assert!(error.to_string().contains("failed to read seed file"));
    }
}
