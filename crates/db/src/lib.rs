//! Content store factory and the `content` core module.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use shelf_kernel::settings::DatabaseSettings;
use shelf_kernel::{InitCtx, Module};

pub mod memory;
pub mod seed;
mod validate;

pub use memory::MemoryContentStore;
pub use seed::SeedFile;

/// Build the host store described by `settings`.
pub fn connect(settings: &DatabaseSettings) -> Arc<MemoryContentStore> {
    tracing::info!(
        target: "shelf-db",
        field_groups = settings.field_groups,
        "content store ready"
    );
    Arc::new(MemoryContentStore::with_field_groups(settings.field_groups))
}

/// Core module owning the store lifecycle. Seeds entries on start, after every
/// module has registered its schema.
pub struct ContentModule {
    store: Arc<MemoryContentStore>,
    seed_path: Option<PathBuf>,
}

impl ContentModule {
    pub fn new(store: Arc<MemoryContentStore>, seed_path: Option<PathBuf>) -> Self {
        Self { store, seed_path }
    }
}

#[async_trait]
impl Module for ContentModule {
    fn name(&self) -> &'static str {
        "content"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            field_groups = self.store.field_groups_enabled(),
            "content module initialized"
        );
        Ok(())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let Some(path) = &self.seed_path else {
            tracing::info!(module = self.name(), "no seed file configured");
            return Ok(());
        };

        let ids = SeedFile::read(path)?.import(&*self.store)?;
        tracing::info!(
            module = self.name(),
            path = %path.display(),
            imported = ids.len(),
            "seed entries imported"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "content module stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_kernel::content::ContentStore;
    use shelf_kernel::schema::{SchemaHost, TypeDescriptor, TypeLabels};
    use shelf_kernel::settings::Settings;

    #[test]
    fn test_connect_honours_field_group_toggle() {
        let settings = DatabaseSettings {
            seed_path: None,
            field_groups: false,
        };
        assert!(!connect(&settings).field_groups_enabled());
    }

    #[tokio::test]
    async fn test_start_imports_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, r#"{"type_key": "note", "entries": [{"title": "x"}]}"#).unwrap();

        let store = Arc::new(MemoryContentStore::new());
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

        let module = ContentModule::new(store.clone(), Some(path));
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
            schema: &*store,
        };
        module.init(&ctx).await.unwrap();
        module.start(&ctx).await.unwrap();

        assert_eq!(store.entry_count().unwrap(), 1);
        assert!(store.get_entry(shelf_kernel::content::EntryId(1)).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_start_without_seed_is_a_no_op() {
        let store = Arc::new(MemoryContentStore::new());
        let module = ContentModule::new(store.clone(), None);
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
            schema: &*store,
        };
        module.start(&ctx).await.unwrap();
        assert_eq!(store.entry_count().unwrap(), 0);
    }
}
