//! Books Manager
//!
//! A book catalog built on the shelf framework: the `book` content type and
//! its field group, a title-ordered listing, and the `[books_list]` directive
//! that renders it inside page content.

pub mod modules;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use shelf_db::{ContentModule, MemoryContentStore};
use shelf_kernel::settings::Settings;
use shelf_kernel::shortcode::ShortcodeSet;
use shelf_kernel::{InitCtx, ModuleRegistry};

pub use modules::books;

/// The assembled application: host store, module registry, and settings.
pub struct App {
    settings: Settings,
    store: Arc<MemoryContentStore>,
    registry: ModuleRegistry,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        let store = shelf_db::connect(&settings.database);

        let mut registry = ModuleRegistry::new();
        registry.register_core(Arc::new(ContentModule::new(
            store.clone(),
            settings.database.seed_path.clone(),
        )));
        modules::register_all(&mut registry, &store, &settings);

        Self {
            settings,
            store,
            registry,
        }
    }

    /// Initialize then start every module. Schema registration happens here,
    /// before any seed entry is written.
    pub async fn boot(&self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
            schema: &*self.store,
        };
        self.registry
            .boot(&ctx)
            .await
            .context("failed to boot modules")?;
        tracing::info!(
            env = ?self.settings.environment,
            modules = self.registry.modules().len(),
            "books manager booted"
        );
        Ok(())
    }

    pub async fn serve(&self) -> anyhow::Result<()> {
        shelf_http::start_server(&self.registry, &self.settings).await
    }

    /// Stop custom modules first, then core ones.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.registry.stop_custom_modules().await?;
        self.registry.stop_core_modules().await?;
        tracing::info!("books manager stopped");
        Ok(())
    }

    /// The HTTP surface without binding a socket
    pub fn router(&self) -> Router {
        shelf_http::build_router(&self.registry, &self.settings)
    }

    /// Every directive the registered modules contribute
    pub fn shortcodes(&self) -> ShortcodeSet {
        self.registry.collect_shortcodes()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<MemoryContentStore> {
        &self.store
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }
}
