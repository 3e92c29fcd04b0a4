use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Module};
use crate::shortcode::ShortcodeSet;

/// Core module initialization order (excluding HTTP server)
const CORE_MODULE_ORDER: &[&str] = &[
    "content", // Content store, seeded on start
               // Note: HTTP server is started separately after all modules are initialized
];

/// Module registry for managing module lifecycle with core/custom separation
pub struct ModuleRegistry {
    core_modules: Vec<Arc<dyn Module>>,
    custom_modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            core_modules: Vec::new(),
            custom_modules: Vec::new(),
        }
    }

    /// Register a core module with the registry
    pub fn register_core(&mut self, module: Arc<dyn Module>) {
        self.core_modules.push(module);
    }

    /// Register a custom module with the registry
    pub fn register_custom(&mut self, module: Arc<dyn Module>) {
        self.custom_modules.push(module);
    }

    /// Get all registered modules (core + custom)
    pub fn modules(&self) -> Vec<&Arc<dyn Module>> {
        let mut all_modules = Vec::new();
        all_modules.extend(self.core_modules.iter());
        all_modules.extend(self.custom_modules.iter());
        all_modules
    }

    /// Get a module by name (searches both core and custom modules)
    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.core_modules
            .iter()
            .find(|module| module.name() == name)
            .or_else(|| {
                self.custom_modules
                    .iter()
                    .find(|module| module.name() == name)
            })
    }

    /// Initialize core modules in the correct order
    pub async fn init_core_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            "initializing core modules in order: {:?}",
            CORE_MODULE_ORDER
        );

        for module in self.ordered_core_modules() {
            tracing::info!(module = module.name(), "initializing core module");

            module.init(ctx).await.with_context(|| {
                format!("failed to initialize core module '{}'", module.name())
            })?;
        }

        Ok(())
    }

    /// Initialize custom modules
    pub async fn init_custom_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} custom modules", self.custom_modules.len());

        for module in &self.custom_modules {
            tracing::info!(module = module.name(), "initializing custom module");

            module.init(ctx).await.with_context(|| {
                format!("failed to initialize custom module '{}'", module.name())
            })?;
        }

        Ok(())
    }

    /// Start core modules in the correct order
    pub async fn start_core_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("starting core modules in order: {:?}", CORE_MODULE_ORDER);

        for module in self.ordered_core_modules() {
            tracing::info!(module = module.name(), "starting core module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start core module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Start custom modules
    pub async fn start_custom_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("starting {} custom modules", self.custom_modules.len());

        for module in &self.custom_modules {
            tracing::info!(module = module.name(), "starting custom module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start custom module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Run the whole startup sequence: init core, init custom, start core,
    /// start custom. Schema registration therefore precedes any seeding.
    pub async fn boot(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.init_core_modules(ctx).await?;
        self.init_custom_modules(ctx).await?;
        self.start_core_modules(ctx).await?;
        self.start_custom_modules(ctx).await?;
        Ok(())
    }

    /// Stop custom modules first (reverse order)
    pub async fn stop_custom_modules(&self) -> anyhow::Result<()> {
        tracing::info!("stopping {} custom modules", self.custom_modules.len());

        for module in self.custom_modules.iter().rev() {
            tracing::info!(module = module.name(), "stopping custom module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop custom module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop core modules in reverse order
    pub async fn stop_core_modules(&self) -> anyhow::Result<()> {
        tracing::info!("stopping core modules in reverse order");

        let mut ordered = self.ordered_core_modules();
        ordered.reverse();
        for module in ordered {
            tracing::info!(module = module.name(), "stopping core module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop core module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Collect the embedding directives of every module
    pub fn collect_shortcodes(&self) -> ShortcodeSet {
        let mut set = ShortcodeSet::new();
        for module in self.modules() {
            for shortcode in module.shortcodes() {
                tracing::debug!(
                    module = module.name(),
                    tag = shortcode.tag(),
                    "collecting shortcode"
                );
                set.register(shortcode);
            }
        }
        set
    }

    /// Core modules listed in `CORE_MODULE_ORDER`, in that order. Unknown core
    /// modules are skipped.
    fn ordered_core_modules(&self) -> Vec<&Arc<dyn Module>> {
        CORE_MODULE_ORDER
            .iter()
            .filter_map(|&name| self.core_modules.iter().find(|m| m.name() == name))
            .collect()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldGroup, Registration, SchemaError, SchemaHost, TypeDescriptor, TypeSchema};
    use crate::settings::Settings;
    use crate::shortcode::{Shortcode, ShortcodeAttrs};
    use std::sync::Mutex;

    #[derive(Default)]
    struct NullSchema;

    impl SchemaHost for NullSchema {
        fn register_type(&self, _descriptor: TypeDescriptor) -> Result<Registration, SchemaError> {
            Ok(Registration::Created)
        }

        fn register_field_group(&self, _group: FieldGroup) -> Result<Registration, SchemaError> {
            Err(SchemaError::FieldsUnavailable)
        }

        fn describe(&self, _type_key: &str) -> Result<Option<TypeSchema>, SchemaError> {
            Ok(None)
        }
    }

    struct Marker;

    impl Shortcode for Marker {
        fn tag(&self) -> &'static str {
            "marker"
        }

        fn render(&self, _attrs: &ShortcodeAttrs) -> anyhow::Result<String> {
            Ok("<hr>".to_string())
        }
    }

    struct TestModule {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Module for TestModule {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(format!("init:{}", self.name));
            Ok(())
        }

        async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(format!("start:{}", self.name));
            Ok(())
        }

        fn shortcodes(&self) -> Vec<Arc<dyn Shortcode>> {
            vec![Arc::new(Marker)]
        }
    }

    #[test]
    fn test_module_registry_creation() {
        let registry = ModuleRegistry::new();
        assert!(registry.modules().is_empty()); // No modules registered yet
    }

    #[tokio::test]
    async fn test_boot_initializes_everything_before_starting() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        registry.register_core(Arc::new(TestModule {
            name: "content",
            log: log.clone(),
        }));
        registry.register_custom(Arc::new(TestModule {
            name: "books",
            log: log.clone(),
        }));

        let settings = Settings::default();
        let schema = NullSchema;
        let ctx = InitCtx {
            settings: &settings,
            schema: &schema,
        };
        registry.boot(&ctx).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            ["init:content", "init:books", "start:content", "start:books"]
        );

        registry.stop_custom_modules().await.unwrap();
        registry.stop_core_modules().await.unwrap();
    }

    #[test]
    fn test_get_module_searches_core_and_custom() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        registry.register_custom(Arc::new(TestModule { name: "books", log }));

        assert!(registry.get_module("books").is_some());
        assert!(registry.get_module("content").is_none());
    }

    #[test]
    fn test_collect_shortcodes() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        registry.register_custom(Arc::new(TestModule { name: "books", log }));

        let shortcodes = registry.collect_shortcodes();
        assert!(shortcodes.contains("marker"));
        assert_eq!(shortcodes.expand("[marker]"), "<hr>");
    }
}
