pub mod books;

use std::sync::Arc;

use shelf_db::MemoryContentStore;
use shelf_kernel::settings::Settings;
use shelf_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    store: &Arc<MemoryContentStore>,
    settings: &Settings,
) {
    registry.register_custom(books::create_module(
        store.clone(),
        store.clone(),
        settings.listing.clone(),
    ));
}
