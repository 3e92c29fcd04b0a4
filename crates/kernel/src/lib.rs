//! Kernel of the shelf framework: module lifecycle, layered settings, the host
//! content model (store and schema registration), and embedding directives.

pub mod content;
pub mod module;
pub mod registry;
pub mod schema;
pub mod settings;
pub mod shortcode;

pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
