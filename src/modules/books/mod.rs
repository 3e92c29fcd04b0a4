pub mod models;
pub mod query;
pub mod render;
pub mod routes;
pub mod schema;
pub mod shortcode;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::Router;
use serde_json::json;
use shelf_kernel::content::ContentStore;
use shelf_kernel::schema::SchemaHost;
use shelf_kernel::settings::ListingSettings;
use shelf_kernel::shortcode::Shortcode;
use shelf_kernel::{InitCtx, Module};

use query::BookListing;
use render::ListingRenderer;
use shortcode::BooksListShortcode;

/// Book catalog: schema registration, listing, and the `[books_list]` directive
pub struct BooksModule {
    listing: BookListing,
    renderer: ListingRenderer,
    schema: Arc<dyn SchemaHost>,
}

impl BooksModule {
    pub fn new(
        store: Arc<dyn ContentStore>,
        schema: Arc<dyn SchemaHost>,
        labels: ListingSettings,
    ) -> Self {
        Self {
            listing: BookListing::new(store),
            renderer: ListingRenderer::new(labels),
            schema,
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let outcome = schema::register(ctx.schema).context("failed to register book schema")?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            book_type = ?outcome.book_type,
            fields = ?outcome.fields,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(routes::BooksState {
            listing: self.listing.clone(),
            renderer: self.renderer.clone(),
            schema: self.schema.clone(),
        })
    }

    fn shortcodes(&self) -> Vec<Arc<dyn Shortcode>> {
        vec![Arc::new(BooksListShortcode::new(
            self.listing.clone(),
            self.renderer.clone(),
        ))]
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({
            "description": "Internal server error",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books ordered by title",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Every book, title ascending",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "500": error.clone()
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "integer", "format": "int64" }
                        }],
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "404": {
                                "description": "Book not found",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "500": error.clone()
                        }
                    }
                },
                "/listing": {
                    "get": {
                        "summary": "Rendered book listing",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Escaped HTML listing",
                                "content": { "text/html": { "schema": { "type": "string" } } }
                            },
                            "500": error.clone()
                        }
                    }
                },
                "/schema": {
                    "get": {
                        "summary": "Registered book schema",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Type descriptor and field groups",
                                "content": { "application/json": { "schema": { "type": "object" } } }
                            }
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "description": "Identifier assigned by the store" },
                            "title": { "type": "string" },
                            "body": { "type": "string", "nullable": true },
                            "excerpt": { "type": "string", "nullable": true },
                            "featured_image": { "type": "string", "nullable": true },
                            "author": { "type": "string", "nullable": true },
                            "publication_year": { "type": "integer", "nullable": true },
                            "price": {
                                "type": "string",
                                "nullable": true,
                                "description": "Decimal with two places, e.g. 12.50"
                            },
                            "genre": {
                                "type": "string",
                                "nullable": true,
                                "description": "fiction, non-fiction, mystery, sci-fi, or legacy free text"
                            },
                            "rating": { "type": "integer", "minimum": 0, "maximum": 5, "nullable": true }
                        },
                        "required": ["id", "title"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(
    store: Arc<dyn ContentStore>,
    schema: Arc<dyn SchemaHost>,
    labels: ListingSettings,
) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store, schema, labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_db::MemoryContentStore;
    use shelf_kernel::settings::Settings;

    #[tokio::test]
    async fn test_init_registers_schema_once() {
        let store = Arc::new(MemoryContentStore::new());
        let module = create_module(store.clone(), store.clone(), ListingSettings::default());
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
            schema: &*store,
        };

        module.init(&ctx).await.unwrap();
        module.init(&ctx).await.unwrap();

        let schema = store.describe(models::BOOK_TYPE).unwrap().unwrap();
        assert_eq!(schema.field_groups.len(), 1);
    }

    #[test]
    fn test_contributes_books_list_shortcode() {
        let store = Arc::new(MemoryContentStore::new());
        let module = create_module(store.clone(), store, ListingSettings::default());
        let tags: Vec<_> = module.shortcodes().iter().map(|s| s.tag()).collect();
        assert_eq!(tags, [shortcode::TAG]);
    }

    #[test]
    fn test_openapi_declares_book_schema() {
        let store = Arc::new(MemoryContentStore::new());
        let module = create_module(store.clone(), store, ListingSettings::default());
        let openapi = module.openapi().unwrap();
        assert!(openapi["paths"]["/listing"]["get"].is_object());
        assert_eq!(openapi["components"]["schemas"]["Book"]["required"][0], "id");
    }
}
