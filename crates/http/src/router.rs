//! Router builder for the shelf HTTP server

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    response::Html,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::{Timestamp, Uuid};

use shelf_kernel::shortcode::ShortcodeSet;
use shelf_kernel::ModuleRegistry;

use crate::error::AppError;

pub const PAGE_RENDER_PATH: &str = "/pages/render";

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/api/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let api_path = format!("/api/{}", module_name);
        self.router = self.router.nest(&api_path, module_router);
        self
    }

    /// Serve `POST /pages/render`: the request body is page content, the
    /// response is the same content with every registered directive expanded.
    pub fn with_page_rendering(mut self, shortcodes: ShortcodeSet) -> Self {
        tracing::info!(tags = ?shortcodes.tags(), "page rendering enabled");
        self.router = self.router.route(
            PAGE_RENDER_PATH,
            post(render_page).with_state(Arc::new(shortcodes)),
        );
        self
    }

    /// Layers only wrap routes added before them, so call the `with_*`
    /// middleware methods after every route is in place.
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Tag each request with a time-ordered `x-request-id` and echo it back
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        self
    }

    /// Add OpenAPI documentation by collecting specs from all modules
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let openapi_spec = merged_openapi(registry);

        let openapi_obj: utoipa::openapi::OpenApi =
            match serde_json::from_value(openapi_spec.clone()) {
                Ok(doc) => doc,
                Err(error) => {
                    tracing::warn!(error = %error, "merged OpenAPI document is not well formed");
                    utoipa::openapi::OpenApiBuilder::new()
                        .info(
                            utoipa::openapi::InfoBuilder::new()
                                .title("Books Manager API")
                                .version("1.0.0")
                                .build(),
                        )
                        .build()
                }
            };

        self.router = self.router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi_obj),
        );

        // Raw document for external consumers
        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(openapi_spec.clone()) }),
        );

        self
    }

    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn render_page(
    State(shortcodes): State<Arc<ShortcodeSet>>,
    body: String,
) -> Result<Html<String>, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::bad_request("page body is empty"));
    }
    Ok(Html(shortcodes.expand(&body)))
}

/// Base document plus every module's paths (prefixed with `/api/{name}`) and
/// component schemas. A module's `/` maps to the bare prefix, as axum's `nest` does.
pub fn merged_openapi(registry: &ModuleRegistry) -> serde_json::Value {
    let mut openapi_spec = serde_json::json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Books Manager API",
            "version": "1.0.0",
            "description": "Book catalog listing service"
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    openapi_spec["components"]["schemas"]["ErrorResponse"] = serde_json::json!({
        "type": "object",
        "properties": {
            "error": {
                "type": "object",
                "properties": {
                    "code": { "type": "string" },
                    "message": { "type": "string" },
                    "details": { "type": "array", "items": {} },
                    "trace_id": { "type": "string" },
                    "timestamp": { "type": "string" }
                },
                "required": ["code", "message", "trace_id", "timestamp"]
            }
        },
        "required": ["error"]
    });

    openapi_spec["paths"]["/healthz"] = serde_json::json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": { "text/plain": { "schema": { "type": "string" } } }
                }
            }
        }
    });

    openapi_spec["paths"][PAGE_RENDER_PATH] = serde_json::json!({
        "post": {
            "summary": "Expand embedding directives in page content",
            "requestBody": {
                "required": true,
                "content": { "text/plain": { "schema": { "type": "string" } } }
            },
            "responses": {
                "200": {
                    "description": "Page content with directives replaced by their markup",
                    "content": { "text/html": { "schema": { "type": "string" } } }
                },
                "400": {
                    "description": "Empty page body",
                    "content": {
                        "application/json": {
                            "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                        }
                    }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(module_spec) = module.openapi() else {
            continue;
        };

        if let Some(paths) = module_spec.get("paths").and_then(|p| p.as_object()) {
            for (path, path_item) in paths {
                let prefixed_path = match path.as_str() {
                    "/" => format!("/api/{}", module.name()),
                    _ => format!("/api/{}{}", module.name(), path),
                };
                openapi_spec["paths"][prefixed_path] = path_item.clone();
            }
        }

        if let Some(schemas) = module_spec
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(|s| s.as_object())
        {
            for (schema_name, schema_def) in schemas {
                openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
            }
        }
    }

    openapi_spec
}

/// UUID v7 request ids, so ids sort by arrival time in the logs
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use shelf_kernel::shortcode::{Shortcode, ShortcodeAttrs};
    use tower::ServiceExt;

    struct Greeting;

    impl Shortcode for Greeting {
        fn tag(&self) -> &'static str {
            "greeting"
        }

        fn render(&self, _attrs: &ShortcodeAttrs) -> anyhow::Result<String> {
            Ok("<p>hello</p>".to_string())
        }
    }

    fn greeting_set() -> ShortcodeSet {
        let mut set = ShortcodeSet::new();
        set.register(Arc::new(Greeting));
        set
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_module_mounting() {
        let module_router = Router::new().route("/ping", get(|| async { "pong" }));
        let router = RouterBuilder::new()
            .mount_module("books", module_router)
            .build();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/books/ping")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "pong");
    }

    #[tokio::test]
    async fn test_page_rendering_expands_directives() {
        let router = RouterBuilder::new()
            .with_page_rendering(greeting_set())
            .build();

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(PAGE_RENDER_PATH)
                    .body(Body::from("<main>[greeting] [unknown]</main>"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            "<main><p>hello</p> [unknown]</main>"
        );
    }

    #[tokio::test]
    async fn test_empty_page_is_rejected() {
        let router = RouterBuilder::new()
            .with_page_rendering(greeting_set())
            .build();

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(PAGE_RENDER_PATH)
                    .body(Body::from("  \n"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_middleware_chain_sets_request_id() {
        let router = RouterBuilder::new()
            .route("/health", get(|| async { "ok" }))
            .with_tracing()
            .with_cors()
            .with_request_id()
            .with_timeout(5000)
            .build();

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request_id = response.headers().get("x-request-id").unwrap();
        let parsed = Uuid::parse_str(request_id.to_str().unwrap()).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }

    #[test]
    fn test_merged_openapi_without_modules() {
        let spec = merged_openapi(&ModuleRegistry::new());
        assert_eq!(spec["info"]["title"], "Books Manager API");
        assert!(spec["paths"]["/healthz"]["get"].is_object());
        assert!(spec["paths"][PAGE_RENDER_PATH]["post"].is_object());
        assert!(spec["components"]["schemas"]["ErrorResponse"].is_object());
    }
}
