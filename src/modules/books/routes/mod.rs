//! HTTP handlers for the Books module.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Html,
    routing::get,
    Json, Router,
};
use shelf_http::error::AppError;
use shelf_kernel::content::EntryId;
use shelf_kernel::schema::{SchemaHost, TypeSchema};

use super::models::{BookRecord, BOOK_TYPE};
use super::query::{BookListing, ListingError};
use super::render::ListingRenderer;

#[derive(Clone)]
pub struct BooksState {
    pub listing: BookListing,
    pub renderer: ListingRenderer,
    pub schema: Arc<dyn SchemaHost>,
}

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(list_books))
        .route("/health", get(health_check))
        .route("/listing", get(listing_html))
        .route("/schema", get(book_schema))
        .route("/{id}", get(get_book))
        .with_state(state)
}

/// Storage faults surface as internal errors, never as an empty list.
impl From<ListingError> for AppError {
    fn from(error: ListingError) -> Self {
        AppError::Internal(anyhow::Error::new(error))
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

/// Every book, ordered by title
async fn list_books(State(state): State<BooksState>) -> Result<Json<Vec<BookRecord>>, AppError> {
    let books = state.listing.list()?;
    Ok(Json(books))
}

/// Rendered listing markup
async fn listing_html(State(state): State<BooksState>) -> Result<Html<String>, AppError> {
    let books = state.listing.list()?;
    Ok(Html(state.renderer.render(&books)?))
}

/// A single book
async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<u64>,
) -> Result<Json<BookRecord>, AppError> {
    state
        .listing
        .find(EntryId(id))?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("book {id} not found")))
}

/// Registered book schema
async fn book_schema(State(state): State<BooksState>) -> Result<Json<TypeSchema>, AppError> {
    state
        .schema
        .describe(BOOK_TYPE)
        .map_err(anyhow::Error::new)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("book type is not registered"))
}
