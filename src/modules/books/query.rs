use std::sync::Arc;

use shelf_kernel::content::{ContentStore, Entry, EntryId, StoreError, TypeQuery};
use thiserror::Error;

use super::models::{self, fields, BookRecord, Genre, Price, BOOK_TYPE};

#[derive(Error, Debug)]
pub enum ListingError {
    #[error("book listing query failed: {0}")]
    Storage(#[from] StoreError),

    #[error("book listing template failed: {0}")]
    Template(#[from] minijinja::Error),
}

/// Read-only access to stored books.
#[derive(Clone)]
pub struct BookListing {
    store: Arc<dyn ContentStore>,
}

impl BookListing {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Every book, ordered by title, unlimited. No books is `Ok(vec![])`.
    pub fn list(&self) -> Result<Vec<BookRecord>, ListingError> {
        let entries = self.store.query_by_type(&TypeQuery::all_by_title(BOOK_TYPE))?;
        let books = entries
            .into_iter()
            .map(|entry| self.hydrate(entry))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = books.len(), "books listed");
        Ok(books)
    }

    /// A single book, `None` when the id is unknown or not a book.
    pub fn find(&self, id: EntryId) -> Result<Option<BookRecord>, ListingError> {
        match self.store.get_entry(id)? {
            Some(entry) if entry.type_key == BOOK_TYPE => Ok(Some(self.hydrate(entry)?)),
            _ => Ok(None),
        }
    }

    fn hydrate(&self, entry: Entry) -> Result<BookRecord, StoreError> {
        let id = entry.id;
        let field = |key: &str| self.store.get_field(id, key);

        let author = field(fields::AUTHOR)?;
        let year = field(fields::YEAR)?;
        let price = field(fields::PRICE)?;
        let genre = field(fields::GENRE)?;
        let rating = field(fields::RATING)?;

        let record = BookRecord {
            id,
            title: entry.title,
            body: entry.body,
            excerpt: entry.excerpt,
            featured_image: entry.featured_image,
            author: author.as_ref().and_then(models::text_value),
            publication_year: year.as_ref().and_then(models::integer_value),
            price: price.as_ref().and_then(Price::from_value),
            genre: genre.as_ref().and_then(Genre::from_value),
            rating: rating.as_ref().and_then(models::rating_value),
        };

        if record.price.is_none() && price.is_some() {
            tracing::debug!(%id, value = ?price, "unreadable book price ignored");
        }
        if record.rating.is_none() && rating.is_some() {
            tracing::debug!(%id, value = ?rating, "unreadable book rating ignored");
        }

        Ok(record)
    }
}
