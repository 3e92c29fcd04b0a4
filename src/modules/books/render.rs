//! HTML rendering of the book listing.
//!
//! Markup lives in `templates/books_list.html`. The template name ends in
//! `.html`, so minijinja auto-escapes every interpolated value, labels
//! included. Markup contract:
//!
//! ```text
//! div.books-manager-list
//!   div.books-grid
//!     div.book-card
//!       h3.book-title
//!       div.book-meta
//!         p.book-author, p.book-year, [p.book-genre], [p.book-description]
//!   | p.no-books
//!   | p.books-error
//! ```

use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use serde::Serialize;
use shelf_kernel::settings::ListingSettings;

use super::models::BookRecord;
use super::query::ListingError;

pub const BOOKS_LIST_TEMPLATE: &str = include_str!("templates/books_list.html");
const TEMPLATE_NAME: &str = "books_list.html";

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.add_template(TEMPLATE_NAME, BOOKS_LIST_TEMPLATE)
        .expect("books list template is valid");
    env
});

/// One card's worth of display text. Blocks that may be suppressed are `None`.
#[derive(Debug, Serialize)]
struct Card<'a> {
    title: &'a str,
    author: &'a str,
    year: String,
    genre: Option<&'a str>,
    excerpt: Option<&'a str>,
}

impl<'a> Card<'a> {
    fn from_record(book: &'a BookRecord) -> Self {
        Self {
            title: &book.title,
            author: book.author.as_deref().unwrap_or(""),
            year: book
                .publication_year
                .map(|year| year.to_string())
                .unwrap_or_default(),
            genre: book.genre.as_ref().map(|genre| genre.key()).filter(|g| is_shown(g)),
            excerpt: book.excerpt.as_deref().filter(|e| is_shown(e)),
        }
    }
}

/// Empty text and a lone `"0"` both count as absent.
fn is_shown(text: &str) -> bool {
    !text.is_empty() && text != "0"
}

/// Renders book listings with configured labels.
#[derive(Debug, Clone, Default)]
pub struct ListingRenderer {
    labels: ListingSettings,
}

impl ListingRenderer {
    pub fn new(labels: ListingSettings) -> Self {
        Self { labels }
    }

    /// Listing markup for `books`, in the order given.
    pub fn render(&self, books: &[BookRecord]) -> Result<String, ListingError> {
        let cards: Vec<Card<'_>> = books.iter().map(Card::from_record).collect();
        self.render_template(cards, false)
    }

    /// Notice shown in place of the listing when books could not be read.
    pub fn render_failure(&self) -> Result<String, ListingError> {
        self.render_template(Vec::new(), true)
    }

    fn render_template(&self, books: Vec<Card<'_>>, failed: bool) -> Result<String, ListingError> {
        let template = TEMPLATES.get_template(TEMPLATE_NAME)?;
        Ok(template.render(context! {
            books => books,
            labels => &self.labels,
            failed => failed,
        })?)
    }
}
