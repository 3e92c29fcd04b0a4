use shelf_kernel::shortcode::{Shortcode, ShortcodeAttrs};

use super::query::BookListing;
use super::render::ListingRenderer;

pub const TAG: &str = "books_list";

/// `[books_list]`: the full listing. Attributes are accepted and ignored.
pub struct BooksListShortcode {
    listing: BookListing,
    renderer: ListingRenderer,
}

impl BooksListShortcode {
    pub fn new(listing: BookListing, renderer: ListingRenderer) -> Self {
        Self { listing, renderer }
    }
}

impl Shortcode for BooksListShortcode {
    fn tag(&self) -> &'static str {
        TAG
    }

    fn render(&self, attrs: &ShortcodeAttrs) -> anyhow::Result<String> {
        if !attrs.is_empty() {
            tracing::debug!(tag = TAG, ?attrs, "books_list takes no attributes; ignoring");
        }

        match self.listing.list() {
            Ok(books) => Ok(self.renderer.render(&books)?),
            Err(error) => {
                tracing::error!(tag = TAG, error = %error, "book listing unavailable");
                Ok(self.renderer.render_failure()?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::query::tests::{book, book_store, FailingStore};
    use shelf_kernel::content::ContentStore;
    use shelf_kernel::shortcode::ShortcodeSet;
    use std::sync::Arc;

    fn page_set(store: Arc<dyn ContentStore>) -> ShortcodeSet {
        let mut set = ShortcodeSet::new();
        set.register(Arc::new(BooksListShortcode::new(
            BookListing::new(store),
            ListingRenderer::default(),
        )));
        set
    }

    #[test]
    fn test_expands_inside_page_content() {
        let store = book_store();
        store.create_entry(book("Dune")).unwrap();

        let page = page_set(store).expand("<h2>Catalog</h2>\n[books_list]\n<footer/>");
        assert!(page.starts_with("<h2>Catalog</h2>\n<div class=\"books-manager-list\">"));
        assert!(page.contains("<h3 class=\"book-title\">Dune</h3>"));
        assert!(page.ends_with("</div>\n\n<footer/>"));
    }

    #[test]
    fn test_attributes_do_not_filter() {
        let store = book_store();
        store.create_entry(book("Dune")).unwrap();
        store.create_entry(book("Emma")).unwrap();

        let set = page_set(store);
        assert_eq!(
            set.expand(r#"[books_list genre="mystery" limit="1"]"#),
            set.expand("[books_list]")
        );
    }

    #[test]
    fn test_empty_catalog_renders_notice() {
        let page = page_set(book_store()).expand("[books_list /]");
        assert!(page.contains("<p class=\"no-books\">"));
    }

    #[test]
    fn test_storage_fault_renders_failure_notice() {
        let page = page_set(Arc::new(FailingStore)).expand("<main>[books_list]</main>");
        assert!(page.starts_with("<main><div class=\"books-manager-list\">"));
        assert!(page.contains("books-error"));
        assert!(!page.contains("no-books"));
        assert!(page.ends_with("</main>"));
    }
}
