//! Book content type and its extended fields.

use shelf_kernel::schema::{
    FieldDef, FieldGroup, LocationRule, Registration, SchemaError, SchemaHost, Supports,
    TypeDescriptor, TypeLabels,
};

use super::models::{fields, BOOK_TYPE, GENRE_CHOICES};

pub const FIELD_GROUP_KEY: &str = "group_books";

pub fn book_type() -> TypeDescriptor {
    TypeDescriptor {
        key: BOOK_TYPE.to_string(),
        labels: TypeLabels {
            name: "Books".to_string(),
            singular_name: "Book".to_string(),
            add_new: "Add book".to_string(),
            add_new_item: "Add new book".to_string(),
            edit_item: "Edit book".to_string(),
            all_items: "All books".to_string(),
        },
        public: true,
        has_archive: true,
        supports: vec![
            Supports::Title,
            Supports::Editor,
            Supports::Thumbnail,
            Supports::Excerpt,
        ],
        menu_icon: Some("dashicons-book-alt".to_string()),
    }
}

pub fn book_fields() -> FieldGroup {
    FieldGroup {
        key: FIELD_GROUP_KEY.to_string(),
        title: "Book details".to_string(),
        fields: vec![
            FieldDef::text("field_author", "Author", fields::AUTHOR).required(),
            FieldDef::number("field_year", "Publication year", fields::YEAR).required(),
            FieldDef::number("field_price", "Price", fields::PRICE)
                .required()
                .min(0.0)
                .step(0.01),
            FieldDef::select("field_genre", "Genre", fields::GENRE, GENRE_CHOICES),
            FieldDef::number("field_rating", "Rating", fields::RATING)
                .min(0.0)
                .max(5.0)
                .step(1.0),
        ],
        location: LocationRule::PostTypeIs(BOOK_TYPE.to_string()),
    }
}

/// What a registration pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaOutcome {
    pub book_type: Registration,
    /// `None` when the host has no field management.
    pub fields: Option<Registration>,
}

/// Declare the book type and its fields. Safe to call more than once.
pub fn register(host: &dyn SchemaHost) -> Result<SchemaOutcome, SchemaError> {
    let book_type = host.register_type(book_type())?;

    let fields = match host.register_field_group(book_fields()) {
        Ok(registration) => Some(registration),
        Err(SchemaError::FieldsUnavailable) => {
            tracing::info!(
                type_key = BOOK_TYPE,
                "field management unavailable; book fields not registered"
            );
            None
        }
        Err(error) => return Err(error),
    };

    tracing::debug!(?book_type, ?fields, "book schema registration finished");
    Ok(SchemaOutcome { book_type, fields })
}
