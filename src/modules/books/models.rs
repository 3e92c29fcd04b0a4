use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;
use shelf_kernel::content::EntryId;

/// Content type key of a book.
pub const BOOK_TYPE: &str = "book";

/// Extended field names of a book, as stored by the host.
pub mod fields {
    pub const AUTHOR: &str = "book_author";
    pub const YEAR: &str = "book_year";
    pub const PRICE: &str = "book_price";
    pub const GENRE: &str = "book_genre";
    pub const RATING: &str = "book_rating";
}

/// One catalog item.
///
/// `author`, `publication_year` and `price` are required when a book is
/// written, but records written before the schema existed (or by other
/// clients) may lack them, so every extended field is optional on read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookRecord {
    pub id: EntryId,
    pub title: String,
    pub body: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub author: Option<String>,
    pub publication_year: Option<i64>,
    pub price: Option<Price>,
    pub genre: Option<Genre>,
    pub rating: Option<u8>,
}

impl BookRecord {
    /// A record with only the built-in attributes set.
    pub fn new(id: EntryId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            body: None,
            excerpt: None,
            featured_image: None,
            author: None,
            publication_year: None,
            price: None,
            genre: None,
            rating: None,
        }
    }
}

/// Choice keys and labels of the genre field.
pub const GENRE_CHOICES: &[(&str, &str)] = &[
    ("fiction", "Fiction"),
    ("non-fiction", "Non-Fiction"),
    ("mystery", "Mystery"),
    ("sci-fi", "Science-Fiction"),
];

/// Book genre. Keys outside the declared choices are kept as opaque text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Genre {
    Fiction,
    NonFiction,
    Mystery,
    SciFi,
    Other(String),
}

impl Genre {
    pub fn from_key(key: &str) -> Self {
        match key {
            "fiction" => Genre::Fiction,
            "non-fiction" => Genre::NonFiction,
            "mystery" => Genre::Mystery,
            "sci-fi" => Genre::SciFi,
            other => Genre::Other(other.to_string()),
        }
    }

    /// The stored choice key.
    pub fn key(&self) -> &str {
        match self {
            Genre::Fiction => "fiction",
            Genre::NonFiction => "non-fiction",
            Genre::Mystery => "mystery",
            Genre::SciFi => "sci-fi",
            Genre::Other(text) => text,
        }
    }

    pub fn label(&self) -> &str {
        GENRE_CHOICES
            .iter()
            .find(|(key, _)| *key == self.key())
            .map_or(self.key(), |(_, label)| *label)
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(key) => Some(Self::from_key(key)),
            Value::Number(n) => Some(Genre::Other(n.to_string())),
            _ => None,
        }
    }
}

impl Serialize for Genre {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// Non-negative amount with cent precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price {
    cents: u64,
}

impl Price {
    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    pub const fn cents(&self) -> u64 {
        self.cents
    }

    /// Parse a stored amount. Negative, non-finite or non-numeric values give
    /// `None`; extra precision rounds to the nearest cent.
    pub fn from_value(value: &Value) -> Option<Self> {
        let amount = number(value)?;
        if !amount.is_finite() || amount < 0.0 {
            return None;
        }
        Some(Self::from_cents((amount * 100.0).round() as u64))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Text, or a number written where text was expected.
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A whole number, also accepted as integral float or numeric text.
pub fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// A rating in `0..=5`.
pub fn rating_value(value: &Value) -> Option<u8> {
    integer_value(value)
        .filter(|rating| (0..=5).contains(rating))
        .and_then(|rating| u8::try_from(rating).ok())
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
