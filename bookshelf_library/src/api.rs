use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

pub type UserId = i32;
pub type BookId = i32;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Details of a catalog entry as found in the external book catalog
pub struct BookDetails {
    /// Identifier of the book in the external catalog, books are deduplicated by it
    pub catalog_id: String,
    pub title: String,
    /// Authors joined into a single text, e.g. "Terry Pratchett, Neil Gaiman"
    pub authors: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl BookDetails {
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            catalog_id: self.catalog_id,
            title: self.title,
            authors: self.authors,
            description: self.description,
            cover_url: self.cover_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Catalog entry, never changes after it was added
pub struct Book {
    pub id: BookId,
    pub catalog_id: String,
    pub title: String,
    pub authors: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash, Apiv2Schema)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    WantToRead,
    Reading,
    Read,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::WantToRead => "want_to_read",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Read => "read",
        }
    }
}

impl std::str::FromStr for ReadingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "want_to_read" => Ok(ReadingStatus::WantToRead),
            "reading" => Ok(ReadingStatus::Reading),
            "read" => Ok(ReadingStatus::Read),
            other => Err(format!("Unknown reading status {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Relationship of a user to a single book, there is at most one per user and book
pub struct Interaction {
    pub user_id: UserId,
    pub book_id: BookId,
    pub status: ReadingStatus,
    /// Rating 1-5, absent until the user rates the book
    #[serde(default)]
    pub rating: Option<u8>,
    pub added_at: i64,
    pub status_changed_at: i64,
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
#[error("Rating {0} is outside of 1-5")]
pub struct RatingError(pub u8);

/// Rating validated to be within 1-5
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> Result<Self, RatingError> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ShelfEntry {
    pub book: Book,
    pub status: ReadingStatus,
    #[serde(default)]
    pub rating: Option<u8>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Books of the user grouped by reading status, each shelf keeps the order books were added in
pub struct Shelves {
    pub want_to_read: Vec<ShelfEntry>,
    pub reading: Vec<ShelfEntry>,
    pub read: Vec<ShelfEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct AddToShelfRequest {
    pub status: ReadingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct MoveRequest {
    pub status: ReadingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct RateRequest {
    pub rating: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct GetCatalogResponse {
    pub books: Vec<Book>,
}
