pub use in_memory_library_store::InMemoryLibraryStore;
pub use postgres_library_store::{PostgresLibraryStore, PostgresLibraryStoreConfig};

use crate::api::{
    Book, BookDetails, BookId, Interaction, Rating, ReadingStatus, ShelfEntry, Shelves, UserId,
};

mod in_memory_library_store;
mod postgres_library_store;

#[derive(Debug, thiserror::Error)]
pub enum LibraryStoreError {
    #[error("Book {0} not found")]
    BookNotFound(BookId),

    #[error("Book {1} is not on shelves of user {0}")]
    NotOnShelf(UserId, BookId),

    #[error("Book {1} is already on shelves of user {0}")]
    AlreadyOnShelf(UserId, BookId),

    #[error("Failed to deserialize book: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),

    #[error("Other error {0}")]
    Other(String),
}

#[async_trait::async_trait]
pub trait LibraryStore: Send + Sync {
    /// Adds book to the catalog, returns an id assigned to the book.
    /// If a book with the same catalog_id already exists its id is returned instead
    async fn add_book(&self, details: BookDetails) -> Result<BookId, LibraryStoreError>;

    async fn get_book(&self, book_id: BookId) -> Result<Book, LibraryStoreError>;

    /// Lists all books in the catalog ordered by id
    async fn list_catalog(&self) -> Result<Vec<Book>, LibraryStoreError>;

    /// Puts the book on one of user shelves, a book can be on user shelves only once
    async fn add_to_shelf(
        &self,
        user_id: UserId,
        book_id: BookId,
        status: ReadingStatus,
    ) -> Result<(), LibraryStoreError>;

    /// Moves the book to other shelf, moving to the same shelf changes nothing
    async fn move_book(
        &self,
        user_id: UserId,
        book_id: BookId,
        status: ReadingStatus,
    ) -> Result<(), LibraryStoreError>;

    async fn rate_book(
        &self,
        user_id: UserId,
        book_id: BookId,
        rating: Rating,
    ) -> Result<(), LibraryStoreError>;

    async fn remove_book(&self, user_id: UserId, book_id: BookId)
        -> Result<(), LibraryStoreError>;

    /// Lists all interactions of the user in the order books were added
    async fn list_interactions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Interaction>, LibraryStoreError>;

    /// Groups user books into shelves
    async fn shelves(&self, user_id: UserId) -> Result<Shelves, LibraryStoreError> {
        let mut shelves = Shelves::default();
        for interaction in self.list_interactions(user_id).await? {
            let entry = ShelfEntry {
                book: self.get_book(interaction.book_id).await?,
                status: interaction.status,
                rating: interaction.rating,
            };
            match interaction.status {
                ReadingStatus::WantToRead => shelves.want_to_read.push(entry),
                ReadingStatus::Reading => shelves.reading.push(entry),
                ReadingStatus::Read => shelves.read.push(entry),
            }
        }
        Ok(shelves)
    }
}

pub(crate) fn now_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|duration| duration.as_secs() as i64)
        .unwrap_or_default()
}
