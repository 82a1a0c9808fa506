use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI32, Ordering};

use crate::api::{Book, BookDetails, BookId, Interaction, Rating, ReadingStatus, UserId};
use crate::library_store::{now_timestamp, LibraryStore, LibraryStoreError};

#[derive(Default)]
struct Catalog {
    books: BTreeMap<BookId, Book>,
    catalog_id_to_book_id: HashMap<String, BookId>,
}

#[derive(Default)]
pub struct InMemoryLibraryStore {
    book_sequence_generator: AtomicI32,
    catalog: parking_lot::RwLock<Catalog>,
    interactions: parking_lot::RwLock<HashMap<UserId, Vec<Interaction>>>,
}

impl InMemoryLibraryStore {
    fn with_interaction<F>(
        &self,
        user_id: UserId,
        book_id: BookId,
        update: F,
    ) -> Result<(), LibraryStoreError>
    where
        F: FnOnce(&mut Interaction),
    {
        let mut locked_interactions = self.interactions.write();
        let interaction = locked_interactions
            .get_mut(&user_id)
            .and_then(|interactions| interactions.iter_mut().find(|i| i.book_id == book_id))
            .ok_or(LibraryStoreError::NotOnShelf(user_id, book_id))?;
        update(interaction);
        Ok(())
    }
}

#[async_trait::async_trait]
impl LibraryStore for InMemoryLibraryStore {
    async fn add_book(&self, details: BookDetails) -> Result<BookId, LibraryStoreError> {
        let mut locked_catalog = self.catalog.write();
        if let Some(book_id) = locked_catalog.catalog_id_to_book_id.get(&details.catalog_id) {
            return Ok(*book_id);
        }
        let id = self.book_sequence_generator.fetch_add(1, Ordering::Relaxed) + 1;
        locked_catalog
            .catalog_id_to_book_id
            .insert(details.catalog_id.clone(), id);
        locked_catalog.books.insert(id, details.into_book(id));
        Ok(id)
    }

    async fn get_book(&self, book_id: BookId) -> Result<Book, LibraryStoreError> {
        self.catalog
            .read()
            .books
            .get(&book_id)
            .cloned()
            .ok_or(LibraryStoreError::BookNotFound(book_id))
    }

    async fn list_catalog(&self) -> Result<Vec<Book>, LibraryStoreError> {
        Ok(self.catalog.read().books.values().cloned().collect())
    }

    async fn add_to_shelf(
        &self,
        user_id: UserId,
        book_id: BookId,
        status: ReadingStatus,
    ) -> Result<(), LibraryStoreError> {
        if !self.catalog.read().books.contains_key(&book_id) {
            return Err(LibraryStoreError::BookNotFound(book_id));
        }

        let mut locked_interactions = self.interactions.write();
        let user_interactions = locked_interactions.entry(user_id).or_default();
        if user_interactions.iter().any(|i| i.book_id == book_id) {
            return Err(LibraryStoreError::AlreadyOnShelf(user_id, book_id));
        }
        let now = now_timestamp();
        user_interactions.push(Interaction {
            user_id,
            book_id,
            status,
            rating: None,
            added_at: now,
            status_changed_at: now,
        });
        Ok(())
    }

    async fn move_book(
        &self,
        user_id: UserId,
        book_id: BookId,
        status: ReadingStatus,
    ) -> Result<(), LibraryStoreError> {
        self.with_interaction(user_id, book_id, |interaction| {
            if interaction.status != status {
                interaction.status = status;
                interaction.status_changed_at = now_timestamp();
            }
        })
    }

    async fn rate_book(
        &self,
        user_id: UserId,
        book_id: BookId,
        rating: Rating,
    ) -> Result<(), LibraryStoreError> {
        self.with_interaction(user_id, book_id, |interaction| {
            interaction.rating = Some(rating.value())
        })
    }

    async fn remove_book(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<(), LibraryStoreError> {
        let mut locked_interactions = self.interactions.write();
        let user_interactions = locked_interactions
            .get_mut(&user_id)
            .ok_or(LibraryStoreError::NotOnShelf(user_id, book_id))?;
        let position = user_interactions
            .iter()
            .position(|i| i.book_id == book_id)
            .ok_or(LibraryStoreError::NotOnShelf(user_id, book_id))?;
        user_interactions.remove(position);
        Ok(())
    }

    async fn list_interactions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Interaction>, LibraryStoreError> {
        Ok(self
            .interactions
            .read()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests_in_memory_library_store {
    use super::*;

    fn book_details(catalog_id: &str, title: &str) -> BookDetails {
        BookDetails {
            catalog_id: catalog_id.to_string(),
            title: title.to_string(),
            authors: "Ursula K. Le Guin".to_string(),
            description: None,
            cover_url: None,
        }
    }

    #[tokio::test]
    /// Covers catalog management
    /// 1. Catalog is empty at start
    /// 2. Adds two books, the same catalog id twice returns the same book id
    /// 3. Lists catalog in id order
    /// 4. Gets book not existing in the catalog
    async fn test_catalog_management() {
        let store = InMemoryLibraryStore::default();
        assert_eq!(store.list_catalog().await.unwrap(), vec![]);

        let earthsea_id = store
            .add_book(book_details("earthsea", "A Wizard of Earthsea"))
            .await
            .unwrap();
        let dispossessed_id = store
            .add_book(book_details("dispossessed", "The Dispossessed"))
            .await
            .unwrap();
        let duplicate_id = store
            .add_book(book_details("earthsea", "Other title"))
            .await
            .unwrap();

        assert_ne!(earthsea_id, dispossessed_id);
        assert_eq!(duplicate_id, earthsea_id);

        let catalog = store.list_catalog().await.unwrap();
        assert_eq!(
            catalog.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![earthsea_id, dispossessed_id]
        );
        assert_eq!(
            store.get_book(earthsea_id).await.unwrap().title,
            "A Wizard of Earthsea"
        );

        let missing_id = dispossessed_id + 100;
        assert!(matches!(
            store.get_book(missing_id).await,
            Err(LibraryStoreError::BookNotFound(id)) if id == missing_id
        ));
    }

    #[tokio::test]
    /// Covers shelf management for a single user
    /// 1. Adds book to shelf, adding the same book again is rejected
    /// 2. Adding unknown book is rejected
    /// 3. Moves and rates the book
    /// 4. Groups books into shelves
    /// 5. Removes the book
    async fn test_shelf_management() {
        let store = InMemoryLibraryStore::default();
        let user_id: UserId = 1;
        let other_user_id: UserId = 2;

        let book_id = store
            .add_book(book_details("lathe", "The Lathe of Heaven"))
            .await
            .unwrap();
        let second_book_id = store
            .add_book(book_details("tehanu", "Tehanu"))
            .await
            .unwrap();

        store
            .add_to_shelf(user_id, book_id, ReadingStatus::WantToRead)
            .await
            .unwrap();
        assert!(matches!(
            store
                .add_to_shelf(user_id, book_id, ReadingStatus::Reading)
                .await,
            Err(LibraryStoreError::AlreadyOnShelf(..))
        ));
        assert!(matches!(
            store
                .add_to_shelf(user_id, 1000, ReadingStatus::Reading)
                .await,
            Err(LibraryStoreError::BookNotFound(1000))
        ));
        store
            .add_to_shelf(user_id, second_book_id, ReadingStatus::Reading)
            .await
            .unwrap();

        store
            .move_book(user_id, book_id, ReadingStatus::Read)
            .await
            .unwrap();
        store
            .rate_book(user_id, book_id, Rating::new(4).unwrap())
            .await
            .unwrap();

        let interactions = store.list_interactions(user_id).await.unwrap();
        assert_eq!(interactions.len(), 2);
        assert_eq!(interactions[0].book_id, book_id);
        assert_eq!(interactions[0].status, ReadingStatus::Read);
        assert_eq!(interactions[0].rating, Some(4));
        assert_eq!(interactions[1].rating, None);

        let shelves = store.shelves(user_id).await.unwrap();
        assert!(shelves.want_to_read.is_empty());
        assert_eq!(shelves.reading.len(), 1);
        assert_eq!(shelves.reading[0].book.id, second_book_id);
        assert_eq!(shelves.read.len(), 1);
        assert_eq!(shelves.read[0].rating, Some(4));

        // Other user does not see the books
        assert_eq!(store.list_interactions(other_user_id).await.unwrap(), vec![]);
        assert!(matches!(
            store
                .move_book(other_user_id, book_id, ReadingStatus::Read)
                .await,
            Err(LibraryStoreError::NotOnShelf(..))
        ));

        store.remove_book(user_id, book_id).await.unwrap();
        assert!(matches!(
            store.remove_book(user_id, book_id).await,
            Err(LibraryStoreError::NotOnShelf(..))
        ));
        let interactions = store.list_interactions(user_id).await.unwrap();
        assert_eq!(interactions.len(), 1);
        assert_eq!(interactions[0].book_id, second_book_id);
    }

    #[tokio::test]
    async fn test_move_to_same_shelf_keeps_status_change_time() {
        let store = InMemoryLibraryStore::default();
        let book_id = store
            .add_book(book_details("lavinia", "Lavinia"))
            .await
            .unwrap();
        store
            .add_to_shelf(3, book_id, ReadingStatus::Reading)
            .await
            .unwrap();
        let before = store.list_interactions(3).await.unwrap()[0].clone();

        store
            .move_book(3, book_id, ReadingStatus::Reading)
            .await
            .unwrap();

        assert_eq!(store.list_interactions(3).await.unwrap()[0], before);
    }
}
