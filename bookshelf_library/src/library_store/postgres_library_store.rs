use anyhow::Context;
use serde_json::json;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, Row, Statement};

use crate::api::{Book, BookDetails, BookId, Interaction, Rating, ReadingStatus, UserId};
use crate::library_store::{now_timestamp, LibraryStore, LibraryStoreError};

pub struct PostgresLibraryStoreConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

pub struct PostgresLibraryStore {
    client: Client,
}

impl PostgresLibraryStore {
    pub async fn init(config: PostgresLibraryStoreConfig) -> anyhow::Result<Self> {
        let connection_str = format!(
            "postgresql://{}:{}@{}",
            config.username, config.password, config.hostname
        );
        tracing::info!("Postgres connecting to {}", config.hostname);
        let (client, connection) = tokio_postgres::connect(&connection_str, NoTls)
            .await
            .context("Failed to start postgres")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Postgres connection error: {}", e);
            }
        });

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS books (
            id              SERIAL PRIMARY KEY,
            catalog_id      TEXT NOT NULL UNIQUE,
            params          JSONB
            )
        ",
            )
            .await
            .context("Failed to setup books table")?;

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS interactions (
            id                   SERIAL PRIMARY KEY,
            user_id              INTEGER NOT NULL,
            book_id              INTEGER NOT NULL REFERENCES books (id),
            status               TEXT NOT NULL,
            rating               SMALLINT,
            added_at             BIGINT NOT NULL,
            status_changed_at    BIGINT NOT NULL,
            UNIQUE (user_id, book_id)
            )
        ",
            )
            .await
            .context("Failed to setup interactions table")?;

        Ok(Self { client })
    }
}

fn book_from_row(row: &Row) -> Result<Book, LibraryStoreError> {
    let book_id: BookId = row.try_get(0)?;
    let details: serde_json::Value = row.try_get(1)?;
    Ok(serde_json::from_value::<BookDetails>(details)?.into_book(book_id))
}

fn interaction_from_row(row: &Row) -> Result<Interaction, LibraryStoreError> {
    let status: String = row.try_get(2)?;
    let rating: Option<i16> = row.try_get(3)?;
    Ok(Interaction {
        user_id: row.try_get(0)?,
        book_id: row.try_get(1)?,
        status: status.parse().map_err(LibraryStoreError::Other)?,
        rating: rating
            .map(|r| {
                u8::try_from(r)
                    .map_err(|_| LibraryStoreError::Other(format!("Invalid rating {r}")))
            })
            .transpose()?,
        added_at: row.try_get(4)?,
        status_changed_at: row.try_get(5)?,
    })
}

fn is_violation(err: &tokio_postgres::Error, state: &SqlState) -> bool {
    err.as_db_error()
        .map(|db_err| db_err.code() == state)
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl LibraryStore for PostgresLibraryStore {
    async fn add_book(&self, details: BookDetails) -> Result<BookId, LibraryStoreError> {
        // On conflict the no-op update makes RETURNING yield the existing id
        let stmt: Statement = self
            .client
            .prepare(
                "INSERT INTO books (catalog_id, params) VALUES ($1, $2)
                 ON CONFLICT (catalog_id) DO UPDATE SET catalog_id = EXCLUDED.catalog_id
                 RETURNING id",
            )
            .await?;

        let rows = self
            .client
            .query(&stmt, &[&details.catalog_id, &json!(details)])
            .await?;

        let book_id: BookId = rows
            .first()
            .ok_or_else(|| LibraryStoreError::Other("Id not returned".to_string()))?
            .try_get(0)?;

        Ok(book_id)
    }

    async fn get_book(&self, book_id: BookId) -> Result<Book, LibraryStoreError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, params FROM books WHERE id = ($1)")
            .await?;

        let rows = self.client.query(&stmt, &[&book_id]).await?;

        book_from_row(
            rows.first()
                .ok_or(LibraryStoreError::BookNotFound(book_id))?,
        )
    }

    async fn list_catalog(&self) -> Result<Vec<Book>, LibraryStoreError> {
        let stmt: Statement = self
            .client
            .prepare("SELECT id, params FROM books ORDER BY id")
            .await?;

        let rows = self.client.query(&stmt, &[]).await?;
        rows.iter().map(book_from_row).collect()
    }

    async fn add_to_shelf(
        &self,
        user_id: UserId,
        book_id: BookId,
        status: ReadingStatus,
    ) -> Result<(), LibraryStoreError> {
        let stmt: Statement = self
            .client
            .prepare(
                "INSERT INTO interactions (user_id, book_id, status, added_at, status_changed_at)
                 VALUES ($1, $2, $3, $4, $4)",
            )
            .await?;

        let result = self
            .client
            .execute(
                &stmt,
                &[&user_id, &book_id, &status.as_str(), &now_timestamp()],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_violation(&err, &SqlState::UNIQUE_VIOLATION) => {
                Err(LibraryStoreError::AlreadyOnShelf(user_id, book_id))
            }
            Err(err) if is_violation(&err, &SqlState::FOREIGN_KEY_VIOLATION) => {
                Err(LibraryStoreError::BookNotFound(book_id))
            }
            Err(other_err) => Err(other_err.into()),
        }
    }

    async fn move_book(
        &self,
        user_id: UserId,
        book_id: BookId,
        status: ReadingStatus,
    ) -> Result<(), LibraryStoreError> {
        let stmt: Statement = self
            .client
            .prepare(
                "UPDATE interactions
                 SET status_changed_at = CASE WHEN status = $3 THEN status_changed_at ELSE $4 END,
                     status = $3
                 WHERE user_id = $1 AND book_id = $2
                 RETURNING book_id",
            )
            .await?;

        let rows = self
            .client
            .query(
                &stmt,
                &[&user_id, &book_id, &status.as_str(), &now_timestamp()],
            )
            .await?;

        if rows.is_empty() {
            Err(LibraryStoreError::NotOnShelf(user_id, book_id))
        } else {
            Ok(())
        }
    }

    async fn rate_book(
        &self,
        user_id: UserId,
        book_id: BookId,
        rating: Rating,
    ) -> Result<(), LibraryStoreError> {
        let stmt: Statement = self
            .client
            .prepare(
                "UPDATE interactions SET rating = $3
                 WHERE user_id = $1 AND book_id = $2
                 RETURNING book_id",
            )
            .await?;

        let rows = self
            .client
            .query(&stmt, &[&user_id, &book_id, &i16::from(rating.value())])
            .await?;

        if rows.is_empty() {
            Err(LibraryStoreError::NotOnShelf(user_id, book_id))
        } else {
            Ok(())
        }
    }

    async fn remove_book(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<(), LibraryStoreError> {
        let stmt: Statement = self
            .client
            .prepare("DELETE FROM interactions WHERE user_id = $1 AND book_id = $2 RETURNING book_id")
            .await?;

        let rows = self.client.query(&stmt, &[&user_id, &book_id]).await?;

        if rows.is_empty() {
            Err(LibraryStoreError::NotOnShelf(user_id, book_id))
        } else {
            Ok(())
        }
    }

    async fn list_interactions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Interaction>, LibraryStoreError> {
        let stmt: Statement = self
            .client
            .prepare(
                "SELECT user_id, book_id, status, rating, added_at, status_changed_at
                 FROM interactions WHERE user_id = $1 ORDER BY id",
            )
            .await?;

        let rows = self.client.query(&stmt, &[&user_id]).await?;
        rows.iter().map(interaction_from_row).collect()
    }
}

#[cfg(test)]
mod tests_postgres_library_store {
    use serial_test::file_serial;
    use testcontainers::core::IntoContainerPort;
    use testcontainers::runners::AsyncRunner;
    use testcontainers::{ContainerAsync, GenericImage, ImageExt};

    use super::*;

    async fn start_postgres_container_and_init_store(
    ) -> (ContainerAsync<GenericImage>, PostgresLibraryStore) {
        let _pg_container = GenericImage::new("postgres", "latest")
            .with_mapped_port(5432, 5432.tcp())
            .with_env_var("POSTGRES_USER", "postgres")
            .with_env_var("POSTGRES_PASSWORD", "postgres")
            .start()
            .await
            .expect("Failed to start postgres");

        for _ in 0..10 {
            if let Ok(store) = PostgresLibraryStore::init(PostgresLibraryStoreConfig {
                hostname: "127.0.0.1".to_string(),
                username: "postgres".to_string(),
                password: "postgres".to_string(),
            })
            .await
            {
                return (_pg_container, store);
            }
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        }
        panic!("Failed to setup postgres container")
    }

    fn book_details(catalog_id: &str, title: &str) -> BookDetails {
        BookDetails {
            catalog_id: catalog_id.to_string(),
            title: title.to_string(),
            authors: "Stanislaw Lem".to_string(),
            description: Some("Polish science fiction".to_string()),
            cover_url: None,
        }
    }

    #[tokio::test]
    #[file_serial(key, path => "../.pgtestslock")]
    /// Covers catalog and shelves in one testcase
    /// for the sake of not starting container multiple times
    async fn test_catalog_and_shelves() {
        let (_container, store) = start_postgres_container_and_init_store().await;

        assert_eq!(store.list_catalog().await.unwrap(), vec![]);

        let solaris_id = store
            .add_book(book_details("solaris", "Solaris"))
            .await
            .expect("Failed to add book");
        let cyberiad_id = store
            .add_book(book_details("cyberiad", "The Cyberiad"))
            .await
            .expect("Failed to add book");
        let duplicate_id = store
            .add_book(book_details("solaris", "Solaris again"))
            .await
            .expect("Failed to add book");
        assert_eq!(duplicate_id, solaris_id);

        let catalog = store.list_catalog().await.unwrap();
        assert_eq!(
            catalog.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![solaris_id, cyberiad_id]
        );
        assert_eq!(catalog[0].title, "Solaris");

        assert!(matches!(
            store.get_book(20000).await,
            Err(LibraryStoreError::BookNotFound(20000))
        ));

        let user_id: UserId = 5;
        store
            .add_to_shelf(user_id, solaris_id, ReadingStatus::Reading)
            .await
            .unwrap();
        assert!(matches!(
            store
                .add_to_shelf(user_id, solaris_id, ReadingStatus::Read)
                .await,
            Err(LibraryStoreError::AlreadyOnShelf(..))
        ));
        assert!(matches!(
            store
                .add_to_shelf(user_id, 20000, ReadingStatus::Read)
                .await,
            Err(LibraryStoreError::BookNotFound(20000))
        ));
        store
            .add_to_shelf(user_id, cyberiad_id, ReadingStatus::WantToRead)
            .await
            .unwrap();

        store
            .move_book(user_id, solaris_id, ReadingStatus::Read)
            .await
            .unwrap();
        store
            .rate_book(user_id, solaris_id, Rating::new(5).unwrap())
            .await
            .unwrap();

        let interactions = store.list_interactions(user_id).await.unwrap();
        assert_eq!(interactions.len(), 2);
        assert_eq!(interactions[0].book_id, solaris_id);
        assert_eq!(interactions[0].status, ReadingStatus::Read);
        assert_eq!(interactions[0].rating, Some(5));
        assert_eq!(interactions[1].status, ReadingStatus::WantToRead);

        let shelves = store.shelves(user_id).await.unwrap();
        assert_eq!(shelves.read.len(), 1);
        assert_eq!(shelves.want_to_read.len(), 1);
        assert!(shelves.reading.is_empty());

        store.remove_book(user_id, solaris_id).await.unwrap();
        assert!(matches!(
            store.remove_book(user_id, solaris_id).await,
            Err(LibraryStoreError::NotOnShelf(..))
        ));
        assert!(matches!(
            store
                .rate_book(user_id, solaris_id, Rating::new(1).unwrap())
                .await,
            Err(LibraryStoreError::NotOnShelf(..))
        ));
    }
}
