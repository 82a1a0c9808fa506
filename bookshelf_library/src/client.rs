use anyhow::{bail, Context};
use reqwest::header::LOCATION;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{
    AddToShelfRequest, Book, BookDetails, BookId, GetCatalogResponse, Interaction, MoveRequest,
    RateRequest, ReadingStatus, Shelves, UserId,
};

pub struct BookshelfLibraryClient {
    url: String,
    client: ClientWithMiddleware,
}

impl BookshelfLibraryClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls POST /api/book endpoint
    /// Returns id of the book, existing id if the catalog id was already known
    pub async fn add_book(&self, book_details: BookDetails) -> anyhow::Result<BookId> {
        let response = self
            .client
            .post(format!("{}/api/book", self.url))
            .json(&book_details)
            .send()
            .await?;

        if !response.status().is_success() {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to add book {}", error)
        }

        let location_header = response
            .headers()
            .get(LOCATION)
            .context("No location header")?;

        location_header
            .to_str()
            .context("Failed to convert header to str")?
            .strip_prefix("/api/book/")
            .context("Invalid location header")?
            .parse()
            .context("Failed to parse book id")
    }

    /// Calls GET /api/book/{book_id} endpoint
    /// Returns None if book is not in the catalog
    pub async fn get_book(&self, book_id: BookId) -> anyhow::Result<Option<Book>> {
        let response = self
            .client
            .get(format!("{}/api/book/{}", self.url, book_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to get book {}", error)
        }
    }

    /// Calls GET /api/books endpoint
    pub async fn list_catalog(&self) -> anyhow::Result<Vec<Book>> {
        let response = self
            .client
            .get(format!("{}/api/books", self.url))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json::<GetCatalogResponse>().await?.books)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to list catalog {}", error)
        }
    }

    /// Calls POST /api/user/{user_id}/book/{book_id} endpoint
    /// Returns false if the book was already on user shelves
    pub async fn add_to_shelf(
        &self,
        user_id: UserId,
        book_id: BookId,
        status: ReadingStatus,
    ) -> anyhow::Result<bool> {
        let response = self
            .client
            .post(format!("{}/api/user/{}/book/{}", self.url, user_id, book_id))
            .json(&AddToShelfRequest { status })
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to add book to shelf {}", error)
        }
    }

    /// Calls PUT /api/user/{user_id}/book/{book_id}/status endpoint
    pub async fn move_book(
        &self,
        user_id: UserId,
        book_id: BookId,
        status: ReadingStatus,
    ) -> anyhow::Result<()> {
        let response = self
            .client
            .put(format!(
                "{}/api/user/{}/book/{}/status",
                self.url, user_id, book_id
            ))
            .json(&MoveRequest { status })
            .send()
            .await?;

        if !response.status().is_success() {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to move book {}", error)
        }
        Ok(())
    }

    /// Calls PUT /api/user/{user_id}/book/{book_id}/rating endpoint
    pub async fn rate_book(&self, user_id: UserId, book_id: BookId, rating: u8) -> anyhow::Result<()> {
        let response = self
            .client
            .put(format!(
                "{}/api/user/{}/book/{}/rating",
                self.url, user_id, book_id
            ))
            .json(&RateRequest { rating })
            .send()
            .await?;

        if !response.status().is_success() {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to rate book {}", error)
        }
        Ok(())
    }

    /// Calls DELETE /api/user/{user_id}/book/{book_id} endpoint
    /// Returns false if the book was not on user shelves
    pub async fn remove_book(&self, user_id: UserId, book_id: BookId) -> anyhow::Result<bool> {
        let response = self
            .client
            .delete(format!("{}/api/user/{}/book/{}", self.url, user_id, book_id))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to remove book {}", error)
        }
    }

    /// Calls GET /api/user/{user_id}/interactions endpoint
    pub async fn list_interactions(&self, user_id: UserId) -> anyhow::Result<Vec<Interaction>> {
        let response = self
            .client
            .get(format!("{}/api/user/{}/interactions", self.url, user_id))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to list interactions {}", error)
        }
    }

    /// Calls GET /api/user/{user_id}/shelves endpoint
    pub async fn shelves(&self, user_id: UserId) -> anyhow::Result<Shelves> {
        let response = self
            .client
            .get(format!("{}/api/user/{}/shelves", self.url, user_id))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to get shelves {}", error)
        }
    }
}
