use async_trait::async_trait;

use bookshelf_library::api::{Book, Interaction, UserId};

/// Read only access to the library data needed for recommendations
#[async_trait]
pub trait LibrarySource: Send + Sync {
    async fn catalog(&self) -> anyhow::Result<Vec<Book>>;
    async fn interactions(&self, user_id: UserId) -> anyhow::Result<Vec<Interaction>>;
}

#[cfg(any(feature = "server", test))]
#[async_trait]
impl LibrarySource for bookshelf_library::client::BookshelfLibraryClient {
    async fn catalog(&self) -> anyhow::Result<Vec<Book>> {
        self.list_catalog().await
    }

    async fn interactions(&self, user_id: UserId) -> anyhow::Result<Vec<Interaction>> {
        self.list_interactions(user_id).await
    }
}
