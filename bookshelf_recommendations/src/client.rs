use anyhow::{bail, Context};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use bookshelf_library::api::{Book, UserId};

use crate::api::Recommendations;

pub struct BookshelfRecommendationsClient {
    url: String,
    client: ClientWithMiddleware,
}

impl BookshelfRecommendationsClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls GET /api/recommendations/{user_id} endpoint, `n` falls back to service default
    pub async fn recommendations_for_user(
        &self,
        user_id: UserId,
        n: Option<usize>,
    ) -> anyhow::Result<Vec<Book>> {
        let mut request = self
            .client
            .get(format!("{}/api/recommendations/{}", self.url, user_id));
        if let Some(n) = n {
            request = request.query(&[("n", n)]);
        }
        let response = request.send().await?;

        if response.status().is_success() {
            Ok(response.json::<Recommendations>().await?.books)
        } else {
            let error: String = response.json().await.unwrap_or_default();
            bail!("Failed to get recommendations {}", error)
        }
    }
}
