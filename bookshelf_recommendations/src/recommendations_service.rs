use std::sync::Arc;

use bookshelf_library::api::{Book, UserId};

use crate::library_source::LibrarySource;
use crate::recommendations::Recommender;
use crate::text_similarity::TextSimilarityModel;
use crate::tfidf::TfIdfCosineModel;

/// Reads a snapshot of the library and runs recommender over it
pub struct RecommendationsService<M = TfIdfCosineModel> {
    library_source: Arc<dyn LibrarySource>,
    recommender: Recommender<M>,
    default_count: usize,
}

impl<M: TextSimilarityModel> RecommendationsService<M> {
    pub fn new(
        library_source: Arc<dyn LibrarySource>,
        recommender: Recommender<M>,
        default_count: usize,
    ) -> Self {
        Self {
            library_source,
            recommender,
            default_count,
        }
    }

    /// Library failures are logged and give no recommendations
    pub async fn recommendations_for_user(&self, user_id: UserId, n: Option<usize>) -> Vec<Book> {
        let n = n.unwrap_or(self.default_count);
        if n == 0 {
            return vec![];
        }

        let interactions = match self.library_source.interactions(user_id).await {
            Ok(interactions) => interactions,
            Err(err) => {
                tracing::error!("Failed to read interactions of user {}: {:#}", user_id, err);
                return vec![];
            }
        };
        if interactions.iter().all(|i| i.rating.is_none()) {
            return vec![];
        }
        let catalog = match self.library_source.catalog().await {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::error!("Failed to read catalog: {:#}", err);
                return vec![];
            }
        };

        let recommendations = self
            .recommender
            .recommend(user_id, &catalog, &interactions, n);
        tracing::info!(
            "Recommended {} of {} books for user {}",
            recommendations.len(),
            catalog.len(),
            user_id
        );
        recommendations
    }
}
