use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use serde::Deserialize;

use bookshelf_library::api::{Book, BookId, Interaction, UserId};

use crate::text_similarity::{SimilarityError, TextSimilarityModel};
use crate::tfidf::TfIdfCosineModel;

pub const DEFAULT_NO_OF_RECOMMENDATIONS: usize = 5;
const DEFAULT_NEIGHBOURS_PER_SOURCE: usize = 5;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RecommenderConfig {
    /// How many most similar books are taken for every rated book
    pub neighbours_per_source: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            neighbours_per_source: DEFAULT_NEIGHBOURS_PER_SOURCE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("Similarity computation failed {0}")]
    Similarity(#[from] SimilarityError),
    #[error("Similarity model returned {actual} scores for {expected} documents")]
    DocumentCountMismatch { expected: usize, actual: usize },
}

/// Recommends unread books similar by text to the books user rated highest
pub struct Recommender<M = TfIdfCosineModel> {
    config: RecommenderConfig,
    model: M,
}

impl Recommender<TfIdfCosineModel> {
    pub fn new(config: RecommenderConfig) -> Result<Self, regex::Error> {
        Ok(Self::with_model(config, TfIdfCosineModel::new()?))
    }
}

/// Book can be compared only when it has a title or authors
fn is_scorable(book: &Book) -> bool {
    !book.title.trim().is_empty() || !book.authors.trim().is_empty()
}

fn text_representation(book: &Book) -> String {
    format!(
        "{} {} {}",
        book.title,
        book.authors,
        book.description.as_deref().unwrap_or_default()
    )
}

impl<M: TextSimilarityModel> Recommender<M> {
    pub fn with_model(config: RecommenderConfig, model: M) -> Self {
        Self { config, model }
    }

    /// Returns up to `n` books the user has no interaction with, in the order they were picked.
    /// Never fails, any internal error is logged and results in no recommendations.
    pub fn recommend(
        &self,
        user_id: UserId,
        catalog: &[Book],
        interactions: &[Interaction],
        n: usize,
    ) -> Vec<Book> {
        match self.try_recommend(user_id, catalog, interactions, n) {
            Ok(books) => books,
            Err(err) => {
                tracing::error!("Failed to recommend books for user {}: {}", user_id, err);
                vec![]
            }
        }
    }

    fn try_recommend(
        &self,
        user_id: UserId,
        catalog: &[Book],
        interactions: &[Interaction],
        n: usize,
    ) -> Result<Vec<Book>, RecommendationError> {
        if n == 0 {
            return Ok(vec![]);
        }

        let user_interactions = interactions
            .iter()
            .filter(|interaction| interaction.user_id == user_id)
            .collect_vec();
        let held_ids: HashSet<BookId> = user_interactions.iter().map(|i| i.book_id).collect();
        let rated = user_interactions
            .iter()
            .filter(|interaction| interaction.rating.is_some())
            .collect_vec();
        if rated.is_empty() {
            tracing::debug!("User {} has no rated books", user_id);
            return Ok(vec![]);
        }
        let rated_ids: HashSet<BookId> = rated.iter().map(|i| i.book_id).collect();

        // Unheld books to pick from, plus rated books used as similarity sources
        let vector_space = catalog
            .iter()
            .unique_by(|book| book.id)
            .filter(|book| is_scorable(book))
            .filter(|book| !held_ids.contains(&book.id) || rated_ids.contains(&book.id))
            .collect_vec();
        if vector_space.iter().all(|book| held_ids.contains(&book.id)) {
            tracing::debug!("No scorable candidates for user {}", user_id);
            return Ok(vec![]);
        }

        let documents = vector_space
            .iter()
            .map(|book| text_representation(book))
            .collect_vec();
        let similarity = self.model.similarity_index(&documents)?;
        if similarity.len() != documents.len() {
            return Err(RecommendationError::DocumentCountMismatch {
                expected: documents.len(),
                actual: similarity.len(),
            });
        }
        let book_id_to_index: HashMap<BookId, usize> = vector_space
            .iter()
            .enumerate()
            .map(|(index, book)| (book.id, index))
            .collect();

        let mut recommended: Vec<Book> = vec![];
        let mut recommended_ids: HashSet<BookId> = HashSet::new();
        for source in rated.iter().sorted_by_key(|i| Reverse(i.rating)) {
            let Some(&source_index) = book_id_to_index.get(&source.book_id) else {
                continue;
            };
            let neighbours = similarity.most_similar(
                source_index,
                self.config.neighbours_per_source,
                |index| !held_ids.contains(&vector_space[index].id),
            )?;
            for index in neighbours {
                let book = vector_space[index];
                if recommended_ids.insert(book.id) {
                    recommended.push(book.clone());
                    if recommended.len() >= n {
                        return Ok(recommended);
                    }
                }
            }
        }
        Ok(recommended)
    }
}
