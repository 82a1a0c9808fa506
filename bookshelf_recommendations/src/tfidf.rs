use std::collections::{BTreeMap, HashSet};

use regex::Regex;

use crate::stopwords::ENGLISH_STOP_WORDS;
use crate::text_similarity::{SimilarityError, SimilarityIndex, TextSimilarityModel};

/// Tokens are runs of at least two word characters
const TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Sparse vector, entries sorted by term index
type SparseVector = Vec<(usize, f64)>;

/// TF-IDF weighting with smoothed idf and cosine similarity of L2 normalized vectors
pub struct TfIdfCosineModel {
    token_pattern: Regex,
    stop_words: HashSet<&'static str>,
}

impl TfIdfCosineModel {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            token_pattern: Regex::new(TOKEN_PATTERN)?,
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
        })
    }

    fn tokenize(&self, document: &str) -> Vec<String> {
        let lowercase = document.to_lowercase();
        self.token_pattern
            .find_iter(&lowercase)
            .map(|token| token.as_str())
            .filter(|token| !self.stop_words.contains(token))
            .map(str::to_string)
            .collect()
    }

    fn vectorize(&self, documents: &[String]) -> Result<Vec<SparseVector>, SimilarityError> {
        if documents.is_empty() {
            return Err(SimilarityError::EmptyCorpus);
        }

        let term_counts: Vec<BTreeMap<String, usize>> = documents
            .iter()
            .map(|document| {
                let mut counts = BTreeMap::new();
                for token in self.tokenize(document) {
                    *counts.entry(token).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        // term -> number of documents containing it, ordered so term indices are stable
        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for counts in term_counts.iter() {
            for term in counts.keys() {
                *document_frequency.entry(term.as_str()).or_insert(0) += 1;
            }
        }
        if document_frequency.is_empty() {
            return Err(SimilarityError::EmptyVocabulary);
        }

        let no_of_documents = documents.len() as f64;
        let vocabulary: BTreeMap<&str, (usize, f64)> = document_frequency
            .iter()
            .enumerate()
            .map(|(index, (term, df))| {
                let idf = ((1.0 + no_of_documents) / (1.0 + *df as f64)).ln() + 1.0;
                (*term, (index, idf))
            })
            .collect();

        Ok(term_counts
            .iter()
            .map(|counts| {
                // BTreeMap iteration keeps the vector sorted by term index
                let mut vector: SparseVector = counts
                    .iter()
                    .filter_map(|(term, count)| {
                        vocabulary
                            .get(term.as_str())
                            .map(|(index, idf)| (*index, *count as f64 * idf))
                    })
                    .collect();
                let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    vector.iter_mut().for_each(|(_, w)| *w /= norm);
                }
                vector
            })
            .collect())
    }
}

fn dot(first: &SparseVector, second: &SparseVector) -> f64 {
    let (mut i, mut j, mut sum) = (0, 0, 0.0);
    while i < first.len() && j < second.len() {
        match first[i].0.cmp(&second[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += first[i].1 * second[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

impl TextSimilarityModel for TfIdfCosineModel {
    fn similarity_index(&self, documents: &[String]) -> Result<SimilarityIndex, SimilarityError> {
        let vectors = self.vectorize(documents)?;
        Ok(SimilarityIndex::from_pairwise(vectors.len(), move |a, b| {
            dot(&vectors[a], &vectors[b])
        }))
    }
}
