#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SimilarityError {
    #[error("No documents to compare")]
    EmptyCorpus,
    #[error("Documents contain only stop words")]
    EmptyVocabulary,
    #[error("Document index {index} out of range, corpus has {len} documents")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Capability of comparing documents by their text.
/// Implementations must be deterministic for the same list of documents.
pub trait TextSimilarityModel: Send + Sync {
    fn similarity_index(&self, documents: &[String]) -> Result<SimilarityIndex, SimilarityError>;
}

type PairScore = Box<dyn Fn(usize, usize) -> f64 + Send + Sync>;

/// Pairwise scores in [0,1] over a fixed list of documents.
/// Scores are computed on demand, nothing of size documents x documents is ever stored.
pub struct SimilarityIndex {
    len: usize,
    pair_score: PairScore,
}

impl SimilarityIndex {
    /// `pair_score` must be symmetric, it is never called for a document with itself
    pub fn from_pairwise<F>(len: usize, pair_score: F) -> Self
    where
        F: Fn(usize, usize) -> f64 + Send + Sync + 'static,
    {
        Self {
            len,
            pair_score: Box::new(pair_score),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn score(&self, first: usize, second: usize) -> Result<f64, SimilarityError> {
        self.check_index(first)?;
        self.check_index(second)?;
        Ok(self.unchecked_score(first, second))
    }

    /// Returns up to `k` indices accepted by `eligible` ordered by descending score.
    /// The document itself is never returned, equal scores keep ascending index order.
    pub fn most_similar<F>(
        &self,
        index: usize,
        k: usize,
        eligible: F,
    ) -> Result<Vec<usize>, SimilarityError>
    where
        F: Fn(usize) -> bool,
    {
        self.check_index(index)?;
        if k == 0 {
            return Ok(vec![]);
        }
        let mut neighbours: Vec<(usize, f64)> = (0..self.len)
            .filter(|other| *other != index && eligible(*other))
            .map(|other| (other, self.unchecked_score(index, other)))
            .collect();
        // sort_by is stable, so ties stay in index order
        neighbours.sort_by(|a, b| b.1.total_cmp(&a.1));
        neighbours.truncate(k);
        Ok(neighbours.into_iter().map(|(other, _)| other).collect())
    }

    fn unchecked_score(&self, first: usize, second: usize) -> f64 {
        if first == second {
            1.0
        } else {
            (self.pair_score)(first, second).clamp(0.0, 1.0)
        }
    }

    fn check_index(&self, index: usize) -> Result<(), SimilarityError> {
        if index < self.len {
            Ok(())
        } else {
            Err(SimilarityError::IndexOutOfRange {
                index,
                len: self.len,
            })
        }
    }
}

impl std::fmt::Debug for SimilarityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityIndex")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod similarity_index_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn index() -> SimilarityIndex {
        // 0 and 2 are close, 1 and 3 tie against 0
        let scores = [
            [1.0, 0.2, 0.9, 0.2],
            [0.2, 1.0, 0.0, 0.5],
            [0.9, 0.0, 1.0, 0.1],
            [0.2, 0.5, 0.1, 1.0],
        ];
        SimilarityIndex::from_pairwise(4, move |a, b| scores[a][b])
    }

    #[test]
    fn test_scores_are_symmetric_with_unit_diagonal() {
        let index = index();
        assert_eq!(index.len(), 4);
        for a in 0..4 {
            assert_eq!(index.score(a, a).unwrap(), 1.0);
            for b in 0..4 {
                assert_eq!(index.score(a, b), index.score(b, a));
            }
        }
    }

    #[test]
    fn test_scores_are_clamped() {
        let index = SimilarityIndex::from_pairwise(2, |_, _| 1.5);
        assert_eq!(index.score(0, 1).unwrap(), 1.0);
        let index = SimilarityIndex::from_pairwise(2, |_, _| -0.1);
        assert_eq!(index.score(0, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_most_similar_orders_by_score_then_index() {
        let index = index();
        assert_eq!(index.most_similar(0, 5, |_| true).unwrap(), vec![2, 1, 3]);
        assert_eq!(index.most_similar(0, 2, |_| true).unwrap(), vec![2, 1]);
        assert_eq!(index.most_similar(0, 5, |i| i != 2).unwrap(), vec![1, 3]);
        assert_eq!(index.most_similar(0, 0, |_| true).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn test_index_out_of_range() {
        let index = index();
        assert_eq!(
            index.most_similar(4, 5, |_| true).unwrap_err(),
            SimilarityError::IndexOutOfRange { index: 4, len: 4 }
        );
        assert!(index.score(0, 7).is_err());
    }

    #[test]
    /// A million documents would need terabytes as a full matrix,
    /// one row of neighbours scores each eligible document exactly once
    fn test_scores_only_requested_row() {
        const LEN: usize = 1_000_000;
        let calls = Arc::new(AtomicUsize::new(0));
        let counted_calls = calls.clone();
        let index = SimilarityIndex::from_pairwise(LEN, move |a, b| {
            counted_calls.fetch_add(1, Ordering::Relaxed);
            if a.max(b) == LEN - 1 {
                0.9
            } else {
                0.1
            }
        });

        assert_eq!(calls.load(Ordering::Relaxed), 0);
        assert_eq!(
            index.most_similar(0, 2, |_| true).unwrap(),
            vec![LEN - 1, 1]
        );
        assert_eq!(calls.load(Ordering::Relaxed), LEN - 1);
    }
}
