//! Filtered similarity search over a dataset
//!
//! A search first masks the dataset with the active filters. Without a query
//! the first `k` surviving rows are returned in dataset order; with a query
//! embedding the survivors are ranked by cosine similarity, highest first.

use crate::dataset::{Dataset, Record};
use crate::embedding::EmbeddingMatrix;
use crate::CrawlerError;

/// Category value meaning "no category filter"
pub const ALL_CATEGORIES: &str = "All";

/// Optional constraints applied before ranking
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    /// Exact category match; `None` or `"All"` disables it
    pub category: Option<String>,
    /// Inclusive lower price bound
    pub price_min: Option<f64>,
    /// Inclusive upper price bound
    pub price_max: Option<f64>,
    /// Minimum rating, inclusive
    pub min_rating: Option<u8>,
}

impl SearchFilters {
    /// Returns true if `record` passes every active filter
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(category) = self.category.as_deref() {
            if category != ALL_CATEGORIES && record.category != category {
                return false;
            }
        }
        if self.price_min.is_some_and(|min| record.price < min) {
            return false;
        }
        if self.price_max.is_some_and(|max| record.price > max) {
            return false;
        }
        if self.min_rating.is_some_and(|min| record.rating < min) {
            return false;
        }
        true
    }
}

/// One search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    /// Row of the record in the dataset
    pub index: usize,
    pub record: &'a Record,
    /// Cosine similarity to the query; `None` for unranked results
    pub similarity: Option<f32>,
}

/// Cosine similarity of two vectors
///
/// Returns `0.0` when either vector has zero length or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Searches `dataset` with optional query embedding and filters
///
/// `embeddings` must hold one row per record. With `query` set, its length
/// must match the matrix dimensionality.
pub fn semantic_search<'a>(
    dataset: &'a Dataset,
    embeddings: &EmbeddingMatrix,
    query: Option<&[f32]>,
    filters: &SearchFilters,
    k: usize,
) -> Result<Vec<SearchHit<'a>>, CrawlerError> {
    if embeddings.len() != dataset.len() {
        return Err(CrawlerError::Dataset(format!(
            "{} embeddings for {} records; recompute the vectors",
            embeddings.len(),
            dataset.len()
        )));
    }

    let survivors = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| filters.matches(record));

    let Some(query) = query else {
        return Ok(survivors
            .take(k)
            .map(|(index, record)| SearchHit {
                index,
                record,
                similarity: None,
            })
            .collect());
    };

    if !embeddings.is_empty() && query.len() != embeddings.dimensions() {
        return Err(CrawlerError::Embedding(format!(
            "query has {} dimensions, dataset vectors have {}",
            query.len(),
            embeddings.dimensions()
        )));
    }

    let mut ranked: Vec<SearchHit<'a>> = survivors
        .map(|(index, record)| SearchHit {
            index,
            record,
            similarity: Some(
                embeddings
                    .row(index)
                    .map(|row| cosine_similarity(query, row))
                    .unwrap_or(0.0),
            ),
        })
        .collect();

    // Stable sort keeps dataset order among equal scores
    ranked.sort_by(|a, b| {
        let a = a.similarity.unwrap_or(f32::NEG_INFINITY);
        let b = b.similarity.unwrap_or(f32::NEG_INFINITY);
        b.total_cmp(&a)
    });
    ranked.truncate(k);

    Ok(ranked)
}
