//! Embedding precompute for the crawled dataset
//!
//! Each record is embedded from its search text (`title [CATEGORY] category`)
//! by an [`Embedder`]. The resulting vectors are stored row-aligned with the
//! dataset, so row `i` of the matrix always describes record `i`.

pub mod openai;

pub use openai::OpenAiEmbedder;

use crate::dataset::Dataset;
use crate::CrawlerError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Turns text into fixed-dimensional vectors
#[allow(async_fn_in_trait)]
pub trait Embedder {
    /// Embeds every input; the output has one vector per input, in order
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, CrawlerError>;
}

/// Row-aligned embedding vectors for a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMatrix {
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
}

impl EmbeddingMatrix {
    /// Builds a matrix, rejecting rows of differing length
    pub fn new(vectors: Vec<Vec<f32>>) -> Result<Self, CrawlerError> {
        let dimensions = vectors.first().map(Vec::len).unwrap_or(0);
        check_rows(&vectors, dimensions)?;
        Ok(Self {
            dimensions,
            vectors,
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.vectors.get(index).map(Vec::as_slice)
    }

    /// Writes the matrix as JSON, replacing any previous file
    pub fn save(&self, path: &Path) -> Result<(), CrawlerError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Reads a matrix written by [`EmbeddingMatrix::save`]
    pub fn load(path: &Path) -> Result<Self, CrawlerError> {
        let reader = BufReader::new(File::open(path)?);
        let matrix: Self = serde_json::from_reader(reader)?;
        check_rows(&matrix.vectors, matrix.dimensions)?;
        Ok(matrix)
    }
}

fn check_rows(vectors: &[Vec<f32>], dimensions: usize) -> Result<(), CrawlerError> {
    if let Some((index, row)) = vectors
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != dimensions)
    {
        return Err(CrawlerError::Embedding(format!(
            "row {} has {} dimensions, expected {}",
            index,
            row.len(),
            dimensions
        )));
    }
    Ok(())
}

/// Embeds every record of `dataset`, `batch_size` texts per request
pub async fn precompute_embeddings<E: Embedder>(
    dataset: &Dataset,
    embedder: &E,
    batch_size: usize,
) -> Result<EmbeddingMatrix, CrawlerError> {
    let batch_size = batch_size.max(1);
    let texts: Vec<String> = dataset.records().iter().map(|r| r.search_text()).collect();
    let mut vectors = Vec::with_capacity(texts.len());

    for (batch_index, batch) in texts.chunks(batch_size).enumerate() {
        let embedded = embedder.embed_batch(batch).await?;
        if embedded.len() != batch.len() {
            return Err(CrawlerError::Embedding(format!(
                "batch {} returned {} vectors for {} inputs",
                batch_index,
                embedded.len(),
                batch.len()
            )));
        }
        vectors.extend(embedded);
        tracing::debug!("Embedded {}/{} records", vectors.len(), texts.len());
    }

    let matrix = EmbeddingMatrix::new(vectors)?;
    tracing::info!(
        "Computed {} embeddings with {} dimensions",
        matrix.len(),
        matrix.dimensions()
    );
    Ok(matrix)
}
