//! Dataset module for the crawled catalog
//!
//! This module handles:
//! - The `Record` produced for every catalog card
//! - The ordered `Dataset` accumulated across listing pages
//! - Writing and reading the dataset as CSV
//! - Summary statistics over a dataset

mod csv_store;
pub mod stats;

pub use csv_store::{read_csv, write_csv, DATASET_COLUMNS};
pub use stats::{print_statistics, DatasetStatistics};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Category used when the detail page yields no breadcrumb label
pub const UNKNOWN_CATEGORY: &str = "UNKNOWN";

/// One catalog item
///
/// Every field always holds a value; missing source data degrades to
/// `""`, `0.0`, `0` or [`UNKNOWN_CATEGORY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub title: String,
    pub category: String,
    pub price: f64,
    pub rating: u8,
    pub product_page_url: String,
}

impl Record {
    /// Text submitted to the embedding model for this record
    pub fn search_text(&self) -> String {
        format!("{} [CATEGORY] {}", self.title, self.category)
    }

    /// Returns true if the category could not be resolved
    pub fn has_unknown_category(&self) -> bool {
        self.category == UNKNOWN_CATEGORY
    }
}

/// Coarse size label reported after a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    BelowThreshold,
    AtOrAboveThreshold,
}

impl SizeClass {
    pub fn classify(count: usize, threshold: usize) -> Self {
        if count < threshold {
            Self::BelowThreshold
        } else {
            Self::AtOrAboveThreshold
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BelowThreshold => write!(f, "below threshold"),
            Self::AtOrAboveThreshold => write!(f, "at or above threshold"),
        }
    }
}

/// Ordered collection of records, in page-then-card visit order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Writes the dataset to `path`, replacing any previous contents
    ///
    /// Logs the record count and its size class against `size_threshold`.
    pub fn write(&self, path: &Path, size_threshold: usize) -> crate::Result<SizeClass> {
        write_csv(path, &self.records)?;

        let class = SizeClass::classify(self.len(), size_threshold);
        tracing::info!(
            "Wrote {} records to {} ({} of {})",
            self.len(),
            path.display(),
            class,
            size_threshold
        );

        Ok(class)
    }

    /// Loads a dataset previously written with [`Dataset::write`]
    pub fn read(path: &Path) -> crate::Result<Self> {
        Ok(Self::new(read_csv(path)?))
    }

    /// Sorted, de-duplicated category labels
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> =
            self.records.iter().map(|r| r.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }
}
