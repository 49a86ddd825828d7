//! Statistics generation from a crawled dataset
//!
//! This module provides functionality for summarising and displaying
//! the contents of a dataset file.

use crate::dataset::Dataset;
use std::collections::BTreeMap;

/// Dataset statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStatistics {
    /// Total number of records
    pub total_records: usize,

    /// Count of records per category label
    pub records_by_category: BTreeMap<String, usize>,

    /// Records whose category could not be resolved
    pub unknown_categories: usize,

    /// Count of records per rating, index 0 through 5
    pub rating_distribution: [usize; 6],

    /// Records whose price degraded to 0.0
    pub zero_prices: usize,

    /// Smallest, mean and largest price (None for an empty dataset)
    pub price_range: Option<(f64, f64, f64)>,
}

impl DatasetStatistics {
    /// Computes statistics over every record in `dataset`
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut records_by_category = BTreeMap::new();
        let mut rating_distribution = [0usize; 6];
        let mut unknown_categories = 0;
        let mut zero_prices = 0;
        let mut price_range: Option<(f64, f64, f64)> = None;

        for record in dataset.records() {
            *records_by_category
                .entry(record.category.clone())
                .or_insert(0) += 1;

            if record.has_unknown_category() {
                unknown_categories += 1;
            }

            rating_distribution[usize::from(record.rating.min(5))] += 1;

            if record.price == 0.0 {
                zero_prices += 1;
            }

            price_range = Some(match price_range {
                None => (record.price, record.price, record.price),
                Some((min, sum, max)) => (
                    min.min(record.price),
                    sum + record.price,
                    max.max(record.price),
                ),
            });
        }

        // The middle slot accumulated a sum; turn it into a mean
        let price_range =
            price_range.map(|(min, sum, max)| (min, sum / dataset.len() as f64, max));

        Self {
            total_records: dataset.len(),
            records_by_category,
            unknown_categories,
            rating_distribution,
            zero_prices,
            price_range,
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", stats.total_records);
    println!("  Categories: {}", stats.records_by_category.len());
    println!("  Unknown categories: {}", stats.unknown_categories);
    println!("  Zero prices: {}", stats.zero_prices);
    if let Some((min, mean, max)) = stats.price_range {
        println!("  Price: min {:.2}, mean {:.2}, max {:.2}", min, mean, max);
    }
    println!();

    println!("Records by Category:");
    // Sort categories by count (descending)
    let mut category_counts: Vec<_> = stats.records_by_category.iter().collect();
    category_counts.sort_by(|a, b| b.1.cmp(a.1));

    for (category, count) in category_counts {
        let percentage = if stats.total_records > 0 {
            (*count as f64 / stats.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", category, count, percentage);
    }
    println!();

    println!("Rating Distribution:");
    for (rating, count) in stats.rating_distribution.iter().enumerate() {
        println!("  {}: {}", rating, count);
    }
}
