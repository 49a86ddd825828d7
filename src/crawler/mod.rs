//! Crawler module for catalog page fetching and extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching through a shared session
//! - Listing and detail page extraction
//! - Category resolution with a per-item fault boundary
//! - Bounded, order-preserving fan-out of detail fetches
//! - The pagination loop

mod category;
mod coordinator;
mod extractor;
mod fetcher;
mod scheduler;

pub use category::resolve_category;
pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use extractor::{
    extract_card, extract_category, parse_listing, parse_price, parse_rating,
    resolve_product_url, CardFields, CatalogSelectors, ListingPage, NextControl,
};
pub use fetcher::{build_http_client, fetch_url, format_user_agent, FetchResult, LoadedPage, Session};
pub use scheduler::Scheduler;

use crate::config::Config;
use crate::CrawlerError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP session
/// 2. Walk every listing page from the base URL
/// 3. Extract records and resolve categories
/// 4. Write the dataset
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed and the dataset was written
/// * `Err(CrawlerError)` - Crawl failed; nothing was written
pub async fn crawl(config: Config) -> Result<CrawlReport, CrawlerError> {
    run_crawl(config).await
}
