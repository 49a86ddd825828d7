//! Category resolution from item detail pages

use crate::crawler::extractor::{extract_category, CatalogSelectors};
use crate::crawler::fetcher::Session;
use crate::dataset::UNKNOWN_CATEGORY;
use url::Url;

/// Resolves the category of one item from its detail page
///
/// The detail page is opened as its own [`LoadedPage`](crate::crawler::LoadedPage)
/// and dropped before returning, whatever the outcome. Any failure (bad URL,
/// network error, HTTP error, missing or empty breadcrumb) yields
/// [`UNKNOWN_CATEGORY`]; it never aborts the crawl.
pub async fn resolve_category(
    session: &Session,
    selectors: &CatalogSelectors,
    product_page_url: &str,
) -> String {
    let url = match Url::parse(product_page_url) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Invalid detail URL '{}': {}", product_page_url, e);
            return UNKNOWN_CATEGORY.to_string();
        }
    };

    let page = match session.open(&url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Category lookup failed for {}: {}", url, e);
            return UNKNOWN_CATEGORY.to_string();
        }
    };

    match extract_category(&page.body, selectors) {
        Some(category) => category,
        None => {
            tracing::debug!("No breadcrumb category on {}", page.url);
            UNKNOWN_CATEGORY.to_string()
        }
    }
}
