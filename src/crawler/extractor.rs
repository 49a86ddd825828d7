//! HTML extraction for listing and detail pages
//!
//! This module turns catalog markup into plain data:
//! - The cards of a listing page, with their title, link, price and rating
//! - The "next page" control of a listing page
//! - The category breadcrumb of a detail page
//!
//! Everything here is synchronous. Parsed documents never live across an
//! await point; callers get owned values back.

use crate::config::SelectorConfig;
use crate::dataset::Record;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Rating words in ascending order; position + 1 is the rating
const RATING_WORDS: [&str; 5] = ["One", "Two", "Three", "Four", "Five"];

/// Compiled form of [`SelectorConfig`]
#[derive(Debug, Clone)]
pub struct CatalogSelectors {
    card: Selector,
    title_link: Selector,
    price: Selector,
    rating: Selector,
    next_page: Selector,
    breadcrumb_category: Selector,
    currency_symbol: String,
}

impl CatalogSelectors {
    /// Compiles every selector, failing on the first invalid one
    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            card: compile(&config.card)?,
            title_link: compile(&config.title_link)?,
            price: compile(&config.price)?,
            rating: compile(&config.rating)?,
            next_page: compile(&config.next_page)?,
            breadcrumb_category: compile(&config.breadcrumb_category)?,
            currency_symbol: config.currency_symbol.clone(),
        })
    }
}

fn compile(css: &str) -> Result<Selector, ConfigError> {
    Selector::parse(css).map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", css, e)))
}

/// Fields read directly from one card, before category resolution
#[derive(Debug, Clone, PartialEq)]
pub struct CardFields {
    pub title: String,
    /// Link exactly as it appears in the markup (possibly relative or empty)
    pub relative_link: String,
    pub price: f64,
    pub rating: u8,
}

impl CardFields {
    /// Absolute product URL, resolved against the catalog base
    pub fn product_page_url(&self, base: &Url) -> String {
        resolve_product_url(base, &self.relative_link)
    }

    /// Completes the record with its resolved category
    pub fn into_record(self, base: &Url, category: String) -> Record {
        let product_page_url = self.product_page_url(base);
        Record {
            title: self.title,
            category,
            price: self.price,
            rating: self.rating,
            product_page_url,
        }
    }
}

/// The "next page" control of a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextControl {
    /// No control: this is the last page
    Absent,
    /// Control present with this (possibly relative) href
    Link(String),
    /// Control present but without an href
    MissingHref,
}

/// Everything the pagination driver needs from one listing page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    /// Cards in document order
    pub cards: Vec<CardFields>,
    pub next: NextControl,
}

/// Parses a listing page
///
/// # Example
///
/// ```
/// use catalog_crawler::config::SelectorConfig;
/// use catalog_crawler::crawler::{parse_listing, CatalogSelectors, NextControl};
///
/// let selectors = CatalogSelectors::from_config(&SelectorConfig::default()).unwrap();
/// let html = r#"<article class="product_pod">
///     <p class="star-rating Two"></p>
///     <h3><a href="b/index.html" title="B">B</a></h3>
///     <p class="price_color">£3.00</p>
/// </article>"#;
///
/// let page = parse_listing(html, &selectors);
/// assert_eq!(page.cards[0].rating, 2);
/// assert_eq!(page.next, NextControl::Absent);
/// ```
pub fn parse_listing(html: &str, selectors: &CatalogSelectors) -> ListingPage {
    let document = Html::parse_document(html);

    let cards = document
        .select(&selectors.card)
        .map(|card| extract_card(card, selectors))
        .collect();

    let next = match document.select(&selectors.next_page).next() {
        None => NextControl::Absent,
        Some(link) => match link.value().attr("href") {
            Some(href) => NextControl::Link(href.trim().to_string()),
            None => NextControl::MissingHref,
        },
    };

    ListingPage { cards, next }
}

/// Reads the fields of a single card
///
/// Missing elements and attributes degrade to defaults instead of failing.
pub fn extract_card(card: ElementRef<'_>, selectors: &CatalogSelectors) -> CardFields {
    let link = card.select(&selectors.title_link).next();
    let title = link
        .and_then(|a| a.value().attr("title"))
        .unwrap_or_default()
        .to_string();
    let relative_link = link
        .and_then(|a| a.value().attr("href"))
        .unwrap_or_default()
        .trim()
        .to_string();

    let price_text = card
        .select(&selectors.price)
        .next()
        .map(|el| el.text().collect::<String>());
    let price = parse_price(price_text.as_deref(), &selectors.currency_symbol);

    let rating_class = card
        .select(&selectors.rating)
        .next()
        .and_then(|el| el.value().attr("class"));
    let rating = parse_rating(rating_class);

    CardFields {
        title,
        relative_link,
        price,
        rating,
    }
}

/// Reads the category label from a detail page
///
/// Returns `None` when the breadcrumb entry is missing or has no text.
pub fn extract_category(html: &str, selectors: &CatalogSelectors) -> Option<String> {
    let document = Html::parse_document(html);

    document
        .select(&selectors.breadcrumb_category)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parses a currency-prefixed price such as `£51.77`
///
/// Absent or malformed text yields `0.0`.
pub fn parse_price(text: Option<&str>, currency_symbol: &str) -> f64 {
    let Some(text) = text else {
        return 0.0;
    };

    // Latin-1 mis-decoding of "£" leaves a stray "Â" in front of the symbol
    let cleaned = text.trim().trim_start_matches('Â').replace(currency_symbol, "");

    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .unwrap_or(0.0)
}

/// Maps a rating class attribute such as `star-rating Three` to 0..=5
///
/// Only the last class token is considered.
pub fn parse_rating(class_attr: Option<&str>) -> u8 {
    class_attr
        .and_then(|classes| classes.split_whitespace().last())
        .and_then(|word| RATING_WORDS.iter().position(|w| *w == word))
        .map(|index| index as u8 + 1)
        .unwrap_or(0)
}

/// Resolves a card link against the catalog base URL
///
/// An empty or unresolvable link resolves to the base URL itself.
pub fn resolve_product_url(base: &Url, href: &str) -> String {
    match base.join(href) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!("Unresolvable product link '{}': {}", href, e);
            base.to_string()
        }
    }
}
