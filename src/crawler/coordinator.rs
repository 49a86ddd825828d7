//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the pagination loop that coordinates the crawl:
//! - Loading each listing page, starting from the base URL
//! - Turning its cards into records, resolving categories per card
//! - Following the "next page" control until it disappears
//! - Handing the finished dataset to the assembler

use crate::config::Config;
use crate::crawler::category::resolve_category;
use crate::crawler::extractor::{parse_listing, CardFields, CatalogSelectors, NextControl};
use crate::crawler::fetcher::Session;
use crate::crawler::scheduler::Scheduler;
use crate::dataset::{Dataset, Record, SizeClass, UNKNOWN_CATEGORY};
use crate::state::CrawlPhase;
use crate::CrawlerError;
use chrono::{DateTime, Utc};
use std::path::Path;
use url::Url;

/// Main crawler coordinator structure
///
/// The coordinator owns the session and the growing record list; the records
/// are moved out into a [`Dataset`] when the run completes.
pub struct Coordinator {
    config: Config,
    session: Session,
    selectors: CatalogSelectors,
    scheduler: Scheduler,
    base_url: Url,
    phase: CrawlPhase,
    records: Vec<Record>,
    pages_visited: usize,
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pages_visited: usize,
    pub records: usize,
    pub unknown_categories: usize,
    pub size_class: SizeClass,
}

impl CrawlReport {
    /// Wall-clock duration of the run in whole seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run from the configured base URL
    /// * `Err(CrawlerError)` - Invalid base URL, selectors, or HTTP client setup
    pub fn new(config: Config) -> Result<Self, CrawlerError> {
        let base_url = Url::parse(&config.crawler.base_url)?;
        let selectors = CatalogSelectors::from_config(&config.selectors)?;
        let session = Session::from_config(&config.user_agent, &config.crawler)?;
        let scheduler = Scheduler::new(config.crawler.max_concurrent_detail_fetches);

        Ok(Self {
            config,
            session,
            selectors,
            scheduler,
            base_url,
            phase: CrawlPhase::default(),
            records: Vec::new(),
            pages_visited: 0,
        })
    }

    /// Current phase of the pagination loop
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Number of listing pages fully processed so far
    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }

    fn advance(&mut self, next: CrawlPhase) -> Result<(), CrawlerError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlerError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Runs the pagination loop to completion
    ///
    /// Any listing page that cannot be loaded, or a "next" control that cannot
    /// be resolved, aborts the run; no dataset is returned in that case.
    pub async fn run(&mut self) -> Result<Dataset, CrawlerError> {
        let mut url = self.base_url.clone();
        tracing::debug!(
            "Resolving categories with up to {} concurrent detail fetches",
            self.scheduler.max_concurrent()
        );

        while !self.phase.is_terminal() {
            tracing::info!("Scraping page: {}", url);
            let page = self.session.open(&url).await?;
            let listing = parse_listing(&page.body, &self.selectors);

            self.advance(CrawlPhase::ExtractingCards)?;
            tracing::info!("Found {} cards on {}", listing.cards.len(), page.url);
            let records = self.extract_records(listing.cards).await;
            self.records.extend(records);
            self.pages_visited += 1;

            self.advance(CrawlPhase::CheckingNext)?;
            match next_page_url(&page.url, listing.next)? {
                Some(next) => {
                    self.advance(CrawlPhase::LoadingPage)?;
                    url = next;
                }
                None => self.advance(CrawlPhase::Done)?,
            }
        }

        tracing::info!(
            "Pagination finished after {} pages, {} records collected",
            self.pages_visited,
            self.records.len()
        );

        Ok(Dataset::new(std::mem::take(&mut self.records)))
    }

    /// Builds the records of one listing page, in card order
    async fn extract_records(&self, cards: Vec<CardFields>) -> Vec<Record> {
        let base_url = &self.base_url;
        let session = &self.session;
        let selectors = &self.selectors;

        self.scheduler
            .run_ordered(cards, |index, fields| async move {
                let category = if fields.relative_link.is_empty() {
                    tracing::warn!(
                        "Card {} has no product link; using {} and skipping category lookup",
                        index,
                        base_url
                    );
                    UNKNOWN_CATEGORY.to_string()
                } else {
                    let product_page_url = fields.product_page_url(base_url);
                    resolve_category(session, selectors, &product_page_url).await
                };

                tracing::debug!("Card {}: '{}' in {}", index, fields.title, category);
                fields.into_record(base_url, category)
            })
            .await
    }

    /// Runs the crawl and writes the dataset to the configured path
    pub async fn run_and_write(&mut self) -> Result<CrawlReport, CrawlerError> {
        let started_at = Utc::now();
        let dataset = self.run().await?;

        let total = dataset.len();
        tracing::info!("Total records collected: {}", total);

        let size_class = dataset.write(
            Path::new(&self.config.output.dataset_path),
            self.config.output.size_threshold,
        )?;

        let unknown_categories = dataset
            .records()
            .iter()
            .filter(|r| r.has_unknown_category())
            .count();

        Ok(CrawlReport {
            started_at,
            finished_at: Utc::now(),
            pages_visited: self.pages_visited,
            records: total,
            unknown_categories,
            size_class,
        })
    }
}

/// Resolves the "next page" control against the listing page's own URL
fn next_page_url(current: &Url, next: NextControl) -> Result<Option<Url>, CrawlerError> {
    match next {
        NextControl::Absent => Ok(None),
        NextControl::Link(href) => match current.join(&href) {
            Ok(url) => Ok(Some(url)),
            Err(e) => Err(CrawlerError::MalformedNextLink {
                page: current.to_string(),
                href,
                reason: e.to_string(),
            }),
        },
        NextControl::MissingHref => Err(CrawlerError::MalformedNextLink {
            page: current.to_string(),
            href: String::new(),
            reason: "next control has no href".to_string(),
        }),
    }
}

/// Runs the main crawl operation
///
/// This function orchestrates the entire crawl process:
///
/// 1. Build the session, selectors and scheduler from configuration
/// 2. Walk the listing pages from the base URL
/// 3. Extract every card and resolve its category
/// 4. Write the dataset, overwriting the previous file
///
/// # Example
///
/// ```no_run
/// use catalog_crawler::config::load_config;
/// use catalog_crawler::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = run_crawl(config).await?;
/// println!("{} records", report.records);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, CrawlerError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run_and_write().await
}
