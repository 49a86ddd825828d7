//! State module for tracking crawl progress
//!
//! `CrawlPhase` models the pagination loop: load a listing page, extract its
//! cards, check for a next page, and either loop or finish.

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
