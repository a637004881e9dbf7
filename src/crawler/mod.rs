//! Crawler module for the open-day catalogue
//!
//! This module contains the core crawling logic, including:
//! - The selectors describing the catalogue layout
//! - Detail page extraction into records
//! - The paginated listing walk
//! - Overall crawl orchestration

mod detail;
mod listing;
mod orchestrator;
pub(crate) mod selectors;

pub use detail::{extract, parse_detail};
pub use listing::{advance, harvest_links, walk, WalkSummary};
pub use orchestrator::{crawl, run_crawl, trigger, CrawlOutcome};
