//! Livestock product marketing data: scrape e-Stat spreadsheets, cleanse
//! them into typed Arrow tables, and package each category as zstd Parquet.

pub mod catalogue;
pub mod datasets;
pub mod error;
pub mod fetch;
pub mod process;
pub mod scraper;

#[cfg(test)]
pub(crate) mod testutil;

pub use catalogue::Catalogue;
pub use error::ScrapeError;
pub use fetch::{HttpFetcher, PartitionFetcher};
pub use scraper::Scraper;
