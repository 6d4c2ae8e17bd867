// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::process::RawTable;

pub mod check;
pub mod workbook;

pub use check::check_url;

const USER_AGENT: &str = concat!("lpmd/", env!("CARGO_PKG_VERSION"));

/// Retrieves one partition's spreadsheet.
///
/// `Ok(None)` means the URL was not effective and the partition has no
/// data this run; `Err` is reserved for everything else.
pub trait PartitionFetcher {
    fn fetch(&self, url: &str, columns: &[String]) -> Result<Option<RawTable>>;
}

/// Blocking HTTP fetcher backed by `reqwest`.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl PartitionFetcher for HttpFetcher {
    #[tracing::instrument(level = "info", skip(self, columns))]
    fn fetch(&self, url: &str, columns: &[String]) -> Result<Option<RawTable>> {
        if !check_url(&self.client, url)? {
            warn!("specified url is not effective; no data for this partition");
            return Ok(None);
        }

        let bytes = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("GET {}", url))?
            .bytes()
            .with_context(|| format!("reading body from {}", url))?;

        let raw = workbook::read_workbook(bytes.to_vec(), columns)
            .with_context(|| format!("parsing spreadsheet from {}", url))?;
        info!(rows = raw.num_rows(), "fetched spreadsheet");
        Ok(Some(raw))
    }
}
