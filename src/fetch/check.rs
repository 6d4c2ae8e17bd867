// src/fetch/check.rs

use reqwest::blocking::Client;
use tracing::{debug, warn};
use url::Url;

use crate::error::ScrapeError;

static URL_PROTOCOLS: &[&str] = &["http://", "https://"];

/// Check whether `url` is effective: an http(s) URL that answers a GET
/// with a success status.
///
/// A scheme other than http/https is an error. Anything that goes wrong on
/// the wire (DNS, refused connection, error status) is reported as `false`.
/// One attempt only.
#[tracing::instrument(level = "debug", skip(client))]
pub fn check_url(client: &Client, url: &str) -> Result<bool, ScrapeError> {
    if !URL_PROTOCOLS.iter().any(|p| url.starts_with(p)) {
        return Err(ScrapeError::InvalidScheme(url.to_string()));
    }

    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => {
            warn!(url, error = %e, "url does not parse");
            return Ok(false);
        }
    };

    match client.get(parsed).send() {
        Ok(resp) if resp.status().is_success() => {
            debug!(status = %resp.status(), "url is effective");
            Ok(true)
        }
        Ok(resp) => {
            warn!(url, status = %resp.status(), "url answered with an error status");
            Ok(false)
        }
        Err(e) => {
            warn!(url, error = %e, "url is unreachable");
            Ok(false)
        }
    }
}
