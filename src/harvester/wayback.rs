//! Wayback Machine (Internet Archive) CDX index client.
//!
//! Queries the CDX search API for archived captures of a domain. The
//! response is a JSON array whose first row is a column header; data rows
//! are `[urlkey, timestamp, original, ...]`.

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, warn};

use crate::record::{Source, UrlRecord};

#[derive(Clone)]
pub struct WaybackClient {
    client: Client,
    base_url: String,
}

impl WaybackClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Fetch archived URLs for a domain.
    ///
    /// Any transport error, non-2xx response, or malformed payload degrades
    /// to an empty result; errors never cross this boundary.
    pub async fn fetch(&self, domain: &str, include_subs: bool) -> Vec<UrlRecord> {
        match self.query(domain, include_subs).await {
            Ok(records) => {
                debug!("wayback: {} URLs for {}", records.len(), domain);
                records
            }
            Err(e) => {
                warn!("wayback fetch failed for {}: {:#}", domain, e);
                Vec::new()
            }
        }
    }

    async fn query(&self, domain: &str, include_subs: bool) -> Result<Vec<UrlRecord>> {
        let url = build_query_url(&self.base_url, domain, include_subs);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {status}");
        }

        let rows: Vec<Vec<String>> = response
            .json()
            .await
            .context("response is not a CDX JSON array")?;

        // Row 0 is the header. Rows with fewer than 3 columns carry no
        // original URL and are skipped.
        let records = rows
            .into_iter()
            .skip(1)
            .filter(|row| row.len() >= 3)
            .map(|row| UrlRecord::with_timestamp(row[2].clone(), Source::Wayback, row[1].clone()))
            .collect();

        Ok(records)
    }
}

fn build_query_url(base_url: &str, domain: &str, include_subs: bool) -> String {
    let prefix = if include_subs { "*." } else { "" };
    format!("{base_url}/cdx/search/cdx?url={prefix}{domain}/*&output=json&collapse=urlkey")
}
