//! CommonCrawl index client.
//!
//! Queries one crawl index (configured, e.g. "CC-MAIN-2018-22") for captures
//! of a domain. The response is newline-delimited JSON; a line that fails to
//! parse is skipped rather than failing the whole fetch.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::record::{Source, UrlRecord};

#[derive(Clone)]
pub struct CommonCrawlClient {
    client: Client,
    base_url: String,
    index: String,
}

#[derive(Debug, Deserialize)]
struct IndexLine {
    #[serde(default)]
    url: String,
    #[serde(default)]
    timestamp: String,
}

impl CommonCrawlClient {
    pub fn new(client: Client, base_url: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            index: index.into(),
        }
    }

    /// Fetch crawled URLs for a domain.
    ///
    /// Any transport error or non-2xx response degrades to an empty result;
    /// errors never cross this boundary.
    pub async fn fetch(&self, domain: &str, include_subs: bool) -> Vec<UrlRecord> {
        match self.query(domain, include_subs).await {
            Ok(records) => {
                debug!("commoncrawl: {} URLs for {}", records.len(), domain);
                records
            }
            Err(e) => {
                warn!("commoncrawl fetch failed for {}: {:#}", domain, e);
                Vec::new()
            }
        }
    }

    async fn query(&self, domain: &str, include_subs: bool) -> Result<Vec<UrlRecord>> {
        let prefix = if include_subs { "*." } else { "" };
        let url = format!(
            "{}/{}-index?url={}{}/*&output=json",
            self.base_url, self.index, prefix, domain
        );

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

        let body = response.text().await.context("failed to read body")?;

        let mut records = Vec::new();
        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<IndexLine>(line) {
                Ok(entry) => records.push(UrlRecord::with_timestamp(
                    entry.url,
                    Source::CommonCrawl,
                    entry.timestamp,
                )),
                Err(e) => {
                    debug!("skipping unparseable index line for {}: {}", domain, e);
                }
            }
        }

        Ok(records)
    }
}
