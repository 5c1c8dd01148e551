//! VirusTotal domain report client.
//!
//! Requires an API key supplied from the environment. When no key is
//! present the client short-circuits to an empty result without touching
//! the network, silently disabling the source for the run.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::record::{Source, UrlRecord};

#[derive(Clone)]
pub struct VirusTotalClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DomainReport {
    #[serde(default)]
    detected_urls: Vec<DetectedUrl>,
}

#[derive(Debug, Deserialize)]
struct DetectedUrl {
    #[serde(default)]
    url: String,
}

impl VirusTotalClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch detected URLs for a domain.
    ///
    /// Missing API key or any transport/parse error degrades to an empty
    /// result; errors never cross this boundary.
    pub async fn fetch(&self, domain: &str) -> Vec<UrlRecord> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("virustotal disabled: no API key configured");
            return Vec::new();
        };

        match self.query(api_key, domain).await {
            Ok(records) => {
                debug!("virustotal: {} URLs for {}", records.len(), domain);
                records
            }
            Err(e) => {
                warn!("virustotal fetch failed for {}: {:#}", domain, e);
                Vec::new()
            }
        }
    }

    async fn query(&self, api_key: &str, domain: &str) -> Result<Vec<UrlRecord>> {
        let url = format!(
            "{}/vtapi/v2/domain/report?apikey={}&domain={}",
            self.base_url, api_key, domain
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

        let report: DomainReport = response
            .json()
            .await
            .context("response is not a domain report")?;

        let records = report
            .detected_urls
            .into_iter()
            .map(|detected| UrlRecord::new(detected.url, Source::VirusTotal))
            .collect();

        Ok(records)
    }
}
