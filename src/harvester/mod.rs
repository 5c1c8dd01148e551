//! Concurrent multi-source URL harvesting.
//!
//! One client per upstream source, driven by [`UrlHarvester`] under a single
//! global concurrency cap. Each client isolates its own failures: a fetch
//! that errors contributes an empty result and the run continues.

pub mod commoncrawl;
pub mod virustotal;
pub mod wayback;

pub use commoncrawl::CommonCrawlClient;
pub use virustotal::VirusTotalClient;
pub use wayback::WaybackClient;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::record::UrlRecord;

/// Drives the full domain list against all source clients.
///
/// At most `max_concurrent` outbound requests are in flight at once across
/// all domains and sources combined. Results are merged per domain, in the
/// order domains were submitted.
pub struct UrlHarvester {
    wayback: WaybackClient,
    commoncrawl: CommonCrawlClient,
    virustotal: VirusTotalClient,
    semaphore: Arc<Semaphore>,
}

impl UrlHarvester {
    pub fn new(config: &AppConfig, max_concurrent: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .user_agent(&config.http.user_agent)
            .build()?;

        let api_key = std::env::var(&config.sources.api_key_env)
            .ok()
            .filter(|key| !key.is_empty());

        Ok(Self::from_clients(
            WaybackClient::new(client.clone(), config.sources.wayback_base_url.clone()),
            CommonCrawlClient::new(
                client.clone(),
                config.sources.commoncrawl_base_url.clone(),
                config.sources.commoncrawl_index.clone(),
            ),
            VirusTotalClient::new(client, config.sources.virustotal_base_url.clone(), api_key),
            max_concurrent,
        ))
    }

    pub fn from_clients(
        wayback: WaybackClient,
        commoncrawl: CommonCrawlClient,
        virustotal: VirusTotalClient,
        max_concurrent: usize,
    ) -> Self {
        Self {
            wayback,
            commoncrawl,
            virustotal,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Harvest every domain from every source and merge the results into
    /// one flat sequence, domain by domain in submission order.
    ///
    /// All fetches are spawned up front; the shared semaphore keeps the
    /// number of in-flight requests under the cap while letting requests
    /// for different domains overlap. `on_domain_done` is called after each
    /// domain's three fetches have completed and merged. When `cancelled`
    /// is set, remaining fetches are aborted and no further results are
    /// collected.
    pub async fn harvest_all(
        &self,
        domains: &[String],
        include_subs: bool,
        cancelled: &AtomicBool,
        mut on_domain_done: impl FnMut(&str, usize),
    ) -> Vec<UrlRecord> {
        let handles: Vec<_> = domains
            .iter()
            .map(|domain| {
                (
                    self.spawn_wayback(domain.clone(), include_subs),
                    self.spawn_commoncrawl(domain.clone(), include_subs),
                    self.spawn_virustotal(domain.clone()),
                )
            })
            .collect();

        let mut merged = Vec::new();
        for (domain, (wayback, commoncrawl, virustotal)) in domains.iter().zip(handles) {
            if cancelled.load(Ordering::SeqCst) {
                wayback.abort();
                commoncrawl.abort();
                virustotal.abort();
                continue;
            }

            // All three fetches are awaited before this domain's records
            // are merged; the merge itself is single-threaded.
            let (wayback, commoncrawl, virustotal) =
                tokio::join!(wayback, commoncrawl, virustotal);

            let mut domain_records = wayback.unwrap_or_default();
            domain_records.extend(commoncrawl.unwrap_or_default());
            domain_records.extend(virustotal.unwrap_or_default());

            info!("harvested {} raw URLs for {}", domain_records.len(), domain);
            on_domain_done(domain, domain_records.len());
            merged.extend(domain_records);
        }

        debug!("harvest complete: {} raw URLs total", merged.len());
        merged
    }

    fn spawn_wayback(&self, domain: String, include_subs: bool) -> JoinHandle<Vec<UrlRecord>> {
        let client = self.wayback.clone();
        let semaphore = Arc::clone(&self.semaphore);
        tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return Vec::new(),
            };
            client.fetch(&domain, include_subs).await
        })
    }

    fn spawn_commoncrawl(&self, domain: String, include_subs: bool) -> JoinHandle<Vec<UrlRecord>> {
        let client = self.commoncrawl.clone();
        let semaphore = Arc::clone(&self.semaphore);
        tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return Vec::new(),
            };
            client.fetch(&domain, include_subs).await
        })
    }

    fn spawn_virustotal(&self, domain: String) -> JoinHandle<Vec<UrlRecord>> {
        let client = self.virustotal.clone();
        let semaphore = Arc::clone(&self.semaphore);
        tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return Vec::new(),
            };
            client.fetch(&domain).await
        })
    }
}
