//! Aggregate statistics and recon highlighting over finalized records.

use std::collections::{BTreeMap, HashMap, HashSet};

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use url::Url;

use crate::config::{ConfigError, PatternsConfig};
use crate::filter::timestamp_date;
use crate::record::UrlRecord;

/// Extensions longer than this are treated as path noise, not file types.
const MAX_EXTENSION_LEN: usize = 5;

/// How many extensions / parameter names the histograms keep.
const TOP_N: usize = 10;

/// Reported when no record carries a usable capture date.
pub const DATE_NOT_AVAILABLE: &str = "N/A";

/// Aggregate statistics over a finalized record sequence.
#[derive(Debug, Clone, Serialize)]
pub struct UrlStats {
    pub total_urls: usize,
    /// Distinct URL authorities, lower-cased.
    pub unique_domains: usize,
    /// Top file extensions with occurrence counts, most frequent first.
    pub file_extensions: Vec<(String, usize)>,
    /// Top query parameter names with occurrence counts.
    pub parameters_found: Vec<(String, usize)>,
    pub date_range: DateRange,
    /// Record count per source tag.
    pub source_distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateRange {
    pub earliest: String,
    pub latest: String,
}

/// A URL flagged as belonging to a security-relevant category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconHighlight {
    pub url: String,
    pub label: String,
}

/// Compiled recon pattern table: an ordered list of labeled groups of
/// case-insensitive regexes. Built once at startup from configuration and
/// passed by reference into the analysis functions.
#[derive(Debug)]
pub struct ReconPatterns {
    groups: Vec<PatternGroup>,
}

#[derive(Debug)]
struct PatternGroup {
    label: String,
    regexes: Vec<Regex>,
}

impl ReconPatterns {
    pub fn from_config(config: &PatternsConfig) -> Result<Self, ConfigError> {
        let mut groups = Vec::with_capacity(config.groups.len());
        for group in &config.groups {
            let mut regexes = Vec::with_capacity(group.patterns.len());
            for pattern in &group.patterns {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ConfigError::InvalidRegex {
                        group: group.label.clone(),
                        pattern: pattern.clone(),
                        error: e.to_string(),
                    })?;
                regexes.push(regex);
            }
            groups.push(PatternGroup {
                label: group.label.clone(),
                regexes,
            });
        }
        Ok(Self { groups })
    }
}

/// Compute aggregate statistics over a finalized record sequence.
pub fn analyze_urls(records: &[UrlRecord]) -> UrlStats {
    let mut domains: HashSet<String> = HashSet::new();
    let mut extensions: HashMap<String, usize> = HashMap::new();
    let mut parameters: HashMap<String, usize> = HashMap::new();
    let mut sources: BTreeMap<String, usize> = BTreeMap::new();

    for record in records {
        *sources.entry(record.source.to_string()).or_insert(0) += 1;

        let Ok(parsed) = Url::parse(&record.url) else {
            continue;
        };

        if let Some(host) = parsed.host_str() {
            let authority = match parsed.port() {
                Some(port) => format!("{}:{}", host.to_lowercase(), port),
                None => host.to_lowercase(),
            };
            domains.insert(authority);
        }

        if let Some(ext) = path_extension(parsed.path()) {
            *extensions.entry(ext).or_insert(0) += 1;
        }

        // A name repeated within one URL (?id=1&id=2) counts once for
        // that URL.
        let names: HashSet<String> = parsed
            .query_pairs()
            .map(|(name, _)| name.into_owned())
            .collect();
        for name in names {
            *parameters.entry(name).or_insert(0) += 1;
        }
    }

    UrlStats {
        total_urls: records.len(),
        unique_domains: domains.len(),
        file_extensions: top_n(extensions),
        parameters_found: top_n(parameters),
        date_range: analyze_date_range(records),
        source_distribution: sources,
    }
}

/// Tag records matching the recon pattern table.
///
/// Each group is evaluated independently per URL, so a URL may carry one
/// tag per matching group but never two tags from the same group. Output
/// preserves input record order.
pub fn find_recon_highlights(records: &[UrlRecord], patterns: &ReconPatterns) -> Vec<ReconHighlight> {
    let mut highlights = Vec::new();
    for record in records {
        for group in &patterns.groups {
            if group.regexes.iter().any(|re| re.is_match(&record.url)) {
                highlights.push(ReconHighlight {
                    url: record.url.clone(),
                    label: group.label.clone(),
                });
            }
        }
    }
    highlights
}

fn analyze_date_range(records: &[UrlRecord]) -> DateRange {
    let mut earliest = None;
    let mut latest = None;
    for record in records {
        let Some(date) = timestamp_date(&record.timestamp) else {
            continue;
        };
        earliest = Some(earliest.map_or(date, |e: chrono::NaiveDate| e.min(date)));
        latest = Some(latest.map_or(date, |l: chrono::NaiveDate| l.max(date)));
    }
    match (earliest, latest) {
        (Some(earliest), Some(latest)) => DateRange {
            earliest: earliest.format("%Y-%m-%d").to_string(),
            latest: latest.format("%Y-%m-%d").to_string(),
        },
        _ => DateRange {
            earliest: DATE_NOT_AVAILABLE.to_string(),
            latest: DATE_NOT_AVAILABLE.to_string(),
        },
    }
}

/// File extension of a path: the suffix after the last `.`, lower-cased,
/// ignored when implausibly long.
fn path_extension(path: &str) -> Option<String> {
    let (_, ext) = path.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > MAX_EXTENSION_LEN {
        return None;
    }
    Some(ext.to_lowercase())
}

fn top_n(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    // Count descending, then name, so equal counts order deterministically.
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(TOP_N);
    entries
}
