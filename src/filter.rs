//! URL normalization, rule-based filtering, and deduplication.
//!
//! `clean_and_filter` is the single-pass post-harvest cleaning step. The
//! remaining functions are separately invokable filters; in particular the
//! extension deny-list runs against the merged set after cleaning, not
//! inside the cleaning pass, because call sites differ.

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use percent_encoding::percent_decode_str;
use regex::{Regex, RegexBuilder};
use url::Url;

use crate::record::UrlRecord;

/// Options for the post-harvest cleaning pass.
#[derive(Debug, Clone)]
pub struct CleanOptions {
    pub allowed_schemes: Vec<String>,
    pub min_length: usize,
    /// Keep only URLs whose path ends in one of these extensions.
    pub extensions: Option<Vec<String>>,
    /// Keep only URLs containing at least one of these substrings.
    pub include_patterns: Option<Vec<String>>,
    /// Drop URLs containing any of these substrings.
    pub exclude_patterns: Option<Vec<String>>,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            allowed_schemes: vec!["http".to_string(), "https".to_string()],
            min_length: 10,
            extensions: None,
            include_patterns: None,
            exclude_patterns: None,
        }
    }
}

/// Whether an extension filter keeps or drops matching URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Include,
    Exclude,
}

/// Key used for deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeKey {
    /// Exact URL string.
    Url,
    /// URL path only, ignoring scheme, authority, and query.
    Path,
}

/// Clean, filter, and deduplicate harvested records in one ordered pass.
///
/// Per record: percent-decode and trim the URL, drop it when empty, when
/// its scheme is not allowed, when it is shorter than the minimum length,
/// when it fails the extension allow-list, or when it fails the substring
/// include/exclude rules. Surviving URLs are deduplicated by exact string,
/// first occurrence wins. The record's `url` field is rewritten to the
/// decoded form; `source` and `timestamp` are untouched.
pub fn clean_and_filter(records: Vec<UrlRecord>, opts: &CleanOptions) -> Vec<UrlRecord> {
    let extensions = opts.extensions.as_deref().map(normalize_extensions);

    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::new();

    for mut record in records {
        let url = percent_decode_str(&record.url)
            .decode_utf8_lossy()
            .trim()
            .to_string();
        if url.is_empty() {
            continue;
        }

        let Ok(parsed) = Url::parse(&url) else {
            // No parse, no scheme to allow.
            continue;
        };
        if !opts.allowed_schemes.iter().any(|s| s == parsed.scheme()) {
            continue;
        }
        if url.len() < opts.min_length {
            continue;
        }

        if let Some(extensions) = &extensions {
            if !path_has_extension(parsed.path(), extensions) {
                continue;
            }
        }
        if let Some(patterns) = &opts.include_patterns {
            if !patterns.iter().any(|p| url.contains(p.as_str())) {
                continue;
            }
        }
        if let Some(patterns) = &opts.exclude_patterns {
            if patterns.iter().any(|p| url.contains(p.as_str())) {
                continue;
            }
        }

        if seen.insert(url.clone()) {
            record.url = url;
            kept.push(record);
        }
    }

    kept
}

/// Keep (`FilterMode::Include`) or drop (`FilterMode::Exclude`) records
/// whose URL path ends in one of the given extensions. An empty extension
/// list keeps everything.
pub fn filter_by_extensions(
    records: Vec<UrlRecord>,
    extensions: &[String],
    mode: FilterMode,
) -> Vec<UrlRecord> {
    if extensions.is_empty() {
        return records;
    }
    let extensions = normalize_extensions(extensions);

    records
        .into_iter()
        .filter(|record| {
            let path = Url::parse(&record.url)
                .map(|u| u.path().to_string())
                .unwrap_or_else(|_| record.url.clone());
            let matches = path_has_extension(&path, &extensions);
            match mode {
                FilterMode::Include => matches,
                FilterMode::Exclude => !matches,
            }
        })
        .collect()
}

/// Filter records by case-insensitive regular expressions: keep a record
/// only if it matches at least one include pattern (when given) and no
/// exclude pattern.
pub fn filter_by_patterns(
    records: Vec<UrlRecord>,
    include_patterns: Option<&[String]>,
    exclude_patterns: Option<&[String]>,
) -> Result<Vec<UrlRecord>> {
    let include = compile_patterns(include_patterns)?;
    let exclude = compile_patterns(exclude_patterns)?;

    Ok(records
        .into_iter()
        .filter(|record| {
            if let Some(include) = &include {
                if !include.iter().any(|re| re.is_match(&record.url)) {
                    return false;
                }
            }
            if let Some(exclude) = &exclude {
                if exclude.iter().any(|re| re.is_match(&record.url)) {
                    return false;
                }
            }
            true
        })
        .collect())
}

/// Keep only records whose capture date falls inside the given bounds.
/// Records without a parseable `YYYYMMDD` timestamp prefix are dropped.
pub fn filter_by_date_range(
    records: Vec<UrlRecord>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Vec<UrlRecord> {
    if start_date.is_none() && end_date.is_none() {
        return records;
    }

    records
        .into_iter()
        .filter(|record| {
            let Some(date) = timestamp_date(&record.timestamp) else {
                return false;
            };
            if let Some(start) = start_date {
                if date < start {
                    return false;
                }
            }
            if let Some(end) = end_date {
                if date > end {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// Remove duplicate records, first occurrence wins.
pub fn deduplicate(records: Vec<UrlRecord>, key: DedupeKey) -> Vec<UrlRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    records
        .into_iter()
        .filter(|record| {
            let k = match key {
                DedupeKey::Url => record.url.clone(),
                DedupeKey::Path => Url::parse(&record.url)
                    .map(|u| u.path().to_string())
                    .unwrap_or_else(|_| record.url.clone()),
            };
            seen.insert(k)
        })
        .collect()
}

/// Parse a `YYYY-MM-DD` date bound from the command line.
pub fn parse_date_bound(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

/// Date encoded in the first 8 characters of a source timestamp, when
/// present and well-formed.
pub fn timestamp_date(timestamp: &str) -> Option<NaiveDate> {
    if timestamp.len() < 8 {
        return None;
    }
    NaiveDate::parse_from_str(&timestamp[..8], "%Y%m%d").ok()
}

/// Lower-case extension tokens and strip a leading dot.
fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn path_has_extension(path: &str, extensions: &[String]) -> bool {
    let path = path.to_lowercase();
    extensions.iter().any(|ext| path.ends_with(&format!(".{ext}")))
}

fn compile_patterns(patterns: Option<&[String]>) -> Result<Option<Vec<Regex>>> {
    let Some(patterns) = patterns else {
        return Ok(None);
    };
    let compiled = patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .with_context(|| format!("invalid pattern '{pattern}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(compiled))
}
