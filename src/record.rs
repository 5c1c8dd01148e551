use serde::{Deserialize, Serialize};

/// Upstream system a URL was harvested from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Wayback,
    CommonCrawl,
    VirusTotal,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Wayback => "wayback",
            Source::CommonCrawl => "commoncrawl",
            Source::VirusTotal => "virustotal",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single harvested URL observation.
///
/// Created by a source client at parse time and carried unchanged through
/// the pipeline; only `url` is rewritten during normalization
/// (percent-decoding and trimming).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UrlRecord {
    pub url: String,
    pub source: Source,
    /// Capture timestamp in the source's own format, commonly
    /// `YYYYMMDDhhmmss`. Empty when the source provides none; values
    /// shorter than 8 characters are unusable for date parsing.
    #[serde(default)]
    pub timestamp: String,
    /// HTTP status observed at capture time, when the source reports it.
    #[serde(default)]
    pub status_code: Option<u16>,
}

impl UrlRecord {
    pub fn new(url: impl Into<String>, source: Source) -> Self {
        Self {
            url: url.into(),
            source,
            timestamp: String::new(),
            status_code: None,
        }
    }

    pub fn with_timestamp(
        url: impl Into<String>,
        source: Source,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            source,
            timestamp: timestamp.into(),
            status_code: None,
        }
    }
}
