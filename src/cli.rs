use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "backurls")]
#[command(about = "Historical URL harvester and recon analyzer")]
#[command(version)]
pub struct Cli {
    /// Target domains. When none are given, domains are read one per line
    /// from standard input.
    pub domains: Vec<String>,

    /// Create default configuration file at ./config/backurls.toml
    #[arg(long)]
    pub init: bool,

    /// Include subdomains (*.domain) in source queries
    #[arg(long)]
    pub include_subs: bool,

    /// Output format: 'txt' (default), 'json', 'csv', or 'html'
    #[arg(short = 'f', long, default_value = "txt")]
    pub format: String,

    /// Output filename (defaults to a timestamped file under ./results)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Maximum concurrent source requests across all domains
    #[arg(short, long, default_value = "50")]
    pub threads: usize,

    /// Only include URLs with these extensions (comma-separated)
    #[arg(long)]
    pub extensions: Option<String>,

    /// Exclude URLs with these extensions (comma-separated)
    #[arg(long)]
    pub exclude_extensions: Option<String>,

    /// Minimum URL length (overrides the configured default)
    #[arg(long)]
    pub minlen: Option<usize>,

    /// Only include URLs containing these strings (comma-separated)
    #[arg(long)]
    pub include: Option<String>,

    /// Exclude URLs containing these strings (comma-separated)
    #[arg(long)]
    pub exclude: Option<String>,

    /// Keep only records captured on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Keep only records captured on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Perform URL analysis (statistics included in JSON export)
    #[arg(long)]
    pub analyze: bool,

    /// Show the statistics table after harvesting
    #[arg(long)]
    pub show_stats: bool,

    /// Verbose logging (-v for INFO, -vv for DEBUG)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Split a comma-separated flag value into trimmed, non-empty items.
pub fn split_list(value: &Option<String>) -> Option<Vec<String>> {
    let value = value.as_deref()?;
    let items: Vec<String> = value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
