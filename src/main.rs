use std::io::{self, BufRead, IsTerminal};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use backurls::analyzer::{self, ReconPatterns};
use backurls::cli::{split_list, Cli};
use backurls::config::AppConfig;
use backurls::display;
use backurls::export;
use backurls::filter::{self, CleanOptions, DedupeKey, FilterMode};
use backurls::harvester::UrlHarvester;

/// Set by the Ctrl-C handler; harvesting aborts and no output is written.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.init {
        let path = AppConfig::create_default_config()
            .context("failed to create configuration file")?;
        println!("Created default configuration file at {}", path.display());
        return Ok(());
    }

    init_tracing(cli.verbose);

    if !matches!(cli.format.as_str(), "txt" | "json" | "csv" | "html") {
        bail!("unsupported output format '{}' (expected txt, json, csv, or html)", cli.format);
    }

    let config = AppConfig::load().context("failed to load configuration")?;
    let recon_patterns = ReconPatterns::from_config(&config.patterns)?;

    let domains = collect_domains(&cli)?;
    if domains.is_empty() {
        bail!("no domains provided");
    }

    // Parse date bounds up front so a typo fails before any network work.
    let start_date = cli
        .start_date
        .as_deref()
        .map(filter::parse_date_bound)
        .transpose()?;
    let end_date = cli
        .end_date
        .as_deref()
        .map(filter::parse_date_bound)
        .transpose()?;

    ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst))
        .context("failed to install interrupt handler")?;

    display::show_banner();

    let harvester = UrlHarvester::new(&config, cli.threads)?;
    let progress = display::harvest_progress(domains.len() as u64);
    let raw = harvester
        .harvest_all(&domains, cli.include_subs, &INTERRUPTED, |domain, count| {
            progress.set_message(format!("{domain}: {count} URLs"));
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();

    if INTERRUPTED.load(Ordering::SeqCst) {
        eprintln!("Interrupted by user; no output written.");
        std::process::exit(130);
    }

    let clean_opts = CleanOptions {
        allowed_schemes: config.filter.allowed_schemes.clone(),
        min_length: cli.minlen.unwrap_or(config.filter.min_url_length),
        extensions: split_list(&cli.extensions),
        include_patterns: split_list(&cli.include),
        exclude_patterns: split_list(&cli.exclude),
    };
    let mut records = filter::clean_and_filter(raw, &clean_opts);

    // The extension deny-list runs against the merged set, separately from
    // the cleaning pass.
    if let Some(exclude_extensions) = split_list(&cli.exclude_extensions) {
        records = filter::filter_by_extensions(records, &exclude_extensions, FilterMode::Exclude);
    }

    if start_date.is_some() || end_date.is_some() {
        records = filter::filter_by_date_range(records, start_date, end_date);
    }

    records = filter::deduplicate(records, DedupeKey::Url);

    let highlights = analyzer::find_recon_highlights(&records, &recon_patterns);
    display::show_recon_highlights(&highlights);

    let stats = if cli.analyze || cli.show_stats {
        Some(analyzer::analyze_urls(&records))
    } else {
        None
    };
    if let Some(stats) = &stats {
        if cli.show_stats {
            display::show_stats_table(stats);
        }
        if cli.analyze {
            display::show_parameters(stats);
        }
    }

    let output_path = export::resolve_output_path(cli.output.as_deref(), &cli.format)?;
    match cli.format.as_str() {
        "json" => export::export_json(
            &records,
            &output_path,
            if cli.analyze { stats.as_ref() } else { None },
        )?,
        "csv" => export::export_csv(&records, &output_path)?,
        "html" => export::export_html(
            &records,
            &output_path,
            if cli.analyze { stats.as_ref() } else { None },
        )?,
        _ => export::export_txt(&records, &output_path)?,
    }

    println!("\nHarvesting complete! Found {} unique URLs", records.len());
    println!("Results saved to: {}", output_path.display());

    Ok(())
}

/// Domains from positional arguments, or one per line from stdin when no
/// arguments were given and stdin is piped.
fn collect_domains(cli: &Cli) -> Result<Vec<String>> {
    if !cli.domains.is_empty() {
        return Ok(cli.domains.clone());
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(Vec::new());
    }
    let mut domains = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        let domain = line.trim();
        if !domain.is_empty() {
            domains.push(domain.to_string());
        }
    }
    Ok(domains)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("backurls={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
