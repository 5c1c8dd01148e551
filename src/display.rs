//! Terminal output: banner, harvest progress bar, statistics table, and
//! recon highlight listing.

use indicatif::{ProgressBar, ProgressStyle};

use crate::analyzer::{ReconHighlight, UrlStats};

pub fn show_banner() {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  backurls — historical URL discovery & recon analysis");
    println!("  Sources: Wayback Machine · CommonCrawl · VirusTotal");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
}

/// Progress bar over the domain list, one tick per harvested domain.
pub fn harvest_progress(total_domains: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_domains);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb.set_message("harvesting...");
    pb
}

pub fn show_stats_table(stats: &UrlStats) {
    println!("\n=== Harvest Statistics ===");
    println!("Total URLs:      {}", stats.total_urls);
    println!("Unique domains:  {}", stats.unique_domains);
    println!(
        "Date range:      {} – {}",
        stats.date_range.earliest, stats.date_range.latest
    );

    if !stats.file_extensions.is_empty() {
        println!("\nTop file extensions:");
        for (ext, count) in &stats.file_extensions {
            println!("  .{ext}: {count}");
        }
    }

    println!("\nRecords per source:");
    for (source, count) in &stats.source_distribution {
        println!("  {source}: {count}");
    }
}

pub fn show_parameters(stats: &UrlStats) {
    if stats.parameters_found.is_empty() {
        return;
    }
    println!("\nCommon GET parameters (Top 10):");
    for (name, count) in &stats.parameters_found {
        println!("  {name}: {count}");
    }
}

pub fn show_recon_highlights(highlights: &[ReconHighlight]) {
    if highlights.is_empty() {
        println!("\nNo recon highlights detected in this run.");
        return;
    }
    println!("\nRecon Highlights");
    println!("{}", "-".repeat(60));
    for highlight in highlights {
        println!("{}: {}", highlight.label, highlight.url);
    }
    println!("{}", "-".repeat(60));
}
