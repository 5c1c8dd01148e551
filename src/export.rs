//! Exporters over the finalized record sequence.
//!
//! Each exporter is an independent consumer: TXT (one URL per line), JSON
//! (metadata + records + optional statistics), CSV, and an HTML report.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use askama::Template;
use chrono::{Local, Utc};
use csv::Writer;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzer::UrlStats;
use crate::record::UrlRecord;

/// Directory default output files are written to.
pub const OUTPUT_DIR: &str = "results";

/// Resolve the output path for a run. An explicit filename with a path
/// component is respected as-is; a bare filename lands in the output
/// directory; no filename yields a timestamped default. The output
/// directory is created when needed.
pub fn resolve_output_path(output: Option<&str>, format: &str) -> Result<PathBuf> {
    let path = match output {
        Some(name) if Path::new(name).parent().is_some_and(|p| !p.as_os_str().is_empty()) => {
            PathBuf::from(name)
        }
        Some(name) => {
            fs::create_dir_all(OUTPUT_DIR)?;
            Path::new(OUTPUT_DIR).join(name)
        }
        None => {
            fs::create_dir_all(OUTPUT_DIR)?;
            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            Path::new(OUTPUT_DIR).join(format!("backurls_results_{timestamp}.{format}"))
        }
    };
    Ok(path)
}

pub fn export_txt(records: &[UrlRecord], output_path: &Path) -> Result<()> {
    debug!("exporting {} URLs to TXT: {}", records.len(), output_path.display());

    let mut file = File::create(output_path)
        .with_context(|| format!("failed to create {}", output_path.display()))?;
    for record in records {
        writeln!(file, "{}", record.url)?;
    }

    info!("exported {} URLs to {}", records.len(), output_path.display());
    Ok(())
}

#[derive(Serialize)]
struct JsonExport<'a> {
    metadata: ExportMetadata,
    urls: &'a [UrlRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<&'a UrlStats>,
}

#[derive(Serialize)]
struct ExportMetadata {
    exported_at: String,
    total_urls: usize,
    tool: &'static str,
}

pub fn export_json(records: &[UrlRecord], output_path: &Path, stats: Option<&UrlStats>) -> Result<()> {
    debug!("exporting {} URLs to JSON: {}", records.len(), output_path.display());

    let export = JsonExport {
        metadata: ExportMetadata {
            exported_at: Utc::now().to_rfc3339(),
            total_urls: records.len(),
            tool: concat!("backurls v", env!("CARGO_PKG_VERSION")),
        },
        urls: records,
        statistics: stats,
    };

    let json = serde_json::to_string_pretty(&export)?;
    fs::write(output_path, json)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    info!("exported {} URLs to {}", records.len(), output_path.display());
    Ok(())
}

pub fn export_csv(records: &[UrlRecord], output_path: &Path) -> Result<()> {
    debug!("exporting {} URLs to CSV: {}", records.len(), output_path.display());

    let file = File::create(output_path)
        .with_context(|| format!("failed to create {}", output_path.display()))?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(["URL", "Source", "Timestamp", "Status Code"])?;
    for record in records {
        let status = record
            .status_code
            .map(|code| code.to_string())
            .unwrap_or_default();
        wtr.write_record([
            record.url.as_str(),
            record.source.as_str(),
            record.timestamp.as_str(),
            status.as_str(),
        ])?;
    }
    wtr.flush()?;

    info!("exported {} URLs to {}", records.len(), output_path.display());
    Ok(())
}

#[derive(Template)]
#[template(path = "report.html")]
struct HtmlReportTemplate<'a> {
    generated_at: String,
    total_urls: usize,
    records: &'a [UrlRecord],
    stats: Option<&'a UrlStats>,
}

pub fn export_html(records: &[UrlRecord], output_path: &Path, stats: Option<&UrlStats>) -> Result<()> {
    debug!("exporting {} URLs to HTML: {}", records.len(), output_path.display());

    let template = HtmlReportTemplate {
        generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        total_urls: records.len(),
        records,
        stats,
    };
    let html = template.render().context("failed to render HTML report")?;
    fs::write(output_path, html)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    info!("exported {} URLs to {}", records.len(), output_path.display());
    Ok(())
}
