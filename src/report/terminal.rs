use std::path::PathBuf;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::models::{LicenseSource, Status};

/// Colored one-line status for a cascade outcome.
pub fn status_line(package_id: &str, source: &LicenseSource) -> String {
    match source {
        LicenseSource::LicenseFile => format!("License file found for {}.", package_id)
            .green()
            .to_string(),
        LicenseSource::Cache => format!("License found in cache for {}.", package_id)
            .bright_black()
            .to_string(),
        LicenseSource::CacheOtherVersion(version) => format!(
            "License found in cache for a different version of {} (using {}).",
            package_id, version
        )
        .yellow()
        .to_string(),
        LicenseSource::Download(url) => format!("License downloaded for {} from {}.", package_id, url)
            .cyan()
            .to_string(),
        LicenseSource::ReadmeParsed => format!("License found and parsed from {} README.", package_id)
            .magenta()
            .to_string(),
        LicenseSource::Readme => format!("License taken from {} README.", package_id)
            .truecolor(0xcc, 0x22, 0xaa)
            .to_string(),
        LicenseSource::Declared(declared) => format!(
            "License source not found for {}, but the package specifies a license: {}.",
            package_id, declared
        )
        .red()
        .to_string(),
        LicenseSource::Missing => format!("License could not be detected for package {}.", package_id)
            .red()
            .to_string(),
    }
}

/// Per-source tally of one run.
#[derive(Debug, Default)]
pub struct RunSummary {
    counts: Vec<(LicenseSource, usize)>,
    pub ignored: usize,
    pub duplicates: usize,
}

impl RunSummary {
    pub fn record(&mut self, source: &LicenseSource) {
        let label = source.label();
        match self.counts.iter_mut().find(|(s, _)| s.label() == label) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((source.clone(), 1)),
        }
    }

    pub fn count(&self, status: Status) -> usize {
        self.counts
            .iter()
            .filter(|(s, _)| s.status() == status)
            .map(|(_, n)| n)
            .sum()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Print the written artifacts and a summary table.
pub fn render(summary: &RunSummary, written: &[PathBuf], quiet: bool) {
    if quiet {
        println!(
            "Total: {}  Resolved: {}  Cached: {}  Unresolved: {}",
            summary.total(),
            summary.count(Status::Resolved).to_string().green(),
            summary.count(Status::Cached).to_string().yellow(),
            summary.count(Status::Unresolved).to_string().red(),
        );
        return;
    }

    for path in written {
        println!(" {} Wrote {}", "✓".green(), path.display());
    }
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Packages").add_attribute(Attribute::Bold),
        ]);

    for (source, n) in &summary.counts {
        let status = source.status();
        let color = match status {
            Status::Resolved => Color::Green,
            Status::Cached => Color::Yellow,
            Status::Unresolved => Color::Red,
        };
        table.add_row(vec![
            Cell::new(source.label()),
            Cell::new(status.to_string()).fg(color),
            Cell::new(n).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{}", table);
    println!(
        " Total: {}  (ignored: {}, duplicates skipped: {})",
        summary.total(),
        summary.ignored,
        summary.duplicates
    );
}
