//! `license-gen`: gather the license text of every dependency into reports.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and load config ([`config::load_config`]).
//! 2. Enumerate dependencies with a [`scanner`].
//! 3. Resolve each record through the license cascade ([`license::cascade`]).
//! 4. Broadcast every resolution to the selected [`builders`].
//! 5. Optionally verify license links (`--links`, [`fetch::links`]); all probes
//!    settle before anything is written.
//! 6. Write the artifacts, report missing data ([`report::missing`]) and print
//!    the run summary ([`report::terminal`]).
//!
//! Exit code is `0` on success and non-zero on scanner, cache, config or write errors.

mod builders;
mod cli;
mod config;
mod convert;
mod error;
mod fetch;
mod license;
mod models;
mod pipeline;
mod report;
mod scanner;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use builders::{BuilderSet, OutputTarget};
use cli::{Cli, Command, ConvertArgs, GenerateArgs};
use config::{load_config, GenerateSettings};
use fetch::HttpFetcher;
use license::cache::LicenseCache;
use license::cascade::Resolver;
use pipeline::Pipeline;
use scanner::document::DocumentScanner;
use scanner::node_modules::NodeModulesScanner;
use scanner::Scanner;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "license_gen=warn",
        1 => "license_gen=info",
        _ => "license_gen=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Command::Generate(args) => generate(&cli, args).await,
        Command::Convert(args) => run_convert(&cli, args),
    }
}

async fn generate(cli: &Cli, args: &GenerateArgs) -> Result<()> {
    let directory = args
        .directory
        .canonicalize()
        .unwrap_or_else(|_| args.directory.clone());

    let config = load_config(&directory, cli.config.as_deref())?;
    let settings = GenerateSettings::merge(args, &config);
    tracing::info!(?settings, "generate");

    let cache = match &settings.cache_file {
        Some(path) => LicenseCache::load(path)?,
        None => LicenseCache::default(),
    };
    tracing::info!(packages = cache.len(), "license cache ready");

    let fetcher = HttpFetcher::new(config.network.timeout(), &config.network.user_agent)?;

    if !cli.quiet {
        eprintln!(
            "Searching for {} licenses in {}",
            if settings.production { "production" } else { "development" },
            directory.display()
        );
    }

    let records = match &args.input {
        Some(input) => DocumentScanner::new(input).scan()?,
        None => NodeModulesScanner::new(&directory, settings.production).scan()?,
    };
    if !cli.quiet {
        eprintln!("  {} {} dependencies", "→".cyan(), records.len());
    }

    let resolver = Resolver::new(&cache, &settings.ignore, settings.options, &fetcher, cli.quiet);
    let pipeline = Pipeline::new(resolver, &fetcher, settings.links, cli.quiet);

    let mut builders = BuilderSet::from_formats(&settings.formats);
    let summary = pipeline.run(&records, &mut builders).await;

    let target = OutputTarget {
        dir: settings.out_dir.clone(),
        name: settings.output_name.clone(),
    };
    let written = builders
        .write_all(&target)
        .context("writing license reports")?;

    report::terminal::render(&summary, &written, cli.quiet);
    Ok(())
}

fn run_convert(cli: &Cli, args: &ConvertArgs) -> Result<()> {
    let mut builders = BuilderSet::from_formats(&args.formats);
    let target = OutputTarget {
        dir: args.out_dir.clone(),
        name: args.name.clone(),
    };

    let written = convert::convert(&args.input, &mut builders, &target)
        .with_context(|| format!("converting {}", args.input.display()))?;

    if !cli.quiet {
        for path in &written {
            println!(" {} Wrote {}", "✓".green(), path.display());
        }
    }
    Ok(())
}
