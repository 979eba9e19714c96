//! Drives records through the cascade and into the builders.
//!
//! Records are resolved one at a time in scanner order and broadcast to every
//! builder. Link probes are collected as pending futures while the stream is
//! processed and joined once at the end; nothing is written before that join.

use std::collections::HashSet;

use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};

use crate::builders::BuilderSet;
use crate::fetch::links::LinkVerifier;
use crate::fetch::Fetcher;
use crate::license::cascade::Resolver;
use crate::models::DependencyRecord;
use crate::report::terminal::RunSummary;

pub struct Pipeline<'a, F: Fetcher + ?Sized> {
    resolver: Resolver<'a, F>,
    fetcher: &'a F,
    links: bool,
    quiet: bool,
}

impl<'a, F: Fetcher + ?Sized> Pipeline<'a, F> {
    pub fn new(resolver: Resolver<'a, F>, fetcher: &'a F, links: bool, quiet: bool) -> Self {
        Self {
            resolver,
            fetcher,
            links,
            quiet,
        }
    }

    /// Resolve every record into `builders`. Returns once all link probes have settled.
    pub async fn run(&self, records: &[DependencyRecord], builders: &mut BuilderSet) -> RunSummary {
        let mut summary = RunSummary::default();
        let check_links = self.links && builders.has_json();
        if self.links && !check_links {
            tracing::warn!("--links only applies to JSON output; skipping link verification");
        }
        let verifier = LinkVerifier::new(self.fetcher, self.progress_bar(records.len(), check_links));
        let mut probes = Vec::new();
        let mut seen: HashSet<(&str, &str)> = HashSet::new();

        for record in records {
            if !seen.insert((record.name.as_str(), record.version.as_str())) {
                tracing::debug!(package = %record.id(), "duplicate record skipped");
                summary.duplicates += 1;
                continue;
            }
            let Some(resolution) = self.resolver.resolve(record).await else {
                summary.ignored += 1;
                continue;
            };
            summary.record(&resolution.source);
            builders.dispatch(&resolution);

            if check_links {
                let verifier = &verifier;
                probes.push(async move {
                    let link = verifier
                        .verify(
                            &record.name,
                            record.repository.as_deref(),
                            record.license_file.as_deref(),
                        )
                        .await;
                    (record.name.as_str(), link)
                });
            }
        }

        for (name, link) in join_all(probes).await {
            builders.record_link(name, link);
        }
        verifier.finish();

        summary
    }

    fn progress_bar(&self, len: usize, enabled: bool) -> ProgressBar {
        if self.quiet || !enabled {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} links")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::builders::json::JsonBuilder;
    use crate::builders::LicenseBuilder;
    use crate::cli::OutputFormat;
    use crate::fetch::stub::StubFetcher;
    use crate::license::cache::LicenseCache;
    use crate::license::cascade::{IgnoreSet, ResolveOptions};

    fn record(name: &str, license_file: Option<PathBuf>, repository: Option<&str>) -> DependencyRecord {
        DependencyRecord {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            license_file,
            repository: repository.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_ignored_packages_leave_no_trace() {
        let cache = LicenseCache::from_json_str(r#"{"bar":{"1.0.0":"bar text"}}"#).unwrap();
        let ignore = IgnoreSet::parse("bar");
        let fetcher = StubFetcher::default();
        let resolver = Resolver::new(&cache, &ignore, ResolveOptions::default(), &fetcher, true);
        let pipeline = Pipeline::new(resolver, &fetcher, false, true);

        let mut builders = BuilderSet::from_formats(&[OutputFormat::Json]);
        let records = vec![record("foo", None, None), record("bar", None, None)];
        let summary = pipeline.run(&records, &mut builders).await;

        assert_eq!(summary.ignored, 1);
        assert_eq!(summary.total(), 1);
        let json = builders.json_mut().unwrap();
        assert_eq!(json.packages().len(), 1);
        assert_eq!(json.packages()[0].0, "foo");
    }

    #[tokio::test]
    async fn test_links_recorded_after_join() {
        let dir = tempfile::tempdir().unwrap();
        let license = dir.path().join("LICENSE");
        std::fs::write(&license, "MIT").unwrap();

        let cache = LicenseCache::default();
        let ignore = IgnoreSet::default();
        let fetcher = StubFetcher::default()
            .with_page("https://github.com/u/good/blob/master/LICENSE", "ok");
        let resolver = Resolver::new(&cache, &ignore, ResolveOptions::default(), &fetcher, true);
        let pipeline = Pipeline::new(resolver, &fetcher, true, true);

        let mut builders = BuilderSet::from_formats(&[OutputFormat::Text, OutputFormat::Json]);
        let records = vec![
            record("good", Some(license.clone()), Some("https://github.com/u/good")),
            record("bad", Some(license.clone()), Some("https://github.com/u/bad")),
            record("norepo", Some(license), None),
        ];
        pipeline.run(&records, &mut builders).await;

        let json: &JsonBuilder = builders.json_mut().unwrap();
        assert!(json.links_checked());
        let repos: Vec<Option<&str>> = json
            .packages()
            .iter()
            .map(|(_, e)| e.repository.as_deref())
            .collect();
        assert_eq!(
            repos,
            vec![Some("https://github.com/u/good/blob/master/LICENSE"), None, None]
        );
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_links_skipped_without_json_output() {
        let cache = LicenseCache::default();
        let ignore = IgnoreSet::default();
        let fetcher = StubFetcher::default()
            .with_page("https://github.com/u/good/blob/master/LICENSE", "ok");
        let resolver = Resolver::new(&cache, &ignore, ResolveOptions::default(), &fetcher, true);
        let pipeline = Pipeline::new(resolver, &fetcher, true, true);

        let mut builders = BuilderSet::from_formats(&[OutputFormat::Text, OutputFormat::Csv]);
        let records = vec![record(
            "good",
            Some(PathBuf::from("LICENSE")),
            Some("https://github.com/u/good"),
        )];
        let summary = pipeline.run(&records, &mut builders).await;

        assert_eq!(summary.total(), 1);
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_records_resolved_once() {
        let cache = LicenseCache::default();
        let ignore = IgnoreSet::default();
        let fetcher = StubFetcher::default();
        let resolver = Resolver::new(&cache, &ignore, ResolveOptions::default(), &fetcher, true);
        let pipeline = Pipeline::new(resolver, &fetcher, false, true);

        let mut builders = BuilderSet::from_formats(&[OutputFormat::Csv]);
        let records = vec![record("foo", None, None), record("foo", None, None)];
        let summary = pipeline.run(&records, &mut builders).await;
        assert_eq!(summary.total(), 1);
        assert_eq!(summary.duplicates, 1);
    }

    #[tokio::test]
    async fn test_builders_see_same_status() {
        let cache = LicenseCache::from_json_str(r#"{"foo":{"2.0.0":"MIT"}}"#).unwrap();
        let ignore = IgnoreSet::default();
        let fetcher = StubFetcher::default();
        let resolver = Resolver::new(&cache, &ignore, ResolveOptions::default(), &fetcher, true);
        let pipeline = Pipeline::new(resolver, &fetcher, false, true);

        let mut builders = BuilderSet::from_formats(&[OutputFormat::Json]);
        pipeline.run(&[record("foo", None, None)], &mut builders).await;

        let mut expected = JsonBuilder::new();
        expected.add_cached("foo", "1.0.0", "MIT", None);
        assert_eq!(
            builders.json_mut().unwrap().to_json().unwrap(),
            expected.to_json().unwrap()
        );
    }
}
