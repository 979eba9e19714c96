use std::collections::HashSet;
use std::path::Path;

use crate::fetch::github::download_license;
use crate::fetch::Fetcher;
use crate::license::cache::{CacheHit, LicenseCache};
use crate::license::readme;
use crate::license::text::format_license_text;
use crate::models::{DependencyRecord, LicenseSource, LicenseTypes, Resolution, ResolvedLicense};
use crate::report::terminal::status_line;

/// Package names skipped before any resolution work.
#[derive(Debug, Default, Clone)]
pub struct IgnoreSet(HashSet<String>);

impl IgnoreSet {
    /// Parse a comma-separated list (`"a, b,c"`).
    pub fn parse(list: &str) -> Self {
        Self::from_names(list.split(','))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            names
                .into_iter()
                .map(|n| n.as_ref().trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Fall back to the raw README text.
    pub use_readme: bool,
    /// Fall back to the license section parsed out of the README.
    pub parse_readme: bool,
    /// Try downloading LICENSE files from the package's GitHub repository.
    pub attempt_download: bool,
}

/// Runs dependency records through the ordered license-resolution cascade.
pub struct Resolver<'a, F: Fetcher + ?Sized> {
    cache: &'a LicenseCache,
    ignore: &'a IgnoreSet,
    options: ResolveOptions,
    fetcher: &'a F,
    quiet: bool,
}

impl<'a, F: Fetcher + ?Sized> Resolver<'a, F> {
    pub fn new(
        cache: &'a LicenseCache,
        ignore: &'a IgnoreSet,
        options: ResolveOptions,
        fetcher: &'a F,
        quiet: bool,
    ) -> Self {
        Self {
            cache,
            ignore,
            options,
            fetcher,
            quiet,
        }
    }

    /// Resolve one record. `None` means the package is ignored.
    ///
    /// Never fails: unreadable files and failed downloads fall through to the
    /// next strategy and finally to an unresolved result.
    pub async fn resolve(&self, record: &DependencyRecord) -> Option<Resolution> {
        if self.ignore.contains(&record.name) {
            tracing::debug!(package = %record.id(), "ignored");
            return None;
        }

        let resolution = self.cascade(record).await;
        if !self.quiet {
            eprintln!("{}", status_line(&record.id(), &resolution.source));
        }
        Some(resolution)
    }

    async fn cascade(&self, record: &DependencyRecord) -> Resolution {
        let is_readme = record.license_file_is_readme();
        let file_text = match record.license_file.as_deref() {
            Some(path) => read_candidate(path).await,
            None => None,
        };

        // Local license file, or text handed over by the scanner
        let local_text = (if is_readme { None } else { file_text.as_deref() })
            .filter(|t| !t.trim().is_empty())
            .or_else(|| record.raw_text.as_deref().filter(|t| !t.trim().is_empty()));
        if let Some(text) = local_text {
            return resolved(record, text, record.declared_license.clone(), LicenseSource::LicenseFile);
        }

        match self.cache.lookup(&record.name, &record.version) {
            Some(CacheHit::Exact(text)) => {
                return resolved(record, text, None, LicenseSource::Cache);
            }
            Some(CacheHit::OtherVersion { version, text }) => {
                return resolved(
                    record,
                    text,
                    None,
                    LicenseSource::CacheOtherVersion(version.to_string()),
                );
            }
            None => {}
        }

        if self.options.attempt_download {
            if let Some(repository) = record.repository.as_deref() {
                if let Some((url, body)) = download_license(self.fetcher, repository).await {
                    return resolved(
                        record,
                        &body,
                        record.declared_license.clone(),
                        LicenseSource::Download(url),
                    );
                }
            }
        }

        let readme_text = file_text.as_deref().filter(|_| is_readme).filter(|t| !t.is_empty());

        if let (Some(text), true) = (readme_text, self.options.parse_readme) {
            let parsed = readme::extract(record.declared_license.as_ref(), text);
            if !parsed.text.is_empty() {
                return resolved(
                    record,
                    &parsed.text,
                    Some(LicenseTypes::One(parsed.types)),
                    LicenseSource::ReadmeParsed,
                );
            }
        }

        if let (Some(text), true) = (readme_text, self.options.use_readme) {
            return resolved(record, text, record.declared_license.clone(), LicenseSource::Readme);
        }

        let source = match record.declared_license.as_ref().filter(|d| !d.is_empty()) {
            Some(declared) => LicenseSource::Declared(declared.to_string()),
            None => LicenseSource::Missing,
        };
        resolved(record, "", None, source)
    }
}

fn resolved(
    record: &DependencyRecord,
    text: &str,
    types: Option<LicenseTypes>,
    source: LicenseSource,
) -> Resolution {
    Resolution {
        license: ResolvedLicense {
            name: record.name.clone(),
            version: record.version.clone(),
            text: format_license_text(text),
            types,
        },
        source,
    }
}

async fn read_candidate(path: &Path) -> Option<String> {
    // Invalid UTF-8 is replaced, not rejected.
    match tokio::fs::read(path).await {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "license file unreadable");
            None
        }
    }
}
