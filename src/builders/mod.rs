//! Artifact builders.
//!
//! Every builder accumulates the same stream of resolved licenses and writes
//! one artifact at the end of the run:
//!
//! - [`text`] — `licenses.txt`, one banner + text block per package.
//! - [`json`] — `licenses.json`, `name → { version: text, types, repository }`.
//! - [`csv`] — `<name>.csv`, one row per package (long texts span rows).
//! - [`html`] — `<name>.html`, an index plus one anchored section per package.

pub mod csv;
pub mod html;
pub mod json;
pub mod text;

use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::error::GenResult;
use crate::models::{LicenseTypes, Resolution, ResolvedLicense, Status};

/// Where artifacts are written. `name` is the stem used by the CSV and HTML builders.
#[derive(Debug, Clone)]
pub struct OutputTarget {
    pub dir: PathBuf,
    pub name: String,
}

impl OutputTarget {
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

/// Accumulation contract shared by all builders.
pub trait LicenseBuilder {
    /// Record a license resolved from a file, download or README.
    fn add(&mut self, license: &ResolvedLicense);

    /// Record license text that did not come from the package itself.
    fn add_cached(&mut self, name: &str, version: &str, text: &str, types: Option<&LicenseTypes>);

    /// Record a package with no license text.
    fn add_empty(&mut self, name: &str, version: &str) {
        self.add_cached(name, version, "", None);
    }

    /// Write the artifact and return its path.
    fn write(&self, target: &OutputTarget) -> GenResult<PathBuf>;
}

/// The closed set of builders, chosen from the requested output formats.
#[derive(Debug)]
pub enum Builder {
    Text(text::TextBuilder),
    Json(json::JsonBuilder),
    Csv(csv::CsvBuilder),
    Html(html::HtmlBuilder),
}

impl Builder {
    pub fn for_format(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Builder::Text(text::TextBuilder::new()),
            OutputFormat::Json => Builder::Json(json::JsonBuilder::new()),
            OutputFormat::Csv => Builder::Csv(csv::CsvBuilder::new()),
            OutputFormat::Html => Builder::Html(html::HtmlBuilder::new()),
        }
    }

    fn inner(&mut self) -> &mut dyn LicenseBuilder {
        match self {
            Builder::Text(b) => b,
            Builder::Json(b) => b,
            Builder::Csv(b) => b,
            Builder::Html(b) => b,
        }
    }

    fn inner_ref(&self) -> &dyn LicenseBuilder {
        match self {
            Builder::Text(b) => b,
            Builder::Json(b) => b,
            Builder::Csv(b) => b,
            Builder::Html(b) => b,
        }
    }
}

impl LicenseBuilder for Builder {
    fn add(&mut self, license: &ResolvedLicense) {
        self.inner().add(license)
    }

    fn add_cached(&mut self, name: &str, version: &str, text: &str, types: Option<&LicenseTypes>) {
        self.inner().add_cached(name, version, text, types)
    }

    fn add_empty(&mut self, name: &str, version: &str) {
        self.inner().add_empty(name, version)
    }

    fn write(&self, target: &OutputTarget) -> GenResult<PathBuf> {
        self.inner_ref().write(target)
    }
}

/// Fan-out over the configured builders.
#[derive(Debug, Default)]
pub struct BuilderSet {
    builders: Vec<Builder>,
}

impl BuilderSet {
    /// One builder per distinct format, in the order given.
    pub fn from_formats(formats: &[OutputFormat]) -> Self {
        let mut seen = Vec::new();
        let builders = formats
            .iter()
            .copied()
            .filter(|f| {
                let new = !seen.contains(f);
                seen.push(*f);
                new
            })
            .map(Builder::for_format)
            .collect();
        Self { builders }
    }

    /// Broadcast a resolution; its status picks the accumulation method.
    pub fn dispatch(&mut self, resolution: &Resolution) {
        let license = &resolution.license;
        for builder in &mut self.builders {
            match resolution.status() {
                Status::Resolved => builder.add(license),
                Status::Cached => builder.add_cached(
                    &license.name,
                    &license.version,
                    &license.text,
                    license.types.as_ref(),
                ),
                Status::Unresolved => builder.add_empty(&license.name, &license.version),
            }
        }
    }

    pub fn add_cached(&mut self, name: &str, version: &str, text: &str, types: Option<&LicenseTypes>) {
        for builder in &mut self.builders {
            builder.add_cached(name, version, text, types);
        }
    }

    /// Attach a link-verification outcome to the JSON builder, if any.
    pub fn record_link(&mut self, name: &str, link: Option<String>) {
        if let Some(json) = self.json_mut() {
            json.record_link(name, link);
        }
    }

    pub fn has_json(&self) -> bool {
        self.builders.iter().any(|b| matches!(b, Builder::Json(_)))
    }

    pub fn json_mut(&mut self) -> Option<&mut json::JsonBuilder> {
        self.builders.iter_mut().find_map(|b| match b {
            Builder::Json(json) => Some(json),
            _ => None,
        })
    }

    /// Write every artifact. The first failure aborts.
    pub fn write_all(&self, target: &OutputTarget) -> GenResult<Vec<PathBuf>> {
        self.builders.iter().map(|b| b.write(target)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LicenseSource;

    fn resolution(name: &str, text: &str, source: LicenseSource) -> Resolution {
        Resolution {
            license: ResolvedLicense {
                name: name.to_string(),
                version: "1.0.0".to_string(),
                text: text.to_string(),
                types: None,
            },
            source,
        }
    }

    #[test]
    fn test_duplicate_formats_collapse() {
        let set = BuilderSet::from_formats(&[OutputFormat::Json, OutputFormat::Text, OutputFormat::Json]);
        assert_eq!(set.builders.len(), 2);
    }

    #[test]
    fn test_has_json() {
        assert!(BuilderSet::from_formats(&[OutputFormat::Text, OutputFormat::Json]).has_json());
        assert!(!BuilderSet::from_formats(&[OutputFormat::Csv]).has_json());
    }

    #[test]
    fn test_dispatch_reaches_every_builder() {
        let dir = tempfile::tempdir().unwrap();
        let target = OutputTarget {
            dir: dir.path().to_path_buf(),
            name: "output".to_string(),
        };
        let mut set = BuilderSet::from_formats(&[
            OutputFormat::Text,
            OutputFormat::Json,
            OutputFormat::Csv,
            OutputFormat::Html,
        ]);
        set.dispatch(&resolution("foo", "MIT text", LicenseSource::LicenseFile));
        set.dispatch(&resolution("cached", "ISC text", LicenseSource::Cache));
        set.dispatch(&resolution("gone", "", LicenseSource::Missing));

        let written = set.write_all(&target).unwrap();
        assert_eq!(written.len(), 4);
        for path in written {
            let content = std::fs::read_to_string(&path).unwrap();
            for name in ["foo", "cached", "gone"] {
                assert!(content.contains(name), "{} lacks {}", path.display(), name);
            }
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let target = OutputTarget {
            dir: PathBuf::from("/nonexistent/dir/for/license-gen"),
            name: "output".to_string(),
        };
        let set = BuilderSet::from_formats(&[OutputFormat::Text]);
        assert!(matches!(
            set.write_all(&target),
            Err(crate::error::GenError::Write { .. })
        ));
    }
}
