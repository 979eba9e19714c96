use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One package+version unit produced by a scanner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyRecord {
    pub name: String,
    pub version: String,
    /// License identifier(s) declared in the package manifest.
    pub declared_license: Option<LicenseTypes>,
    /// Candidate license file on disk (may be a README).
    pub license_file: Option<PathBuf>,
    pub repository: Option<String>,
    /// License text supplied directly by the scanner.
    pub raw_text: Option<String>,
}

impl DependencyRecord {
    pub fn id(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// `true` when the only candidate license file is the package README.
    pub fn license_file_is_readme(&self) -> bool {
        self.license_file
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|f| f.to_string_lossy().to_lowercase().contains("readme"))
            .unwrap_or(false)
    }
}

/// Declared or inferred license identifiers: either a single string or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LicenseTypes {
    One(String),
    Many(Vec<String>),
}

impl LicenseTypes {
    pub fn is_empty(&self) -> bool {
        match self {
            LicenseTypes::One(s) => s.trim().is_empty(),
            LicenseTypes::Many(v) => v.iter().all(|s| s.trim().is_empty()),
        }
    }
}

impl std::fmt::Display for LicenseTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseTypes::One(s) => write!(f, "{}", s),
            LicenseTypes::Many(v) => write!(f, "{}", v.join(",")),
        }
    }
}

/// The license payload handed to every builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLicense {
    pub name: String,
    pub version: String,
    /// Always normalized (see [`crate::license::text::format_license_text`]).
    pub text: String,
    pub types: Option<LicenseTypes>,
}

/// Which accumulation method a resolution maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Resolved,
    Cached,
    Unresolved,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Resolved => write!(f, "resolved"),
            Status::Cached => write!(f, "cached"),
            Status::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// The cascade branch that produced a resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum LicenseSource {
    LicenseFile,
    Cache,
    /// Cache hit for another version of the package (the version used).
    CacheOtherVersion(String),
    /// Downloaded from the given URL.
    Download(String),
    ReadmeParsed,
    Readme,
    /// No text found but the manifest declares a license.
    Declared(String),
    Missing,
}

impl LicenseSource {
    pub fn status(&self) -> Status {
        match self {
            LicenseSource::LicenseFile
            | LicenseSource::Download(_)
            | LicenseSource::ReadmeParsed
            | LicenseSource::Readme => Status::Resolved,
            LicenseSource::Cache | LicenseSource::CacheOtherVersion(_) => Status::Cached,
            LicenseSource::Declared(_) | LicenseSource::Missing => Status::Unresolved,
        }
    }

    /// Short label used in the run summary.
    pub fn label(&self) -> &'static str {
        match self {
            LicenseSource::LicenseFile => "license file",
            LicenseSource::Cache => "cache",
            LicenseSource::CacheOtherVersion(_) => "cache (other version)",
            LicenseSource::Download(_) => "download",
            LicenseSource::ReadmeParsed => "readme (parsed)",
            LicenseSource::Readme => "readme",
            LicenseSource::Declared(_) => "declared only",
            LicenseSource::Missing => "missing",
        }
    }
}

/// Outcome of running one record through the cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub license: ResolvedLicense,
    pub source: LicenseSource,
}

impl Resolution {
    pub fn status(&self) -> Status {
        self.source.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readme_detection_uses_file_name() {
        let mut rec = DependencyRecord {
            license_file: Some(PathBuf::from("/x/readme-tools/LICENSE")),
            ..Default::default()
        };
        assert!(!rec.license_file_is_readme());
        rec.license_file = Some(PathBuf::from("/x/pkg/README.markdown"));
        assert!(rec.license_file_is_readme());
    }

    #[test]
    fn test_license_types_display_and_serde() {
        let many: LicenseTypes = serde_json::from_str(r#"["MIT","ISC"]"#).unwrap();
        assert_eq!(many.to_string(), "MIT,ISC");
        let one: LicenseTypes = serde_json::from_str(r#""Apache-2.0""#).unwrap();
        assert_eq!(one, LicenseTypes::One("Apache-2.0".to_string()));
        assert!(LicenseTypes::One("  ".into()).is_empty());
    }

    #[test]
    fn test_source_status_mapping() {
        assert_eq!(LicenseSource::Readme.status(), Status::Resolved);
        assert_eq!(
            LicenseSource::CacheOtherVersion("2.0.0".into()).status(),
            Status::Cached
        );
        assert_eq!(LicenseSource::Declared("MIT".into()).status(), Status::Unresolved);
    }
}
