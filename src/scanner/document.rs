use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{split_package_id, Scanner};
use crate::error::{GenError, GenResult};
use crate::models::{DependencyRecord, LicenseTypes};

/// Reads the JSON output of an external package-license scanner.
///
/// Two shapes are accepted:
/// - license-checker: `{ "name@version": { licenses, repository, licenseFile, ... } }`
/// - nlf-style array: `[{ name, version, license, licenseFile, repository, licenseSources }]`
pub struct DocumentScanner {
    path: PathBuf,
}

impl DocumentScanner {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Scanner for DocumentScanner {
    fn scan(&self) -> GenResult<Vec<DependencyRecord>> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| GenError::scan(&self.path, e))?;
        parse_document(&content, self.path.parent()).map_err(|e| GenError::scan(&self.path, e))
    }
}

/// Parse a scanner document. Relative license file paths resolve against `base`.
pub fn parse_document(content: &str, base: Option<&Path>) -> Result<Vec<DependencyRecord>, String> {
    let root: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;

    match root {
        Value::Object(packages) => Ok(packages
            .iter()
            .filter_map(|(id, pkg)| pkg.as_object().map(|o| record_from(Some(id), o, base)))
            .collect()),
        Value::Array(packages) => Ok(packages
            .iter()
            .filter_map(|pkg| pkg.as_object().map(|o| record_from(None, o, base)))
            .filter(|r| !r.name.is_empty())
            .collect()),
        _ => Err("expected an object keyed by package id or an array of packages".to_string()),
    }
}

fn record_from(
    id: Option<&str>,
    pkg: &serde_json::Map<String, Value>,
    base: Option<&Path>,
) -> DependencyRecord {
    let (id_name, id_version) = id.map(split_package_id).unwrap_or_default();

    let name = str_field(pkg, "name").unwrap_or(id_name);
    let version = str_field(pkg, "version").unwrap_or(id_version);

    let declared_license = pkg
        .get("licenses")
        .or_else(|| pkg.get("license"))
        .and_then(license_types)
        .or_else(|| package_source_licenses(pkg));

    let license_file = str_field(pkg, "licenseFile").map(|f| {
        let path = PathBuf::from(f);
        match base {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    });

    let repository = pkg.get("repository").and_then(|r| match r {
        Value::String(s) => Some(s.clone()),
        Value::Object(o) => o.get("url").and_then(Value::as_str).map(str::to_string),
        _ => None,
    });

    DependencyRecord {
        name,
        version,
        declared_license,
        license_file,
        repository,
        raw_text: license_source_text(pkg),
    }
}

fn str_field(pkg: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    pkg.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `"MIT"`, `["MIT", "ISC"]`, `{ "type": "MIT" }` or `[{ "type": "MIT" }]`.
pub fn license_types(value: &Value) -> Option<LicenseTypes> {
    let single = |v: &Value| -> Option<String> {
        match v {
            Value::String(s) => Some(s.clone()),
            Value::Object(o) => o.get("type").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    };

    let types = match value {
        Value::Array(items) => {
            let types: Vec<String> = items.iter().filter_map(single).collect();
            match types.len() {
                0 => None,
                1 => types.into_iter().next().map(LicenseTypes::One),
                _ => Some(LicenseTypes::Many(types)),
            }
        }
        other => single(other).map(LicenseTypes::One),
    };
    types.filter(|t| !t.is_empty())
}

/// nlf: `licenseSources.package.sources[].license`.
fn package_source_licenses(pkg: &serde_json::Map<String, Value>) -> Option<LicenseTypes> {
    let licenses: Vec<String> = sources(pkg, "package")
        .filter_map(|s| s.get("license").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    if licenses.is_empty() {
        None
    } else {
        Some(LicenseTypes::One(licenses.join(", ")))
    }
}

/// nlf: `licenseSources.license.sources[].text`, concatenated.
fn license_source_text(pkg: &serde_json::Map<String, Value>) -> Option<String> {
    let text: String = sources(pkg, "license")
        .filter_map(|s| s.get("text").and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn sources<'a>(
    pkg: &'a serde_json::Map<String, Value>,
    kind: &str,
) -> impl Iterator<Item = &'a Value> {
    pkg.get("licenseSources")
        .and_then(|s| s.get(kind))
        .and_then(|k| k.get("sources"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_checker_mapping() {
        let doc = r#"{
  "foo@1.0.0": {
    "licenses": "MIT",
    "repository": "https://github.com/u/foo",
    "licenseFile": "node_modules/foo/LICENSE"
  },
  "@scope/bar@2.0.0": {
    "licenses": ["ISC", "MIT"],
    "licenseFile": "/abs/bar/README.md"
  }
}"#;
        let records = parse_document(doc, Some(Path::new("/proj"))).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].name, "foo");
        assert_eq!(records[0].version, "1.0.0");
        assert_eq!(records[0].declared_license, Some(LicenseTypes::One("MIT".into())));
        assert_eq!(
            records[0].license_file,
            Some(PathBuf::from("/proj/node_modules/foo/LICENSE"))
        );
        assert_eq!(records[0].repository.as_deref(), Some("https://github.com/u/foo"));

        assert_eq!(records[1].name, "@scope/bar");
        assert_eq!(
            records[1].declared_license,
            Some(LicenseTypes::Many(vec!["ISC".into(), "MIT".into()]))
        );
        assert!(records[1].license_file_is_readme());
    }

    #[test]
    fn test_nlf_array() {
        let doc = r#"[{
  "name": "baz",
  "version": "0.1.0",
  "repository": { "type": "git", "url": "git+https://github.com/u/baz.git" },
  "licenseSources": {
    "package": { "sources": [{ "license": "BSD" }] },
    "license": { "sources": [{ "text": "BSD text\r\n" }] }
  }
}]"#;
        let records = parse_document(doc, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].declared_license, Some(LicenseTypes::One("BSD".into())));
        assert_eq!(records[0].raw_text.as_deref(), Some("BSD text\r\n"));
        assert_eq!(
            records[0].repository.as_deref(),
            Some("git+https://github.com/u/baz.git")
        );
    }

    #[test]
    fn test_license_types_shapes() {
        let v: Value = serde_json::json!({"type": "Apache-2.0"});
        assert_eq!(license_types(&v), Some(LicenseTypes::One("Apache-2.0".into())));
        let v: Value = serde_json::json!([{"type": "MIT"}]);
        assert_eq!(license_types(&v), Some(LicenseTypes::One("MIT".into())));
        assert_eq!(license_types(&serde_json::json!("")), None);
        assert_eq!(license_types(&serde_json::json!(42)), None);
    }

    #[test]
    fn test_rejects_scalar_document() {
        assert!(parse_document("42", None).is_err());
        assert!(parse_document("{not json", None).is_err());
    }

    #[test]
    fn test_scan_missing_file_is_scan_error() {
        let scanner = DocumentScanner::new("/no/such/licenses-input.json");
        assert!(matches!(scanner.scan(), Err(GenError::Scan { .. })));
    }
}
