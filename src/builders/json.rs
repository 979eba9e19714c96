use std::collections::HashMap;
use std::path::PathBuf;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use super::{LicenseBuilder, OutputTarget};
use crate::error::{write_artifact, GenResult};
use crate::license::cache::RESERVED_KEYS;
use crate::license::text::format_license_text;
use crate::models::{LicenseTypes, ResolvedLicense};
use crate::report::missing;

pub const FILE_NAME: &str = "licenses.json";

/// One package in `licenses.json`: version texts plus optional `types` and
/// `repository` keys, serialized as a single flat object.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PackageEntry {
    pub versions: Vec<(String, String)>,
    pub types: Option<LicenseTypes>,
    pub repository: Option<String>,
}

impl PackageEntry {
    /// `true` when no version carries license text.
    pub fn is_empty(&self) -> bool {
        self.versions.iter().all(|(_, text)| text.is_empty())
    }

    fn set_version(&mut self, version: &str, text: String) {
        match self.versions.iter_mut().find(|(v, _)| v == version) {
            Some((_, existing)) => *existing = text,
            None => self.versions.push((version.to_string(), text)),
        }
    }

    fn from_object(object: &serde_json::Map<String, Value>) -> Self {
        let versions = object
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .filter_map(|(version, text)| text.as_str().map(|t| (version.clone(), t.to_string())))
            .collect();
        let types = object
            .get("types")
            .and_then(|t| serde_json::from_value(t.clone()).ok());
        let repository = object
            .get("repository")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            versions,
            types,
            repository,
        }
    }
}

impl Serialize for PackageEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (version, text) in &self.versions {
            map.serialize_entry(version, text)?;
        }
        if let Some(types) = &self.types {
            map.serialize_entry("types", types)?;
        }
        if let Some(repository) = &self.repository {
            map.serialize_entry("repository", repository)?;
        }
        map.end()
    }
}

/// Parse a `licenses.json` document into packages, in file order.
pub fn parse_licenses(content: &str) -> Result<Vec<(String, PackageEntry)>, serde_json::Error> {
    let root: serde_json::Map<String, Value> = serde_json::from_str(content)?;
    Ok(root
        .iter()
        .filter_map(|(name, pkg)| {
            pkg.as_object()
                .map(|o| (name.clone(), PackageEntry::from_object(o)))
        })
        .collect())
}

struct Packages<'a>(&'a [(String, PackageEntry)]);

impl Serialize for Packages<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, entry) in self.0 {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}

/// `name → { version: text, types, repository }`, in arrival order.
#[derive(Debug, Default)]
pub struct JsonBuilder {
    packages: Vec<(String, PackageEntry)>,
    index: HashMap<String, usize>,
    /// Set once link verification has run, enabling the missing-link report.
    links_checked: bool,
}

impl JsonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn packages(&self) -> &[(String, PackageEntry)] {
        &self.packages
    }

    #[cfg(test)]
    pub fn links_checked(&self) -> bool {
        self.links_checked
    }

    fn entry(&mut self, name: &str) -> &mut PackageEntry {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.packages.push((name.to_string(), PackageEntry::default()));
                let idx = self.packages.len() - 1;
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.packages[idx].1
    }

    /// Store the outcome of link verification for `name`.
    pub fn record_link(&mut self, name: &str, link: Option<String>) {
        self.links_checked = true;
        if let Some(link) = link {
            if self.index.contains_key(name) {
                self.entry(name).repository = Some(link);
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Packages(&self.packages))
    }
}

impl LicenseBuilder for JsonBuilder {
    fn add(&mut self, license: &ResolvedLicense) {
        let types = license
            .types
            .clone()
            .unwrap_or_else(|| LicenseTypes::One(String::new()));
        self.add_cached(&license.name, &license.version, &license.text, Some(&types));
    }

    fn add_cached(&mut self, name: &str, version: &str, text: &str, types: Option<&LicenseTypes>) {
        let entry = self.entry(name);
        entry.set_version(version, format_license_text(text));
        if let Some(types) = types {
            entry.types = Some(types.clone());
        }
    }

    fn write(&self, target: &OutputTarget) -> GenResult<PathBuf> {
        missing::audit(&self.packages).print(self.links_checked);

        let path = target.path(FILE_NAME);
        let json = self.to_json().map_err(|e| crate::error::GenError::Write {
            path: path.clone(),
            source: e.into(),
        })?;
        write_artifact(path, &json)
    }
}
