use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::error::{GenError, GenResult};

/// Keys of a `licenses.json` entry that are not version texts.
pub const RESERVED_KEYS: [&str; 2] = ["repository", "types"];

/// Prior-run license lookup table: `name → version → text`.
///
/// Versions keep the order they were listed in the cache file, so the
/// "different version" fallback returns the most recently added one.
#[derive(Debug, Default)]
pub struct LicenseCache {
    entries: HashMap<String, Vec<(String, String)>>,
}

/// A cache hit.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheHit<'a> {
    Exact(&'a str),
    OtherVersion { version: &'a str, text: &'a str },
}

impl LicenseCache {
    /// Load a cache file shaped `{ name: { version: text } }`.
    ///
    /// A `licenses.json` written by a previous run is accepted as-is: its
    /// `repository`/`types` keys and any non-string values are skipped.
    pub fn load(path: &Path) -> GenResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| GenError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content).map_err(|source| GenError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        let root: serde_json::Map<String, Value> = serde_json::from_str(content)?;
        let mut entries = HashMap::new();

        for (name, versions) in root {
            let Some(versions) = versions.as_object() else {
                continue;
            };
            let texts: Vec<(String, String)> = versions
                .iter()
                .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
                .filter_map(|(version, text)| {
                    text.as_str().map(|t| (version.clone(), t.to_string()))
                })
                .collect();
            if !texts.is_empty() {
                entries.insert(name, texts);
            }
        }

        tracing::debug!(packages = entries.len(), "loaded license cache");
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up `name@version`; an exact hit needs non-empty text, otherwise the
    /// last listed version of `name` other than `version` is returned.
    pub fn lookup(&self, name: &str, version: &str) -> Option<CacheHit<'_>> {
        let versions = self.entries.get(name)?;

        if let Some((_, text)) = versions
            .iter()
            .find(|(v, text)| v == version && !text.is_empty())
        {
            return Some(CacheHit::Exact(text));
        }

        versions
            .iter()
            .rev()
            .find(|(v, _)| v != version)
            .map(|(v, text)| CacheHit::OtherVersion { version: v, text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_hit() {
        let cache = LicenseCache::from_json_str(r#"{"foo":{"1.0.0":"MIT text"}}"#).unwrap();
        assert_eq!(cache.lookup("foo", "1.0.0"), Some(CacheHit::Exact("MIT text")));
    }

    #[test]
    fn test_other_version_uses_last_inserted_not_highest() {
        let cache = LicenseCache::from_json_str(
            r#"{"foo":{"3.0.0":"three","1.0.0":"one","2.0.0":"two"}}"#,
        )
        .unwrap();
        assert_eq!(
            cache.lookup("foo", "9.9.9"),
            Some(CacheHit::OtherVersion {
                version: "2.0.0",
                text: "two"
            })
        );
    }

    #[test]
    fn test_reserved_keys_ignored() {
        let cache = LicenseCache::from_json_str(
            r#"{"foo":{"1.0.0":"text","types":"MIT","repository":"https://x"},"bar":{"types":["ISC"]}}"#,
        )
        .unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.lookup("foo", "2.0.0"),
            Some(CacheHit::OtherVersion {
                version: "1.0.0",
                text: "text"
            })
        );
        assert_eq!(cache.lookup("bar", "1.0.0"), None);
    }

    #[test]
    fn test_empty_exact_entry_is_not_another_version() {
        let cache = LicenseCache::from_json_str(r#"{"foo":{"1.0.0":""}}"#).unwrap();
        assert_eq!(cache.lookup("foo", "1.0.0"), None);

        let cache =
            LicenseCache::from_json_str(r#"{"foo":{"0.9.0":"older","1.0.0":""}}"#).unwrap();
        assert_eq!(
            cache.lookup("foo", "1.0.0"),
            Some(CacheHit::OtherVersion {
                version: "0.9.0",
                text: "older"
            })
        );
    }

    #[test]
    fn test_miss() {
        let cache = LicenseCache::from_json_str("{}").unwrap();
        assert_eq!(cache.lookup("foo", "1.0.0"), None);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut f, b"not json").unwrap();
        assert!(matches!(
            LicenseCache::load(f.path()),
            Err(GenError::InvalidJson { .. })
        ));
    }
}
