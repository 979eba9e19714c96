//! `convert`: re-render a `licenses.json` into other formats.

use std::path::{Path, PathBuf};

use semver::Version;

use crate::builders::json::{parse_licenses, PackageEntry};
use crate::builders::{BuilderSet, OutputTarget};
use crate::error::{GenError, GenResult};
use crate::models::LicenseTypes;

/// Feed each package of `input` into `builders` at its highest version and write them.
pub fn convert(input: &Path, builders: &mut BuilderSet, target: &OutputTarget) -> GenResult<Vec<PathBuf>> {
    let content = std::fs::read_to_string(input).map_err(|source| GenError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let packages = parse_licenses(&content).map_err(|source| GenError::InvalidJson {
        path: input.to_path_buf(),
        source,
    })?;

    for (name, entry) in &packages {
        let Some((version, text)) = latest_version(entry) else {
            tracing::debug!(package = %name, "no versions, skipping");
            continue;
        };
        let types = entry.types.as_ref().map(|t| LicenseTypes::One(t.to_string()));
        builders.add_cached(name, version, text, types.as_ref());
    }

    builders.write_all(target)
}

/// Highest semver version; non-semver keys lose to semver ones, and among
/// themselves the last listed wins.
fn latest_version(entry: &PackageEntry) -> Option<(&str, &str)> {
    entry
        .versions
        .iter()
        .enumerate()
        .max_by(|(ia, (va, _)), (ib, (vb, _))| {
            match (Version::parse(va).ok(), Version::parse(vb).ok()) {
                (Some(a), Some(b)) => a.cmp(&b).then(ia.cmp(ib)),
                (Some(_), None) => std::cmp::Ordering::Greater,
                (None, Some(_)) => std::cmp::Ordering::Less,
                (None, None) => ia.cmp(ib),
            }
        })
        .map(|(_, (version, text))| (version.as_str(), text.as_str()))
}
